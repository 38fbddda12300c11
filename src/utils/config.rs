//! Configuration and constants for the CLI.
//!
//! Compile-time defaults live here as constants. Runtime settings come from
//! an optional TOML file ([`DashboardConfig`]) which CLI flags override.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default timeout for Jaeger query requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Jaeger query service as exposed by the all-in-one image
pub const DEFAULT_JAEGER_URL: &str = "http://localhost:16686";

/// Traces requested per service
pub const DEFAULT_TRACE_LIMIT: usize = 20;

/// Operations shown in the slowest-operations ranking
pub const DEFAULT_TOP_OPERATIONS: usize = 8;

pub const MAX_TRACE_LIMIT: usize = 1500;
pub const MAX_TOP_OPERATIONS: usize = 1000;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Label used when a span carries no usable operation name
pub const UNKNOWN_OPERATION: &str = "Unknown operation";

/// Reference kind that marks the authoritative parent of a span
pub const CHILD_OF: &str = "CHILD_OF";

/// Causal reference kind that does not establish parentage
pub const FOLLOWS_FROM: &str = "FOLLOWS_FROM";

// Timestamp magnitudes (raw start times may be ms/us/ns)
pub const NANOS_THRESHOLD: u64 = 100_000_000_000_000_000;
pub const MICROS_THRESHOLD: u64 = 100_000_000_000_000;

// Upper bounds (exclusive, in microseconds) of duration buckets 0..=7.
// Anything at or above the last bound lands in bucket 8.
pub const DURATION_BUCKET_BOUNDS_US: [u64; 8] = [
    1_000,
    10_000,
    100_000,
    500_000,
    1_000_000,
    3_000_000,
    10_000_000,
    30_000_000,
];

/// Runtime settings for a dashboard load
///
/// Every field is optional in the TOML file; missing ones fall back to the
/// constants above.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the Jaeger query service
    pub jaeger_url: String,

    /// Traces fetched per service
    pub trace_limit: usize,

    /// Length of the ranked operation list
    pub top_operations: usize,

    /// Restrict loading to these services (empty = every service)
    pub services: Vec<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            jaeger_url: DEFAULT_JAEGER_URL.to_string(),
            trace_limit: DEFAULT_TRACE_LIMIT,
            top_operations: DEFAULT_TOP_OPERATIONS,
            services: Vec::new(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl DashboardConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the resolved settings can drive a load
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jaeger_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "jaeger_url cannot be empty".to_string(),
            ));
        }

        if !self.jaeger_url.starts_with("http://") && !self.jaeger_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "jaeger_url must start with http:// or https://".to_string(),
            ));
        }

        if self.trace_limit == 0 || self.trace_limit > MAX_TRACE_LIMIT {
            return Err(ConfigError::InvalidValue(format!(
                "trace_limit must be between 1 and {}",
                MAX_TRACE_LIMIT
            )));
        }

        if self.top_operations == 0 || self.top_operations > MAX_TOP_OPERATIONS {
            return Err(ConfigError::InvalidValue(format!(
                "top_operations must be between 1 and {}",
                MAX_TOP_OPERATIONS
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load a dashboard config from a TOML file
///
/// # Errors
/// * `ConfigError::ReadFailed` - file cannot be read
/// * `ConfigError::ParseFailed` - TOML is invalid
pub fn load_config(path: impl AsRef<Path>) -> Result<DashboardConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: DashboardConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DashboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "trace_limit = 50").unwrap();
        writeln!(file, "services = [\"frontend\", \"api\"]").unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.trace_limit, 50);
        assert_eq!(config.services, vec!["frontend", "api"]);
        assert_eq!(config.jaeger_url, DEFAULT_JAEGER_URL);
        assert_eq!(config.top_operations, DEFAULT_TOP_OPERATIONS);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "trace_limit = \"many\"").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = DashboardConfig {
            jaeger_url: "ftp://localhost:16686".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = DashboardConfig {
            trace_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DashboardConfig {
            top_operations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
