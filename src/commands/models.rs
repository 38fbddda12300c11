use crate::utils::config::{load_config, DashboardConfig};
use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

/// Config file plus CLI flag overrides
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Optional TOML config file
    pub config_file: Option<PathBuf>,

    /// Jaeger query URL
    pub jaeger_url: Option<String>,

    /// Traces fetched per service
    pub trace_limit: Option<usize>,

    /// Length of the ranked operation list
    pub top_operations: Option<usize>,

    /// Restrict loading to these services
    pub services: Vec<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Load the config file (if any), apply flag overrides, validate
    pub fn resolve(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config_file {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DashboardConfig::default(),
        };

        if let Some(url) = &self.jaeger_url {
            config.jaeger_url = url.clone();
        }
        if let Some(limit) = self.trace_limit {
            config.trace_limit = limit;
        }
        if let Some(top) = self.top_operations {
            config.top_operations = top;
        }
        if !self.services.is_empty() {
            config.services = self.services.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }

        config.validate().context("Invalid configuration")?;
        debug!("Resolved config: {:?}", config);

        Ok(config)
    }
}

/// Arguments for the traces command
#[derive(Debug, Clone)]
pub struct TracesArgs {
    pub config: DashboardConfig,

    /// Service whose traces are drawn
    pub service: String,

    /// Trees drawn at most (fetch size is `config.trace_limit`)
    pub max_traces: usize,
}

/// Arguments for the stats command
#[derive(Debug, Clone)]
pub struct StatsArgs {
    pub config: DashboardConfig,

    /// Write the JSON report here
    pub output: Option<PathBuf>,

    /// Also draw every loaded trace tree
    pub show_traces: bool,

    /// Print the JSON report to stdout instead of tables
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Saved `/api/traces` payload
    pub file: PathBuf,

    pub top_operations: usize,

    /// Trees drawn at most
    pub max_traces: usize,

    /// Write the JSON report here
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::DEFAULT_JAEGER_URL;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_defaults() {
        let config = ConfigOverrides::default().resolve().unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.jaeger_url, DEFAULT_JAEGER_URL);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "jaeger_url = \"http://jaeger:16686\"").unwrap();
        writeln!(file, "trace_limit = 50").unwrap();

        let overrides = ConfigOverrides {
            config_file: Some(file.path().to_path_buf()),
            trace_limit: Some(10),
            ..Default::default()
        };
        let config = overrides.resolve().unwrap();

        assert_eq!(config.jaeger_url, "http://jaeger:16686");
        assert_eq!(config.trace_limit, 10);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = ConfigOverrides {
            jaeger_url: Some("localhost:16686".to_string()),
            ..Default::default()
        };
        assert!(overrides.resolve().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let overrides = ConfigOverrides {
            config_file: Some(PathBuf::from("/nonexistent/trace-insight.toml")),
            ..Default::default()
        };
        assert!(overrides.resolve().is_err());
    }
}
