//! Trace Insight CLI
//!
//! Draws Jaeger traces as trees and ranks operations by latency.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_insight::commands::{
    display_version, execute_inspect, execute_services, execute_stats, execute_traces,
    validate_report_file, ConfigOverrides, InspectArgs, StatsArgs, TracesArgs,
};
use trace_insight::utils::config::DEFAULT_TOP_OPERATIONS;

/// Trace Insight - trace trees and slowest operations for Jaeger
#[derive(Parser, Debug)]
#[command(name = "trace-insight")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Backend settings shared by the online commands
#[derive(Args, Debug, Clone)]
struct BackendArgs {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Jaeger query URL
    #[arg(long, env = "JAEGER_URL")]
    jaeger_url: Option<String>,

    /// Traces fetched per service
    #[arg(short, long)]
    limit: Option<usize>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl BackendArgs {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config,
            jaeger_url: self.jaeger_url,
            trace_limit: self.limit,
            timeout_secs: self.timeout,
            ..Default::default()
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List services known to the backend
    Services {
        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Draw the trace trees of one service
    Traces {
        #[command(flatten)]
        backend: BackendArgs,

        /// Service to show
        #[arg(short, long)]
        service: String,

        /// Draw at most this many trees
        #[arg(long, default_value = "10")]
        max_traces: usize,
    },

    /// Rank operations by average latency across all services
    Stats {
        #[command(flatten)]
        backend: BackendArgs,

        /// Only load these services (repeatable)
        #[arg(short, long = "service")]
        services: Vec<String>,

        /// Number of operations to rank
        #[arg(long)]
        top: Option<usize>,

        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also draw every loaded trace
        #[arg(long)]
        show_traces: bool,

        /// Print the JSON report instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Analyze a saved /api/traces payload offline
    Inspect {
        /// Path to the traces JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of operations to rank
        #[arg(long, default_value_t = DEFAULT_TOP_OPERATIONS)]
        top: usize,

        /// Draw at most this many trees
        #[arg(long, default_value = "10")]
        max_traces: usize,

        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Services { backend } => {
            let config = backend.into_overrides().resolve()?;
            execute_services(&config)?;
        }

        Commands::Traces {
            backend,
            service,
            max_traces,
        } => {
            let config = backend.into_overrides().resolve()?;
            execute_traces(TracesArgs {
                config,
                service,
                max_traces,
            })?;
        }

        Commands::Stats {
            backend,
            services,
            top,
            output,
            show_traces,
            json,
        } => {
            let overrides = ConfigOverrides {
                services,
                top_operations: top,
                ..backend.into_overrides()
            };
            let config = overrides.resolve()?;
            execute_stats(StatsArgs {
                config,
                output,
                show_traces,
                json,
            })?;
        }

        Commands::Inspect {
            file,
            top,
            max_traces,
            output,
        } => {
            execute_inspect(InspectArgs {
                file,
                top_operations: top,
                max_traces,
                output,
            })?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
