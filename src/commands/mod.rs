//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;
pub mod services;
pub mod stats;
pub mod traces;
pub mod utils;

// Re-export main command functions
pub use inspect::{execute_inspect, inspect_file};
pub use models::{ConfigOverrides, InspectArgs, StatsArgs, TracesArgs};
pub use services::execute_services;
pub use stats::execute_stats;
pub use traces::execute_traces;
pub use utils::{display_version, validate_report_file};
