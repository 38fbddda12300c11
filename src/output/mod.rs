//! Output writers and renderers.
//!
//! This module handles:
//! - JSON reports (write, read back)
//! - Colored terminal trees and tables

pub mod json;
pub mod report;
pub mod terminal;

// Re-export main functions
pub use json::{read_report, report_to_string, validate_output_path, write_report};
pub use report::{to_report, Report, ServiceReport};
pub use terminal::{
    render_distribution, render_operations_table, render_service_traces, render_trace_tree,
};
