//! JSON report schema.
//!
//! A report is the serializable snapshot of a dashboard view: per-service
//! trace summaries, the ranked operations and the latency distribution.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{summarize_trace, LatencyDistribution, RankedOperation, TraceSummary};
use crate::session::DashboardView;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Backend URL or file the traces came from
    pub source: String,

    pub trace_count: usize,
    pub span_count: usize,

    /// Trace summaries grouped by service
    pub services: Vec<ServiceReport>,

    /// Slowest operations (ranked by average duration)
    pub operations: Vec<RankedOperation>,

    pub distribution: LatencyDistribution,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Traces of one service, in trace order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub name: String,
    pub traces: Vec<TraceSummary>,
}

/// Convert a loaded view into a report
pub fn to_report(view: &DashboardView, source: &str) -> Report {
    let services = view
        .services
        .iter()
        .map(|(name, traces)| ServiceReport {
            name: name.clone(),
            traces: traces.iter().map(summarize_trace).collect(),
        })
        .collect();

    Report {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        trace_count: view.trace_count(),
        span_count: view.span_count(),
        services,
        operations: view.operations.clone(),
        distribution: view.distribution.clone(),
        generated_at: view.loaded_at.to_rfc3339(),
    }
}
