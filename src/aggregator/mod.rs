//! Aggregation of span data into latency statistics.
//!
//! This module transforms loaded traces into:
//! - Per-operation statistics ranked by average latency
//! - Latency distribution across all spans
//! - Per-trace summaries

pub mod metrics;
pub mod operations;

// Re-export main types and functions
pub use metrics::{
    calculate_latency_distribution, summarize_hierarchy, summarize_trace, LatencyDistribution,
    TraceSummary,
};
pub use operations::{
    aggregate_operations, all_spans, rank_operations, slowest_operations, OperationStat,
    RankedOperation,
};
