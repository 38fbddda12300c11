//! Latency distribution and per-trace summaries.
//!
//! These back the overview numbers shown next to the ranked operations:
//! how latency is spread across all loaded spans, and what each trace looks
//! like at a glance.

use crate::classify::{classify_duration, format_duration, DurationBucket};
use crate::hierarchy::{build_hierarchy, format_timestamp, FlatSpan, TraceHierarchy};
use crate::parser::schema::{Span, Trace};
use serde::{Deserialize, Serialize};

/// Latency statistics over a set of spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    /// Sum of all span durations (µs)
    pub total_duration: u64,

    /// Number of spans
    pub span_count: usize,

    pub mean_duration: u64,
    pub median_duration: u64,

    /// Nearest-rank 95th percentile
    pub p95_duration: u64,

    pub max_duration: u64,

    /// Span count per duration bucket, indexed by bucket severity
    pub bucket_counts: [usize; 9],
}

/// Calculate the latency distribution of a set of spans
///
/// **Public** - provides summary statistics
pub fn calculate_latency_distribution<'a, I>(spans: I) -> LatencyDistribution
where
    I: IntoIterator<Item = &'a Span>,
{
    let mut durations: Vec<u64> = spans.into_iter().map(|s| s.duration).collect();
    if durations.is_empty() {
        return LatencyDistribution::default();
    }

    durations.sort_unstable();

    let count = durations.len();
    let total = durations.iter().fold(0u64, |acc, d| acc.saturating_add(*d));
    let mut bucket_counts = [0usize; 9];
    for duration in &durations {
        bucket_counts[classify_duration(*duration).index()] += 1;
    }

    LatencyDistribution {
        total_duration: total,
        span_count: count,
        mean_duration: total / count as u64,
        median_duration: durations[count / 2],
        p95_duration: durations[nearest_rank(count, 0.95)],
        max_duration: durations[count - 1],
        bucket_counts,
    }
}

fn nearest_rank(count: usize, quantile: f64) -> usize {
    let rank = (quantile * count as f64).ceil() as usize;
    rank.clamp(1, count) - 1
}

impl LatencyDistribution {
    /// Bucket holding the most spans (the fastest one on ties)
    pub fn dominant_bucket(&self) -> Option<DurationBucket> {
        if self.span_count == 0 {
            return None;
        }
        let (index, _) = self
            .bucket_counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))?;
        DurationBucket::from_index(index)
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Spans: {} | Mean: {} | Median: {} | P95: {} | Max: {}",
            self.span_count,
            format_duration(self.mean_duration),
            format_duration(self.median_duration),
            format_duration(self.p95_duration),
            format_duration(self.max_duration)
        )
    }
}

/// At-a-glance facts about one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub span_count: usize,
    pub root_count: usize,
    pub max_depth: usize,

    /// Raw start time of the first root, if any
    pub start_time: Option<u64>,

    /// First root start as RFC 3339 UTC, unit inferred from magnitude
    #[serde(default)]
    pub started_at: Option<String>,

    /// Longest root span duration (µs)
    pub duration: u64,
    pub duration_bucket: DurationBucket,

    /// Operation of the first root
    pub root_operation: Option<String>,

    pub services: Vec<String>,
}

/// Summarize one trace
pub fn summarize_trace(trace: &Trace) -> TraceSummary {
    let hierarchy = build_hierarchy(&trace.spans);
    let rows = hierarchy.flatten();
    summarize_hierarchy(trace, &hierarchy, &rows)
}

/// Summarize a trace whose hierarchy and pre-order walk are already built
///
/// # Arguments
/// * `hierarchy` - Built from `trace.spans`
/// * `rows` - `hierarchy.flatten()`
pub fn summarize_hierarchy(
    trace: &Trace,
    hierarchy: &TraceHierarchy<'_>,
    rows: &[FlatSpan<'_>],
) -> TraceSummary {
    let duration = hierarchy.roots.iter().map(|r| r.duration).max().unwrap_or(0);
    let first_root = hierarchy.roots.first();
    let start_time = first_root.map(|r| r.start_time);

    TraceSummary {
        trace_id: trace.trace_id.clone(),
        span_count: trace.spans.len(),
        root_count: hierarchy.roots.len(),
        max_depth: rows.iter().map(|row| row.depth).max().unwrap_or(0),
        start_time,
        started_at: start_time.and_then(format_timestamp),
        duration,
        duration_bucket: classify_duration(duration),
        root_operation: first_root.map(|r| r.operation_name.clone()),
        services: trace.service_names(),
    }
}
