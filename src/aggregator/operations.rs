//! Per-operation latency statistics across every loaded trace.
//!
//! Spans are grouped by operation name regardless of trace or service. The
//! fold is order-independent and holds no state between runs; callers
//! rebuild it whenever the trace set changes.

use crate::classify::{classify_duration, DurationBucket};
use crate::parser::normalize_operation_name;
use crate::parser::schema::{Span, Trace};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Running totals for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStat {
    pub operation_name: String,
    pub total_duration: u64,
    pub count: u64,
    pub max_duration: u64,
}

impl OperationStat {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            total_duration: 0,
            count: 0,
            max_duration: 0,
        }
    }

    pub fn record(&mut self, duration: u64) {
        self.total_duration = self.total_duration.saturating_add(duration);
        self.count += 1;
        self.max_duration = self.max_duration.max(duration);
    }

    /// Mean duration rounded half up; 0 for an empty stat
    pub fn avg_duration(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let total = u128::from(self.total_duration);
        let count = u128::from(self.count);
        ((total + count / 2) / count) as u64
    }
}

/// One row of the slowest-operations ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedOperation {
    pub operation_name: String,
    pub avg_duration: u64,
    pub max_duration: u64,
    pub count: u64,
    pub total_duration: u64,
    pub avg_bucket: DurationBucket,
    pub max_bucket: DurationBucket,
}

impl From<&OperationStat> for RankedOperation {
    fn from(stat: &OperationStat) -> Self {
        let avg_duration = stat.avg_duration();
        Self {
            operation_name: stat.operation_name.clone(),
            avg_duration,
            max_duration: stat.max_duration,
            count: stat.count,
            total_duration: stat.total_duration,
            avg_bucket: classify_duration(avg_duration),
            max_bucket: classify_duration(stat.max_duration),
        }
    }
}

/// Fold spans into per-operation statistics
///
/// Blank operation names are grouped under "Unknown operation".
pub fn aggregate_operations<'a, I>(spans: I) -> HashMap<String, OperationStat>
where
    I: IntoIterator<Item = &'a Span>,
{
    let mut stats: HashMap<String, OperationStat> = HashMap::new();

    for span in spans {
        let name = normalize_operation_name(Some(&span.operation_name));
        stats
            .entry(name)
            .or_insert_with_key(|name| OperationStat::new(name.clone()))
            .record(span.duration);
    }

    stats
}

/// Ranking order: average descending, then operation name ascending
pub fn compare_ranked(a: &RankedOperation, b: &RankedOperation) -> Ordering {
    b.avg_duration
        .cmp(&a.avg_duration)
        .then_with(|| a.operation_name.cmp(&b.operation_name))
}

/// Rank aggregated statistics and keep the top `limit`
pub fn rank_operations(stats: &HashMap<String, OperationStat>, limit: usize) -> Vec<RankedOperation> {
    let mut ranked: Vec<RankedOperation> = stats.values().map(RankedOperation::from).collect();
    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);
    ranked
}

/// Every span of every trace, in no particular order
pub fn all_spans<'a, I>(traces: I) -> impl Iterator<Item = &'a Span>
where
    I: IntoIterator<Item = &'a Trace>,
{
    traces.into_iter().flat_map(|trace| trace.spans.iter())
}

/// Slowest operations across a set of traces
///
/// **Public** - main entry point for the cross-trace ranking
pub fn slowest_operations<'a, I>(traces: I, limit: usize) -> Vec<RankedOperation>
where
    I: IntoIterator<Item = &'a Trace>,
{
    let stats = aggregate_operations(all_spans(traces));
    debug!("Aggregated {} distinct operations", stats.len());
    rank_operations(&stats, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::UNKNOWN_OPERATION;

    fn span(op: &str, duration: u64) -> Span {
        Span {
            trace_id: "t".to_string(),
            span_id: format!("{}-{}", op, duration),
            parent_span_id: None,
            references: Vec::new(),
            operation_name: op.to_string(),
            start_time: 0,
            duration,
            process_id: None,
            service_name: None,
            tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_rank_by_average() {
        let spans = vec![span("A", 100), span("A", 300), span("B", 500)];
        let ranked = rank_operations(&aggregate_operations(&spans), 8);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].operation_name, "B");
        assert_eq!((ranked[0].avg_duration, ranked[0].max_duration, ranked[0].count), (500, 500, 1));
        assert_eq!(ranked[1].operation_name, "A");
        assert_eq!((ranked[1].avg_duration, ranked[1].max_duration, ranked[1].count), (200, 300, 2));
    }

    #[test]
    fn test_avg_rounds_half_up() {
        let mut stat = OperationStat::new("op");
        stat.record(1);
        stat.record(2);
        assert_eq!(stat.avg_duration(), 2);

        let mut stat = OperationStat::new("op");
        stat.record(1);
        stat.record(1);
        stat.record(2);
        assert_eq!(stat.avg_duration(), 1);

        assert_eq!(OperationStat::new("empty").avg_duration(), 0);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let spans = vec![span("zeta", 100), span("alpha", 100), span("mid", 100)];
        let ranked = rank_operations(&aggregate_operations(&spans), 8);
        let names: Vec<&str> = ranked.iter().map(|r| r.operation_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_limit_truncates() {
        let spans: Vec<Span> = (0..20).map(|i| span(&format!("op{:02}", i), i * 10)).collect();
        let ranked = rank_operations(&aggregate_operations(&spans), 8);
        assert_eq!(ranked.len(), 8);
        assert_eq!(ranked[0].operation_name, "op19");
    }

    #[test]
    fn test_blank_names_grouped_as_unknown() {
        let spans = vec![span("", 10), span("  ", 30)];
        let stats = aggregate_operations(&spans);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[UNKNOWN_OPERATION].count, 2);
        assert_eq!(stats[UNKNOWN_OPERATION].max_duration, 30);
    }

    #[test]
    fn test_order_independent() {
        let mut spans = vec![span("A", 100), span("B", 7), span("A", 300), span("C", 42)];
        let forward = rank_operations(&aggregate_operations(&spans), 8);
        spans.reverse();
        let backward = rank_operations(&aggregate_operations(&spans), 8);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_buckets_use_duration_classifier() {
        let spans = vec![span("slow", 40_000_000), span("slow", 2_000)];
        let ranked = rank_operations(&aggregate_operations(&spans), 8);
        assert_eq!(ranked[0].avg_bucket, classify_duration(20_001_000));
        assert_eq!(ranked[0].max_bucket, DurationBucket::Over30S);
    }
}
