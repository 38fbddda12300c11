//! Terminal rendering of trace trees and operation rankings.
//!
//! Durations are colored by severity bucket, tree rows by depth tier.

use crate::aggregator::{summarize_hierarchy, LatencyDistribution, RankedOperation};
use crate::classify::{classify_duration, format_duration, DurationBucket};
use crate::hierarchy::{build_hierarchy, format_clock_time};
use crate::parser::schema::Trace;
use colored::*;

/// Colored, human-readable duration
fn paint_duration(duration_us: u64) -> ColoredString {
    format_duration(duration_us).color(classify_duration(duration_us).color())
}

/// Render one trace as an indented tree
pub fn render_trace_tree(trace: &Trace) -> String {
    let mut out = String::new();
    let hierarchy = build_hierarchy(&trace.spans);
    let rows = hierarchy.flatten();
    let summary = summarize_hierarchy(trace, &hierarchy, &rows);

    let started = summary
        .start_time
        .map(format_clock_time)
        .unwrap_or_else(|| "-".to_string());

    out.push_str(&format!(
        "{} {}  {} spans  {}  {}\n",
        "Trace".bold(),
        trace.trace_id.bold(),
        summary.span_count,
        paint_duration(summary.duration),
        started.dimmed()
    ));

    if hierarchy.is_empty() {
        out.push_str(&format!("  {}\n", "(no spans)".dimmed()));
        return out;
    }

    for row in &rows {
        let tier = row.tier();
        let indent = "  ".repeat(row.depth);
        let service = row
            .span
            .service_name
            .as_deref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();
        let warning = if row.span.warnings.is_empty() {
            String::new()
        } else {
            format!(" {}", "⚠".yellow())
        };

        out.push_str(&format!(
            "  {}{} {}{} {}{}\n",
            indent,
            tier.marker().color(tier.color()),
            row.span.operation_name,
            service.dimmed(),
            paint_duration(row.span.duration),
            warning
        ));
    }

    let hidden = hierarchy.unreachable_in(&rows).len();
    if hidden > 0 {
        out.push_str(&format!(
            "  {}\n",
            format!("({} spans unreachable from any root)", hidden).yellow()
        ));
    }

    out
}

/// Render the traces of one service, newest root start last
///
/// At most `max_traces` trees are drawn.
pub fn render_service_traces(service: &str, traces: &[Trace], max_traces: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{} {} ({} traces)\n",
        "Service".bold(),
        service.cyan().bold(),
        traces.len()
    ));
    out.push_str("---------------------------------------------------\n");

    for trace in traces.iter().take(max_traces) {
        out.push_str(&render_trace_tree(trace));
        out.push('\n');
    }

    if traces.len() > max_traces {
        out.push_str(&format!(
            "{}\n",
            format!("... {} more traces", traces.len() - max_traces).dimmed()
        ));
    }

    out
}

/// Render the ranked operation table
pub fn render_operations_table(operations: &[RankedOperation]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Slowest Operations (by average)".bold()));
    out.push_str("---------------------------------------------------\n");

    if operations.is_empty() {
        out.push_str(&format!("{}\n", "No spans loaded".dimmed()));
        return out;
    }

    let width = operations
        .iter()
        .map(|op| op.operation_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Operation".len());

    out.push_str(&format!(
        "{:>3}  {:<width$}  {:>10}  {:>10}  {:>7}\n",
        "#",
        "Operation",
        "Avg",
        "Max",
        "Count",
        width = width
    ));

    for (i, op) in operations.iter().enumerate() {
        let avg = format!("{:>10}", format_duration(op.avg_duration));
        let max = format!("{:>10}", format_duration(op.max_duration));
        out.push_str(&format!(
            "{:>3}  {:<width$}  {}  {}  {:>7}\n",
            i + 1,
            op.operation_name,
            avg.color(op.avg_bucket.color()),
            max.color(op.max_bucket.color()),
            op.count,
            width = width
        ));
    }

    out
}

/// Render latency distribution with a per-bucket histogram
pub fn render_distribution(distribution: &LatencyDistribution) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Latency Distribution".bold()));
    out.push_str("---------------------------------------------------\n");
    out.push_str(&format!("{}\n", distribution.summary()));

    if distribution.span_count == 0 {
        return out;
    }

    let peak = distribution.bucket_counts.iter().copied().max().unwrap_or(0).max(1);
    for bucket in DurationBucket::ALL {
        let count = distribution.bucket_counts[bucket.index()];
        let bar = "█".repeat((count * 40).div_ceil(peak));
        out.push_str(&format!(
            "{:>7} {} {}\n",
            bucket.label(),
            bar.color(bucket.color()),
            count
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::slowest_operations;
    use crate::parser::parse_traces_response;
    use serde_json::json;

    fn sample_trace() -> Trace {
        let payload = json!({
            "data": [{
                "traceID": "t1",
                "spans": [
                    {"spanID": "a", "operationName": "GET /checkout", "startTime": 1_700_000_000_000_000u64, "duration": 12_000, "processID": "p1"},
                    {"spanID": "b", "parentSpanID": "a", "operationName": "SELECT orders", "startTime": 1_700_000_000_001_000u64, "duration": 900, "processID": "p1"}
                ],
                "processes": {"p1": {"serviceName": "shop"}}
            }]
        });
        parse_traces_response(&payload).unwrap().remove(0)
    }

    #[test]
    fn test_render_trace_tree_plain() {
        colored::control::set_override(false);
        let out = render_trace_tree(&sample_trace());

        assert!(out.contains("Trace t1"));
        assert!(out.contains("● GET /checkout [shop] 12.00ms"));
        assert!(out.contains("  ├─ SELECT orders [shop] 900µs"));
    }

    #[test]
    fn test_render_trace_tree_reports_unreachable() {
        colored::control::set_override(false);
        let payload = json!([{
            "traceID": "t2",
            "spans": [
                {"spanID": "a", "operationName": "GET /", "startTime": 10, "duration": 400},
                {"spanID": "x", "parentSpanID": "y", "operationName": "left", "startTime": 11, "duration": 1},
                {"spanID": "y", "parentSpanID": "x", "operationName": "right", "startTime": 12, "duration": 1}
            ]
        }]);
        let trace = parse_traces_response(&payload).unwrap().remove(0);
        let out = render_trace_tree(&trace);

        assert!(out.contains("Trace t2  3 spans  400µs"));
        assert!(out.contains("(2 spans unreachable from any root)"));
        assert!(!out.contains("left"));
    }

    #[test]
    fn test_render_empty_trace() {
        colored::control::set_override(false);
        let trace = Trace {
            trace_id: "empty".to_string(),
            spans: Vec::new(),
            services: Default::default(),
        };
        assert!(render_trace_tree(&trace).contains("(no spans)"));
    }

    #[test]
    fn test_render_operations_table() {
        colored::control::set_override(false);
        let trace = sample_trace();
        let ops = slowest_operations([&trace], 8);
        let out = render_operations_table(&ops);

        let checkout = out.find("GET /checkout").unwrap();
        let select = out.find("SELECT orders").unwrap();
        assert!(checkout < select);
    }

    #[test]
    fn test_render_service_traces_truncates() {
        colored::control::set_override(false);
        let traces = vec![sample_trace(), sample_trace(), sample_trace()];
        let out = render_service_traces("shop", &traces, 1);
        assert!(out.contains("(3 traces)"));
        assert!(out.contains("... 2 more traces"));
    }
}
