use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use trace_insight::hierarchy::{build_hierarchy, sort_traces, NO_ROOT_SENTINEL};
use trace_insight::hierarchy::root_start_time;
use trace_insight::parser::{parse_traces_response, Span, Trace};

fn span(id: &str, parent: Option<&str>, start: u64, duration: u64) -> Span {
    Span {
        trace_id: "trace".to_string(),
        span_id: id.to_string(),
        parent_span_id: parent.map(str::to_string),
        references: Vec::new(),
        operation_name: format!("op-{}", id),
        start_time: start,
        duration,
        process_id: None,
        service_name: None,
        tags: Vec::new(),
        warnings: Vec::new(),
    }
}

fn trace(id: &str, spans: Vec<Span>) -> Trace {
    Trace {
        trace_id: id.to_string(),
        spans,
        services: BTreeMap::new(),
    }
}

/// Realistic payload: parent links via parentSpanID, CHILD_OF refs, a
/// FOLLOWS_FROM ref and a parent living in another trace.
fn mixed_payload() -> serde_json::Value {
    json!({
        "data": [{
            "traceID": "t1",
            "spans": [
                {"spanID": "root", "operationName": "HTTP GET /api/products", "startTime": 1000, "duration": 9000},
                {"spanID": "auth", "operationName": "auth.verify", "startTime": 1100, "duration": 300,
                 "references": [{"refType": "CHILD_OF", "traceID": "t1", "spanID": "root"}]},
                {"spanID": "query", "parentSpanID": "root", "operationName": "prisma.findMany", "startTime": 1500, "duration": 6000},
                {"spanID": "sql", "operationName": "SELECT products", "startTime": 1600, "duration": 5000,
                 "references": [{"refType": "CHILD_OF", "traceID": "t1", "spanID": "query"}]},
                {"spanID": "audit", "operationName": "audit.log", "startTime": 9500, "duration": 100,
                 "references": [{"refType": "FOLLOWS_FROM", "traceID": "t1", "spanID": "root"}]},
                {"spanID": "remote", "parentSpanID": "span-in-other-trace", "operationName": "neo4j.run", "startTime": 2000, "duration": 800}
            ]
        }]
    })
}

#[test]
fn test_every_span_placed_exactly_once() {
    let traces = parse_traces_response(&mixed_payload()).unwrap();
    let spans = &traces[0].spans;
    let hierarchy = build_hierarchy(spans);

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for root in &hierarchy.roots {
        *seen.entry(root.span_id.as_str()).or_default() += 1;
    }
    for children in hierarchy.children_by_parent.values() {
        for child in children {
            *seen.entry(child.span_id.as_str()).or_default() += 1;
        }
    }

    assert_eq!(seen.len(), spans.len());
    assert!(seen.values().all(|count| *count == 1));
    assert_eq!(hierarchy.placed_count(), spans.len());
}

#[test]
fn test_mixed_parent_encodings() {
    let traces = parse_traces_response(&mixed_payload()).unwrap();
    let hierarchy = build_hierarchy(&traces[0].spans);

    let roots: Vec<&str> = hierarchy.roots.iter().map(|s| s.span_id.as_str()).collect();
    // FOLLOWS_FROM is not parentage, foreign parent degrades to root
    assert_eq!(roots, vec!["root", "remote", "audit"]);

    let children: Vec<&str> = hierarchy
        .children_of("root")
        .iter()
        .map(|s| s.span_id.as_str())
        .collect();
    assert_eq!(children, vec!["auth", "query"]);
    assert_eq!(hierarchy.children_of("query")[0].span_id, "sql");
}

#[test]
fn test_foreign_parent_becomes_root() {
    let spans = vec![span("a", None, 0, 10), span("b", Some("not-here"), 5, 1)];
    let hierarchy = build_hierarchy(&spans);
    assert_eq!(hierarchy.roots.len(), 2);
    assert!(hierarchy.children_by_parent.is_empty());
}

#[test]
fn test_equal_start_longest_first() {
    let spans = vec![span("1", None, 100, 50), span("2", None, 100, 200)];
    let hierarchy = build_hierarchy(&spans);
    let roots: Vec<&str> = hierarchy.roots.iter().map(|s| s.span_id.as_str()).collect();
    assert_eq!(roots, vec!["2", "1"]);
}

#[test]
fn test_trace_listing_order() {
    let mut traces = vec![
        trace("c", vec![span("x", None, 300, 1)]),
        trace("a", vec![span("x", None, 100, 1)]),
        trace("b", vec![span("x", None, 200, 1)]),
    ];

    sort_traces(&mut traces);

    let starts: Vec<u64> = traces.iter().map(root_start_time).collect();
    assert_eq!(starts, vec![100, 200, 300]);
}

#[test]
fn test_rootless_trace_sorts_last() {
    // a <-> b cycle leaves no root
    let cyclic = trace("cyclic", vec![span("a", Some("b"), 1, 1), span("b", Some("a"), 1, 1)]);
    assert_eq!(root_start_time(&cyclic), NO_ROOT_SENTINEL);

    let mut traces = vec![cyclic, trace("late", vec![span("x", None, u64::MAX - 1, 1)])];
    sort_traces(&mut traces);
    assert_eq!(traces[1].trace_id, "cyclic");
}

#[test]
fn test_build_is_idempotent() {
    let traces = parse_traces_response(&mixed_payload()).unwrap();
    let first = build_hierarchy(&traces[0].spans);
    let second = build_hierarchy(&traces[0].spans);

    assert_eq!(first, second);
    assert_eq!(first.to_forest(), second.to_forest());
}

#[test]
fn test_input_order_does_not_matter() {
    let traces = parse_traces_response(&mixed_payload()).unwrap();
    let mut reversed = traces[0].spans.clone();
    reversed.reverse();

    let forward = build_hierarchy(&traces[0].spans).to_forest();
    let backward = build_hierarchy(&reversed).to_forest();

    assert_eq!(forward, backward);
}

#[test]
fn test_empty_trace() {
    let traces = parse_traces_response(&json!({"data": [{"traceID": "empty", "spans": []}]})).unwrap();
    let hierarchy = build_hierarchy(&traces[0].spans);

    assert!(hierarchy.roots.is_empty());
    assert!(hierarchy.children_by_parent.is_empty());
    assert!(hierarchy.to_forest().is_empty());
}
