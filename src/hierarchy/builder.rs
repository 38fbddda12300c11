//! Rebuild the causal tree of a trace from its flat span list.
//!
//! Parent linkage comes from `parent_span_id` when present, otherwise from the
//! first `CHILD_OF` reference. A parent that is not part of the trace turns
//! the span into a root.
//!
//! Every traversal goes through `children_by_parent`, never upward through
//! parent pointers. Each span lands in exactly one bucket (roots or one
//! parent's children), so bad parent data can hide spans but cannot loop.

use super::ordering::compare_siblings;
use crate::classify::DepthTier;
use crate::parser::schema::{ReferenceKind, Span};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Roots and per-parent children of one trace
///
/// Borrowed from the span snapshot it was built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceHierarchy<'a> {
    /// Spans with no parent inside the trace, in sibling order
    pub roots: Vec<&'a Span>,

    /// parent span id -> children in sibling order
    pub children_by_parent: BTreeMap<&'a str, Vec<&'a Span>>,
}

/// A span together with its ordered subtree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanNode {
    pub span: Span,
    pub depth: usize,
    pub children: Vec<SpanNode>,
}

/// One row of a depth-first walk over the hierarchy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSpan<'a> {
    pub span: &'a Span,
    pub depth: usize,
    pub child_count: usize,
}

impl FlatSpan<'_> {
    pub fn tier(&self) -> DepthTier {
        DepthTier::from_depth(self.depth)
    }
}

/// Parent id of a span, if it declares one
///
/// `parent_span_id` wins; otherwise the first `CHILD_OF` reference is used.
/// `FOLLOWS_FROM` and unknown kinds never establish parentage.
pub fn resolve_parent_id(span: &Span) -> Option<&str> {
    span.parent_span_id.as_deref().or_else(|| {
        span.references
            .iter()
            .find(|r| r.kind == ReferenceKind::ChildOf)
            .map(|r| r.span_id.as_str())
    })
}

/// Build the hierarchy of one trace
///
/// # Arguments
/// * `spans` - All spans of a single trace
///
/// # Returns
/// Sorted roots and children lists; an empty input yields an empty hierarchy
pub fn build_hierarchy(spans: &[Span]) -> TraceHierarchy<'_> {
    let known: HashSet<&str> = spans.iter().map(|s| s.span_id.as_str()).collect();

    let mut roots: Vec<&Span> = Vec::new();
    let mut children_by_parent: BTreeMap<&str, Vec<&Span>> = BTreeMap::new();

    for span in spans {
        match resolve_parent_id(span) {
            Some(parent) if known.contains(parent) => {
                children_by_parent.entry(parent).or_default().push(span);
            }
            _ => roots.push(span),
        }
    }

    roots.sort_by(|a, b| compare_siblings(a, b));
    for children in children_by_parent.values_mut() {
        children.sort_by(|a, b| compare_siblings(a, b));
    }

    debug!(
        "Built hierarchy: {} spans, {} roots, {} parents",
        spans.len(),
        roots.len(),
        children_by_parent.len()
    );

    TraceHierarchy {
        roots,
        children_by_parent,
    }
}

impl<'a> TraceHierarchy<'a> {
    /// Ordered children of `span_id` (empty if it has none)
    pub fn children_of(&self, span_id: &str) -> &[&'a Span] {
        self.children_by_parent
            .get(span_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of spans placed in the hierarchy (roots plus every bucket)
    pub fn placed_count(&self) -> usize {
        self.roots.len() + self.children_by_parent.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.children_by_parent.is_empty()
    }

    /// Pre-order walk from the roots, annotated with depth
    ///
    /// A span id is expanded at most once, so cyclic parent data
    /// terminates.
    pub fn flatten(&self) -> Vec<FlatSpan<'a>> {
        let mut rows = Vec::with_capacity(self.placed_count());
        let mut expanded: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&'a Span, usize)> =
            self.roots.iter().rev().map(|span| (*span, 0)).collect();

        while let Some((span, depth)) = stack.pop() {
            let children = if expanded.insert(span.span_id.as_str()) {
                self.children_of(&span.span_id)
            } else {
                &[]
            };

            rows.push(FlatSpan {
                span,
                depth,
                child_count: children.len(),
            });

            for child in children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }

        rows
    }

    /// Deepest depth reached from the roots (0 for a flat or empty trace)
    pub fn max_depth(&self) -> usize {
        self.flatten().iter().map(|row| row.depth).max().unwrap_or(0)
    }

    /// Materialize owned `SpanNode` trees from the roots
    pub fn to_forest(&self) -> Vec<SpanNode> {
        let mut expanded: HashSet<&str> = HashSet::new();
        self.roots
            .iter()
            .map(|root| self.build_node(root, 0, &mut expanded))
            .collect()
    }

    fn build_node(&self, span: &'a Span, depth: usize, expanded: &mut HashSet<&'a str>) -> SpanNode {
        let children = if expanded.insert(span.span_id.as_str()) {
            self.children_of(&span.span_id)
                .iter()
                .map(|child| self.build_node(child, depth + 1, expanded))
                .collect()
        } else {
            Vec::new()
        };

        SpanNode {
            span: span.clone(),
            depth,
            children,
        }
    }

    /// Spans that no walk from the roots reaches (self-parents, cycles)
    pub fn unreachable(&self) -> Vec<&'a Span> {
        self.unreachable_in(&self.flatten())
    }

    /// Like [`unreachable`](Self::unreachable), reusing an existing walk
    pub fn unreachable_in(&self, rows: &[FlatSpan<'a>]) -> Vec<&'a Span> {
        let reached: HashSet<*const Span> = rows
            .iter()
            .map(|row| std::ptr::from_ref(row.span))
            .collect();

        self.children_by_parent
            .values()
            .flatten()
            .filter(|span| !reached.contains(&std::ptr::from_ref(**span)))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::SpanReference;

    fn span(id: &str, parent: Option<&str>, start: u64, duration: u64) -> Span {
        Span {
            trace_id: "t1".to_string(),
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

    fn ids(spans: &[&Span]) -> Vec<String> {
        spans.iter().map(|s| s.span_id.clone()).collect()
    }

    #[test]
    fn test_resolve_parent_prefers_parent_span_id() {
        let mut s = span("c", Some("direct"), 0, 0);
        s.references.push(SpanReference {
            kind: ReferenceKind::ChildOf,
            trace_id: "t1".to_string(),
            span_id: "via-ref".to_string(),
        });
        assert_eq!(resolve_parent_id(&s), Some("direct"));
    }

    #[test]
    fn test_resolve_parent_uses_first_child_of() {
        let mut s = span("c", None, 0, 0);
        s.references = vec![
            SpanReference {
                kind: ReferenceKind::FollowsFrom,
                trace_id: "t1".to_string(),
                span_id: "ff".to_string(),
            },
            SpanReference {
                kind: ReferenceKind::ChildOf,
                trace_id: "t1".to_string(),
                span_id: "first".to_string(),
            },
            SpanReference {
                kind: ReferenceKind::ChildOf,
                trace_id: "t1".to_string(),
                span_id: "second".to_string(),
            },
        ];
        assert_eq!(resolve_parent_id(&s), Some("first"));
    }

    #[test]
    fn test_resolve_parent_none() {
        assert_eq!(resolve_parent_id(&span("a", None, 0, 0)), None);
    }

    #[test]
    fn test_build_simple_tree() {
        let spans = vec![
            span("child-b", Some("root"), 20, 5),
            span("root", None, 0, 100),
            span("child-a", Some("root"), 10, 5),
            span("grandchild", Some("child-a"), 11, 1),
        ];

        let h = build_hierarchy(&spans);

        assert_eq!(ids(&h.roots), vec!["root"]);
        assert_eq!(ids(h.children_of("root")), vec!["child-a", "child-b"]);
        assert_eq!(ids(h.children_of("child-a")), vec!["grandchild"]);
        assert!(h.children_of("grandchild").is_empty());
        assert_eq!(h.placed_count(), 4);
        assert_eq!(h.max_depth(), 2);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let spans = vec![span("orphan", Some("elsewhere"), 5, 1)];
        let h = build_hierarchy(&spans);
        assert_eq!(ids(&h.roots), vec!["orphan"]);
        assert!(h.children_by_parent.is_empty());
    }

    #[test]
    fn test_equal_start_sorts_longest_first() {
        let spans = vec![span("1", None, 100, 50), span("2", None, 100, 200)];
        let h = build_hierarchy(&spans);
        assert_eq!(ids(&h.roots), vec!["2", "1"]);
    }

    #[test]
    fn test_empty_trace() {
        let h = build_hierarchy(&[]);
        assert!(h.roots.is_empty());
        assert!(h.children_by_parent.is_empty());
        assert!(h.is_empty());
        assert!(h.flatten().is_empty());
    }

    #[test]
    fn test_self_parent_terminates() {
        let spans = vec![span("root", None, 0, 10), span("loop", Some("loop"), 1, 1)];
        let h = build_hierarchy(&spans);

        assert_eq!(ids(&h.roots), vec!["root"]);
        assert_eq!(ids(h.children_of("loop")), vec!["loop"]);
        assert_eq!(h.flatten().len(), 1);
        assert_eq!(ids(&h.unreachable()), vec!["loop"]);
    }

    #[test]
    fn test_unreachable_in_reuses_walk() {
        let spans = vec![
            span("root", None, 0, 10),
            span("child", Some("root"), 1, 5),
            span("loop", Some("loop"), 2, 1),
        ];
        let h = build_hierarchy(&spans);
        let rows = h.flatten();

        assert_eq!(h.unreachable_in(&rows), h.unreachable());
        assert_eq!(ids(&h.unreachable_in(&rows)), vec!["loop"]);
    }

    #[test]
    fn test_two_span_cycle_terminates() {
        let spans = vec![span("a", Some("b"), 0, 1), span("b", Some("a"), 0, 1)];
        let h = build_hierarchy(&spans);

        assert!(h.roots.is_empty());
        assert_eq!(h.placed_count(), 2);
        assert!(h.to_forest().is_empty());
        assert_eq!(h.unreachable().len(), 2);
    }

    #[test]
    fn test_flatten_is_preorder_with_depth() {
        let spans = vec![
            span("r", None, 0, 100),
            span("a", Some("r"), 1, 10),
            span("a1", Some("a"), 2, 1),
            span("b", Some("r"), 20, 10),
        ];
        let h = build_hierarchy(&spans);

        let rows: Vec<(String, usize, usize)> = h
            .flatten()
            .iter()
            .map(|row| (row.span.span_id.clone(), row.depth, row.child_count))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("r".to_string(), 0, 2),
                ("a".to_string(), 1, 1),
                ("a1".to_string(), 2, 0),
                ("b".to_string(), 1, 0),
            ]
        );
    }

    #[test]
    fn test_to_forest_matches_children_map() {
        let spans = vec![
            span("r", None, 0, 100),
            span("a", Some("r"), 1, 10),
            span("b", Some("r"), 2, 10),
        ];
        let h = build_hierarchy(&spans);
        let forest = h.to_forest();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].depth, 0);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].span.span_id, "a");
        assert_eq!(forest[0].children[1].depth, 1);
    }
}
