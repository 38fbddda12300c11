//! Trace hierarchy reconstruction.
//!
//! This module turns the flat span list of a trace into:
//! - A forest of roots and per-parent children (the builder)
//! - A consistent sibling and trace ordering (the ordering policy)

pub mod builder;
pub mod ordering;

// Re-export main types and functions
pub use builder::{build_hierarchy, resolve_parent_id, FlatSpan, SpanNode, TraceHierarchy};
pub use ordering::{
    compare_siblings, format_clock_time, format_timestamp, normalize_timestamp_ms,
    root_start_time, sort_traces, NO_ROOT_SENTINEL,
};
