//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Parsing raw JSON from the Jaeger query API
//! - Normalizing spans (default labels, parent fields, service names)
//! - Defining the normalized trace schema

pub mod schema;
pub mod span;

// Re-export main types
pub use schema::{RawSpan, RawTrace, ReferenceKind, Span, SpanReference, Trace};
pub use span::{
    normalize_operation_name, normalize_span, normalize_trace, parse_services_response,
    parse_traces_response, read_traces_file,
};
