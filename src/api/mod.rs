//! Access to the tracing backend (Jaeger query API).

pub mod client;
pub mod types;

pub use client::{normalize_base_url, JaegerClient, TraceSource};
pub use types::{QueryError, QueryResponse};
