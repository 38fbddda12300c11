//! Types for the Jaeger query HTTP API.
//!
//! Both `/api/services` and `/api/traces` wrap their payload in the same
//! envelope. `data` stays opaque here and is handed to the parser.

use serde::Deserialize;

/// Response envelope shared by the query endpoints
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub errors: Option<Vec<QueryError>>,
}

/// Error entry reported inside a 2xx response
#[derive(Debug, Clone, Deserialize)]
pub struct QueryError {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub msg: String,

    #[serde(default, rename = "traceID")]
    pub trace_id: Option<String>,
}

impl QueryResponse {
    /// Combined message of all reported errors, if there are any
    pub fn error_message(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors
                .iter()
                .map(|e| match &e.trace_id {
                    Some(id) => format!("{} (trace {}): {}", e.code, id, e.msg),
                    None => format!("{}: {}", e.code, e.msg),
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
