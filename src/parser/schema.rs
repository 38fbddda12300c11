//! Trace data schema definitions.
//!
//! Two layers live here:
//! - `Raw*` records mirror the Jaeger query API JSON and are lenient about
//!   missing fields and naming variants.
//! - `Span` / `Trace` are the normalized, immutable records the rest of the
//!   crate works with.

use crate::utils::config::{CHILD_OF, FOLLOWS_FROM};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Span reference as sent by the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReference {
    #[serde(
        default,
        rename = "refType",
        alias = "kind",
        alias = "ref_type",
        deserialize_with = "lenient_string"
    )]
    pub ref_type: Option<String>,

    #[serde(
        default,
        rename = "traceID",
        alias = "traceId",
        alias = "trace_id",
        deserialize_with = "lenient_string"
    )]
    pub trace_id: Option<String>,

    #[serde(
        default,
        rename = "spanID",
        alias = "spanId",
        alias = "span_id",
        deserialize_with = "lenient_string"
    )]
    pub span_id: Option<String>,
}

/// Key/value tag attached to a span or process
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawTag {
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub key: String,

    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub value_type: Option<String>,

    #[serde(default)]
    pub value: serde_json::Value,
}

/// Raw span record from the Jaeger query API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpan {
    #[serde(
        default,
        rename = "traceID",
        alias = "traceId",
        alias = "trace_id",
        deserialize_with = "lenient_string"
    )]
    pub trace_id: Option<String>,

    #[serde(
        default,
        rename = "spanID",
        alias = "spanId",
        alias = "span_id",
        deserialize_with = "lenient_string"
    )]
    pub span_id: Option<String>,

    #[serde(
        default,
        rename = "parentSpanID",
        alias = "parentSpanId",
        alias = "parent_span_id",
        deserialize_with = "lenient_string"
    )]
    pub parent_span_id: Option<String>,

    #[serde(
        default,
        rename = "operationName",
        alias = "operation_name",
        deserialize_with = "lenient_string"
    )]
    pub operation_name: Option<String>,

    /// Raw start timestamp, unit unknown until render time
    #[serde(
        default,
        rename = "startTime",
        alias = "start_time",
        deserialize_with = "lenient_u64"
    )]
    pub start_time: u64,

    /// Elapsed time in microseconds
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: u64,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub references: Vec<RawReference>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<RawTag>,

    #[serde(
        default,
        rename = "processID",
        alias = "processId",
        alias = "process_id",
        deserialize_with = "lenient_string"
    )]
    pub process_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub warnings: Vec<String>,
}

/// Process (service) description referenced by spans
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProcess {
    #[serde(
        default,
        rename = "serviceName",
        alias = "service_name",
        deserialize_with = "lenient_string_or_empty"
    )]
    pub service_name: String,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<RawTag>,
}

/// Raw trace record: one entry of the `/api/traces` `data` array
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrace {
    #[serde(
        default,
        rename = "traceID",
        alias = "traceId",
        alias = "trace_id",
        deserialize_with = "lenient_string_or_empty"
    )]
    pub trace_id: String,

    pub spans: Vec<RawSpan>,

    #[serde(default, deserialize_with = "lenient_map")]
    pub processes: BTreeMap<String, RawProcess>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub warnings: Vec<String>,
}

/// Kind of a span reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    ChildOf,
    FollowsFrom,
    Other(String),
}

impl ReferenceKind {
    pub fn parse(raw: &str) -> Self {
        let kind = raw.trim().to_ascii_uppercase();
        if kind == CHILD_OF {
            ReferenceKind::ChildOf
        } else if kind == FOLLOWS_FROM {
            ReferenceKind::FollowsFrom
        } else {
            ReferenceKind::Other(raw.to_string())
        }
    }
}

/// Normalized span reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanReference {
    pub kind: ReferenceKind,
    pub trace_id: String,
    pub span_id: String,
}

/// Normalized, immutable span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,

    /// Direct parent reference (may point outside the trace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    pub references: Vec<SpanReference>,

    /// Never blank; defaults to "Unknown operation"
    pub operation_name: String,

    /// Raw start timestamp in the backend's unit
    pub start_time: u64,

    /// Duration in microseconds
    pub duration: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,

    /// Service resolved through the trace's process table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RawTag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Normalized trace: every span shares `trace_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub trace_id: String,
    pub spans: Vec<Span>,

    /// process id -> service name
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

impl Trace {
    /// Distinct service names taking part in this trace
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.values().cloned().collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Accept integers, floats or numeric strings; anything else becomes 0
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

/// Strings pass through, numbers become their decimal text, anything else is `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Null or non-array becomes empty; entries of the wrong shape are dropped
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Null or non-object becomes empty; entries of the wrong shape are dropped
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(key, item)| serde_json::from_value(item).ok().map(|v| (key, v)))
            .collect(),
        _ => BTreeMap::new(),
    })
}
