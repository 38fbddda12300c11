//! Span normalizer for Jaeger query API payloads.
//!
//! Turns raw JSON into `Trace`/`Span` records. Optional fields never fail the
//! parse: a missing parent means "root", a blank operation name means
//! "Unknown operation". Timestamps and durations pass through untouched.

use super::schema::{
    RawProcess, RawReference, RawSpan, RawTrace, ReferenceKind, Span, SpanReference, Trace,
};
use crate::utils::config::UNKNOWN_OPERATION;
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

/// Default blank or missing operation names
///
/// Non-blank names are kept verbatim, surrounding whitespace included.
pub fn normalize_operation_name(raw: Option<&str>) -> String {
    match raw {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => UNKNOWN_OPERATION.to_string(),
    }
}

/// Normalize one raw span
///
/// # Arguments
/// * `raw` - Span as sent by the backend
/// * `trace_id` - Id of the enclosing trace, used when the span omits its own
/// * `services` - process id -> service name table of the enclosing trace
pub fn normalize_span(
    raw: RawSpan,
    trace_id: &str,
    services: &BTreeMap<String, String>,
) -> Span {
    let span_trace_id = non_blank(raw.trace_id).unwrap_or_else(|| trace_id.to_string());
    let service_name = raw
        .process_id
        .as_ref()
        .and_then(|pid| services.get(pid))
        .cloned();

    Span {
        trace_id: span_trace_id,
        span_id: non_blank(raw.span_id).unwrap_or_default(),
        parent_span_id: non_blank(raw.parent_span_id),
        references: raw
            .references
            .into_iter()
            .filter_map(|r| normalize_reference(r, trace_id))
            .collect(),
        operation_name: normalize_operation_name(raw.operation_name.as_deref()),
        start_time: raw.start_time,
        duration: raw.duration,
        process_id: non_blank(raw.process_id),
        service_name,
        tags: raw.tags,
        warnings: raw.warnings,
    }
}

/// References without a target span id carry no information
fn normalize_reference(raw: RawReference, trace_id: &str) -> Option<SpanReference> {
    let span_id = non_blank(raw.span_id)?;
    let kind = raw
        .ref_type
        .as_deref()
        .map(ReferenceKind::parse)
        .unwrap_or_else(|| ReferenceKind::Other(String::new()));

    Some(SpanReference {
        kind,
        trace_id: non_blank(raw.trace_id).unwrap_or_else(|| trace_id.to_string()),
        span_id,
    })
}

/// Normalize a raw trace and all of its spans
pub fn normalize_trace(raw: RawTrace) -> Trace {
    let services = service_table(&raw.processes);

    // Fall back to the first span's id when the trace record has none
    let trace_id = if raw.trace_id.trim().is_empty() {
        raw.spans
            .iter()
            .find_map(|s| s.trace_id.clone())
            .unwrap_or_default()
    } else {
        raw.trace_id
    };

    for warning in &raw.warnings {
        warn!("Trace {}: backend warning: {}", trace_id, warning);
    }

    let spans: Vec<Span> = raw
        .spans
        .into_iter()
        .map(|s| normalize_span(s, &trace_id, &services))
        .collect();

    let foreign = spans.iter().filter(|s| s.trace_id != trace_id).count();
    if foreign > 0 {
        warn!(
            "Trace {}: {} spans carry a different trace id",
            trace_id, foreign
        );
    }

    Trace {
        trace_id,
        spans,
        services,
    }
}

fn service_table(processes: &BTreeMap<String, RawProcess>) -> BTreeMap<String, String> {
    processes
        .iter()
        .filter(|(_, p)| !p.service_name.trim().is_empty())
        .map(|(pid, p)| (pid.clone(), p.service_name.clone()))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a `/api/traces` payload into normalized traces
///
/// Accepts:
/// - `{ "data": [trace, ...] }` (a non-array `data` yields no traces)
/// - a bare array of traces
/// - a single trace object with a `spans` array
///
/// # Errors
/// * `ParseError::JsonError` - a trace record is structurally invalid
/// * `ParseError::InvalidFormat` - payload is neither an object nor an array
pub fn parse_traces_response(payload: &serde_json::Value) -> Result<Vec<Trace>, ParseError> {
    let records = match payload {
        serde_json::Value::Object(obj) if obj.contains_key("spans") => {
            debug!("Payload is a single trace object");
            vec![payload.clone()]
        }
        serde_json::Value::Object(obj) => match obj.get("data") {
            Some(serde_json::Value::Array(items)) => items.clone(),
            _ => {
                debug!("Payload has no trace array, treating as empty");
                Vec::new()
            }
        },
        serde_json::Value::Array(items) => items.clone(),
        _ => {
            return Err(ParseError::InvalidFormat(
                "Trace payload must be a JSON object or array".to_string(),
            ))
        }
    };

    let mut traces = Vec::with_capacity(records.len());
    for record in records {
        let raw: RawTrace = serde_json::from_value(record)?;
        traces.push(normalize_trace(raw));
    }

    debug!(
        "Parsed {} traces with {} spans",
        traces.len(),
        traces.iter().map(|t| t.spans.len()).sum::<usize>()
    );

    Ok(traces)
}

/// Parse a `/api/services` payload into service names
///
/// A `null` or missing `data` field yields an empty list.
pub fn parse_services_response(payload: &serde_json::Value) -> Result<Vec<String>, ParseError> {
    let data = match payload {
        serde_json::Value::Object(obj) => obj.get("data").cloned().unwrap_or_default(),
        serde_json::Value::Array(_) => payload.clone(),
        _ => {
            return Err(ParseError::InvalidFormat(
                "Service payload must be a JSON object or array".to_string(),
            ))
        }
    };

    let mut services: Vec<String> = match data {
        serde_json::Value::Null => Vec::new(),
        other => serde_json::from_value(other)?,
    };
    services.sort();
    services.dedup();

    Ok(services)
}

/// Read a saved `/api/traces` payload from disk
pub fn read_traces_file(path: impl AsRef<Path>) -> Result<Vec<Trace>, ParseError> {
    let path = path.as_ref();
    debug!("Reading traces from: {}", path.display());

    let file = std::fs::File::open(path)?;
    let payload: serde_json::Value = serde_json::from_reader(std::io::BufReader::new(file))?;

    parse_traces_response(&payload)
}
