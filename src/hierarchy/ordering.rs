//! Ordering policy for spans and traces.
//!
//! Siblings sort by raw start time ascending; on equal starts the longer span
//! (usually the enclosing one) comes first. Traces sort by the start time of
//! their earliest root.
//!
//! Sorting always works on raw stored values. Unit conversion of timestamps
//! happens only when a human-readable time is derived.

use super::builder::build_hierarchy;
use crate::parser::schema::{Span, Trace};
use crate::utils::config::{MICROS_THRESHOLD, NANOS_THRESHOLD};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Root start time assigned to traces without any resolvable root
pub const NO_ROOT_SENTINEL: u64 = u64::MAX;

/// Total order over sibling spans
///
/// Start time ascending, then duration descending, then span id so that
/// the order never depends on input order.
pub fn compare_siblings(a: &Span, b: &Span) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| b.duration.cmp(&a.duration))
        .then_with(|| a.span_id.cmp(&b.span_id))
}

/// Start time of the first root of `trace`, or [`NO_ROOT_SENTINEL`]
pub fn root_start_time(trace: &Trace) -> u64 {
    build_hierarchy(&trace.spans)
        .roots
        .first()
        .map(|root| root.start_time)
        .unwrap_or(NO_ROOT_SENTINEL)
}

/// Sort traces by root start time, ties broken by trace id
pub fn sort_traces(traces: &mut [Trace]) {
    traces.sort_by_cached_key(|trace| (root_start_time(trace), trace.trace_id.clone()));
}

/// Convert a raw timestamp of unknown unit to milliseconds
///
/// Values above 1e17 are nanoseconds, above 1e14 microseconds, anything
/// smaller is taken as milliseconds already.
pub fn normalize_timestamp_ms(raw: u64) -> f64 {
    if raw > NANOS_THRESHOLD {
        raw as f64 / 1e6
    } else if raw > MICROS_THRESHOLD {
        raw as f64 / 1e3
    } else {
        raw as f64
    }
}

/// Render a raw timestamp as an RFC 3339 UTC string
///
/// Returns `None` when the normalized value is outside chrono's range.
pub fn format_timestamp(raw: u64) -> Option<String> {
    let millis = normalize_timestamp_ms(raw).floor() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

/// Render a raw timestamp as a wall-clock time of day (`HH:MM:SS.mmm`)
pub fn format_clock_time(raw: u64) -> String {
    let millis = normalize_timestamp_ms(raw).floor() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| raw.to_string())
}
