//! Dashboard load cycle.
//!
//! One load:
//! 1. Fetches the service list
//! 2. Fans out one trace fetch per service on scoped threads
//! 3. Joins every fetch before touching the results
//! 4. Discards everything if the session moved on meanwhile
//! 5. Fails as a whole if any service fetch failed
//! 6. Builds a fresh `DashboardView` (sorted traces + aggregates)

use super::cancel::LoadSession;
use crate::aggregator::{
    all_spans, calculate_latency_distribution, slowest_operations, LatencyDistribution,
    RankedOperation,
};
use crate::api::TraceSource;
use crate::hierarchy::sort_traces;
use crate::parser::schema::Trace;
use crate::utils::config::DashboardConfig;
use crate::utils::error::ApiError;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::thread;
use thiserror::Error;

/// service name -> traces fetched for it, built fresh per load
pub type ServiceTraces = BTreeMap<String, Vec<Trace>>;

/// Errors that end a load without producing a view
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch service list: {0}")]
    Services(#[source] ApiError),

    #[error("Failed to fetch traces for service {service}: {source}")]
    ServiceFetch {
        service: String,
        #[source]
        source: ApiError,
    },

    #[error("Trace fetch for service {0} panicked")]
    WorkerPanicked(String),

    #[error("Load was cancelled before its results were applied")]
    Cancelled,
}

/// What to load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub trace_limit: usize,
    pub top_operations: usize,

    /// Restrict to these services (empty = all)
    pub services: Vec<String>,
}

impl From<&DashboardConfig> for LoadOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            trace_limit: config.trace_limit,
            top_operations: config.top_operations,
            services: config.services.clone(),
        }
    }
}

/// Consistent snapshot handed to renderers
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Traces per service, each list in trace order
    pub services: ServiceTraces,

    /// Slowest operations across all loaded traces
    pub operations: Vec<RankedOperation>,

    pub distribution: LatencyDistribution,

    pub loaded_at: DateTime<Utc>,
}

impl DashboardView {
    /// Build a view from already-fetched traces
    pub fn from_services(mut services: ServiceTraces, top_operations: usize) -> Self {
        for traces in services.values_mut() {
            sort_traces(traces);
        }

        let mut view = Self {
            services,
            operations: Vec::new(),
            distribution: LatencyDistribution::default(),
            loaded_at: Utc::now(),
        };

        let unique = view.unique_traces();
        let operations = slowest_operations(unique.iter().copied(), top_operations);
        let distribution = calculate_latency_distribution(all_spans(unique.iter().copied()));

        view.operations = operations;
        view.distribution = distribution;
        view
    }

    /// Every loaded trace once, even if several services returned it
    pub fn unique_traces(&self) -> Vec<&Trace> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.services
            .values()
            .flatten()
            .filter(|trace| seen.insert(trace.trace_id.as_str()))
            .collect()
    }

    pub fn trace_count(&self) -> usize {
        self.unique_traces().len()
    }

    pub fn span_count(&self) -> usize {
        self.unique_traces().iter().map(|t| t.spans.len()).sum()
    }
}

/// Pick the services to query
///
/// Requested names unknown to the backend are skipped with a warning.
pub fn select_services(available: &[String], requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return available.to_vec();
    }

    requested
        .iter()
        .filter(|name| {
            let known = available.contains(name);
            if !known {
                warn!("Service {} is not known to the backend, skipping", name);
            }
            known
        })
        .cloned()
        .collect()
}

/// Run one load cycle
///
/// **Public** - main entry point for building a dashboard view
///
/// # Errors
/// * `LoadError::Services` - the service list could not be fetched
/// * `LoadError::ServiceFetch` - a service's trace fetch failed (first one
///   in service order is reported)
/// * `LoadError::Cancelled` - the session was cancelled or superseded
pub fn load_view<S>(
    source: &S,
    options: &LoadOptions,
    session: &LoadSession,
) -> Result<DashboardView, LoadError>
where
    S: TraceSource + ?Sized,
{
    let token = session.begin();

    let available = source.services().map_err(LoadError::Services)?;
    if token.is_cancelled() {
        return Err(LoadError::Cancelled);
    }

    let services = select_services(&available, &options.services);
    info!("Loading traces for {} services", services.len());

    let results: Vec<(String, thread::Result<Result<Vec<Trace>, ApiError>>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = services
                .iter()
                .map(|service| {
                    let handle = scope.spawn(move || source.traces(service, options.trace_limit));
                    (service.clone(), handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(service, handle)| (service, handle.join()))
                .collect()
        });

    if token.is_cancelled() {
        info!("Discarding stale load results");
        return Err(LoadError::Cancelled);
    }

    let mut by_service = ServiceTraces::new();
    let mut first_error: Option<LoadError> = None;

    for (service, outcome) in results {
        match outcome {
            Ok(Ok(traces)) => {
                debug!("Service {}: {} traces", service, traces.len());
                by_service.insert(service, traces);
            }
            Ok(Err(error)) => {
                warn!("Trace fetch failed for service {}: {}", service, error);
                first_error.get_or_insert(LoadError::ServiceFetch {
                    service,
                    source: error,
                });
            }
            Err(_) => {
                warn!("Trace fetch for service {} panicked", service);
                first_error.get_or_insert(LoadError::WorkerPanicked(service));
            }
        }
    }

    if let Some(error) = first_error {
        return Err(error);
    }

    let view = DashboardView::from_services(by_service, options.top_operations);
    info!(
        "Loaded {} traces ({} spans) across {} services",
        view.trace_count(),
        view.span_count(),
        view.services.len()
    );

    Ok(view)
}
