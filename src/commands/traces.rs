//! Traces command: draw the trace trees of one service.

use super::models::TracesArgs;
use crate::api::{JaegerClient, TraceSource};
use crate::hierarchy::sort_traces;
use crate::output::render_service_traces;
use anyhow::{Context, Result};
use log::info;

/// Execute the traces command
pub fn execute_traces(args: TracesArgs) -> Result<()> {
    if args.service.trim().is_empty() {
        anyhow::bail!("Service name cannot be empty");
    }

    let client = JaegerClient::with_timeout(&args.config.jaeger_url, args.config.timeout())
        .context("Failed to create Jaeger client")?;

    let mut traces = client
        .traces(&args.service, args.config.trace_limit)
        .with_context(|| format!("Failed to fetch traces for service {}", args.service))?;

    sort_traces(&mut traces);
    info!("Fetched {} traces for {}", traces.len(), args.service);

    print!(
        "{}",
        render_service_traces(&args.service, &traces, args.max_traces)
    );

    Ok(())
}
