//! Stats command implementation.
//!
//! The stats command:
//! 1. Loads every selected service's traces in parallel
//! 2. Ranks operations by average latency across all of them
//! 3. Prints tables (or JSON) and optionally writes the report

use super::models::StatsArgs;
use crate::api::JaegerClient;
use crate::output::{
    render_distribution, render_operations_table, render_service_traces, report_to_string,
    to_report, validate_output_path, write_report,
};
use crate::session::{load_view, LoadOptions, LoadSession};
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

/// Execute the stats command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Backend connection failures (any single service failing fails the run)
/// * Report write errors
pub fn execute_stats(args: StatsArgs) -> Result<()> {
    let start_time = Instant::now();

    if let Some(path) = &args.output {
        validate_output_path(path).context("Invalid report output path")?;
    }

    info!("Step 1/3: Loading traces from {}...", args.config.jaeger_url);
    let client = JaegerClient::with_timeout(&args.config.jaeger_url, args.config.timeout())
        .context("Failed to create Jaeger client")?;
    let session = LoadSession::new();
    let view = load_view(&client, &LoadOptions::from(&args.config), &session)
        .context("Failed to load traces")?;

    info!("Step 2/3: Aggregating {} spans...", view.span_count());
    info!("Latency distribution: {}", view.distribution.summary());
    let report = to_report(&view, &args.config.jaeger_url);

    info!("Step 3/3: Rendering output...");
    if args.json {
        println!("{}", report_to_string(&report)?);
    } else {
        if args.show_traces {
            for (service, traces) in &view.services {
                print!("{}", render_service_traces(service, traces, traces.len()));
            }
        }
        print!("{}", render_distribution(&view.distribution));
        print!("{}", render_operations_table(&view.operations));
    }

    if let Some(path) = &args.output {
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    info!(
        "Stats completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
