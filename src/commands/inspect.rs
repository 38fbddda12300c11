//! Inspect command: offline analysis of a saved `/api/traces` payload.

use super::models::InspectArgs;
use crate::output::{
    render_distribution, render_operations_table, render_service_traces, to_report,
    validate_output_path, write_report,
};
use crate::parser::read_traces_file;
use crate::session::{DashboardView, ServiceTraces};
use anyhow::{Context, Result};
use log::info;

/// Group label for traces read from a file
const FILE_GROUP: &str = "file";

/// Build a view from a saved payload
///
/// **Public** - also used by tests to exercise the offline path
pub fn inspect_file(args: &InspectArgs) -> Result<DashboardView> {
    let traces = read_traces_file(&args.file)
        .with_context(|| format!("Failed to read traces from {}", args.file.display()))?;

    info!("Read {} traces from {}", traces.len(), args.file.display());

    let mut services = ServiceTraces::new();
    services.insert(FILE_GROUP.to_string(), traces);

    Ok(DashboardView::from_services(services, args.top_operations))
}

/// Execute the inspect command
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    if args.top_operations == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if let Some(path) = &args.output {
        validate_output_path(path).context("Invalid report output path")?;
    }

    let view = inspect_file(&args)?;

    for (group, traces) in &view.services {
        print!("{}", render_service_traces(group, traces, args.max_traces));
    }
    print!("{}", render_distribution(&view.distribution));
    print!("{}", render_operations_table(&view.operations));

    if let Some(path) = &args.output {
        let report = to_report(&view, &args.file.display().to_string());
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    Ok(())
}
