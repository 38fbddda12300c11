//! Services command: list what the backend knows about.

use crate::api::{JaegerClient, TraceSource};
use crate::utils::config::DashboardConfig;
use anyhow::{Context, Result};
use colored::*;

/// Execute the services command
pub fn execute_services(config: &DashboardConfig) -> Result<()> {
    let client = JaegerClient::with_timeout(&config.jaeger_url, config.timeout())
        .context("Failed to create Jaeger client")?;

    let services = client
        .services()
        .context("Failed to fetch service list")?;

    if services.is_empty() {
        println!("{}", "No services reported by the backend".dimmed());
        return Ok(());
    }

    println!("{} ({})", "Services".bold(), services.len());
    for service in &services {
        println!("  {}", service.cyan());
    }

    Ok(())
}
