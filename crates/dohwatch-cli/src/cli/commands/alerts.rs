//! `dohwatch alerts` - show or clear the alert log.

use anyhow::Result;
use colored::Colorize;
use dohwatch::AlertStore;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::{AlertsArgs, AlertsCommands};
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: AlertsArgs) -> Result<ExitCode> {
    match args.command {
        AlertsCommands::List { limit } => list_alerts(ctx, limit).await,
        AlertsCommands::Clear => clear_alerts(ctx).await,
    }
}

async fn list_alerts(ctx: Context, limit: Option<usize>) -> Result<ExitCode> {
    let store = ctx.config.monitor.open_store()?;
    let mut alerts = store.list().await?;
    if let Some(limit) = limit {
        alerts.truncate(limit);
    }

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&alerts)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "DNS Alerts:".bold());
            println!();

            if alerts.is_empty() {
                println!("  No alerts recorded.");
            } else {
                for alert in &alerts {
                    println!(
                        "  {} {}",
                        alert
                            .timestamp
                            .format("%Y-%m-%d %H:%M:%S UTC")
                            .to_string()
                            .dimmed(),
                        alert.domain.cyan()
                    );
                    println!("    Connected: {}", alert.connected_ip.red());
                    println!("    DoH IPs:   {}", alert.doh_ips.join(", "));
                    if !alert.url.is_empty() {
                        println!("    URL:       {}", alert.url);
                    }
                    println!();
                }
            }

            if ctx.verbose {
                println!("  Log: {}", store.path().display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn clear_alerts(ctx: Context) -> Result<ExitCode> {
    let store = ctx.config.monitor.open_store()?;
    store.clear().await?;

    if ctx.output_format == OutputFormat::Pretty {
        println!("{} Alert log cleared.", "Success:".green().bold());
    }

    Ok(ExitCode::SUCCESS)
}
