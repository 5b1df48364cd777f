//! `dohwatch config` - configuration management.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<ExitCode> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => show_path(&ctx),
        ConfigCommands::Reset => reset_config(&ctx),
    }?;
    Ok(ExitCode::SUCCESS)
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let monitor = &config.monitor;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();

            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!("  {} {}", "doh_endpoint:".bold(), monitor.doh_endpoint);
            println!("  {} {}", "max_alerts:".bold(), monitor.max_alerts);

            let log = monitor.alert_log_path().map_or_else(
                |_| "(unavailable)".dimmed().to_string(),
                |p| p.display().to_string(),
            );
            println!("  {} {}", "alert_log:".bold(), log);
            println!("  {} {}", "notification_icon:".bold(), monitor.notification_icon);
            println!(
                "  {} {}",
                "notification_priority:".bold(),
                monitor.notification_priority
            );
            println!("  {} {}", "max_in_flight:".bold(), monitor.max_in_flight);
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    // Start from the file, not the overridden context
    let mut config = Config::load(&ctx.config_path)?;
    config.set(key, value)?;
    config.save(&ctx.config_path)?;

    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}

fn reset_config(ctx: &Context) -> Result<()> {
    Config::default().save(&ctx.config_path)?;
    println!("{} Configuration reset to defaults.", "Success:".green().bold());
    Ok(())
}
