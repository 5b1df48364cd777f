//! `dohwatch check` - compare system DNS answers with DoH answers.

use anyhow::Result;
use colored::Colorize;
use dohwatch::{
    AddressRelatednessPolicy, CheckOutcome, CheckReport, DohClient, ExactMatchPolicy, SystemCheck,
    WideRangePolicy,
};
use std::process::ExitCode;
use std::sync::Arc;

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<ExitCode> {
    let resolver = DohClient::from_config(&ctx.config.monitor.client_config())?;
    let policy: Arc<dyn AddressRelatednessPolicy> = if args.strict {
        Arc::new(ExactMatchPolicy)
    } else {
        Arc::new(WideRangePolicy)
    };
    let checker = SystemCheck::new(Arc::new(resolver), policy)?;

    let pretty = ctx.output_format == OutputFormat::Pretty;
    if pretty {
        println!("{}", "--- DNS Integrity Check ---".bold());
    }

    let mut reports = Vec::with_capacity(args.domains.len());
    for domain in &args.domains {
        let report = checker.check(domain).await;
        if pretty {
            print_report(&report);
        }
        reports.push(report);
    }

    let suspicious = reports.iter().any(CheckReport::is_suspicious);

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Pretty => {
            println!();
            println!("{}", "--- Check Complete ---".bold());
            if suspicious {
                println!(
                    "Result: {}",
                    "Discrepancies detected. Review warnings above.".red().bold()
                );
            } else {
                println!(
                    "Result: {}",
                    "No discrepancies detected in the checked domains.".green()
                );
            }
        }
    }

    Ok(if suspicious {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &CheckReport) {
    println!();
    println!("{} Checking domain: {}", "[*]".cyan(), report.domain.cyan());
    println!("    System IPs: {}", render_ips(&report.system_ips));
    println!("    DoH IPs   : {}", render_ips(&report.trusted_ips));

    match &report.outcome {
        CheckOutcome::Unresolved => {
            println!(
                "{} Could not resolve {} via either method.",
                "[-]".yellow(),
                report.domain
            );
        }
        CheckOutcome::SystemFailed => {
            println!(
                "{} System resolver failed for {}, skipping comparison.",
                "[-]".yellow(),
                report.domain
            );
        }
        CheckOutcome::TrustedFailed => {
            println!(
                "{} DoH resolver failed for {}, skipping comparison.",
                "[-]".yellow(),
                report.domain
            );
        }
        CheckOutcome::Compared { suspicious } if suspicious.is_empty() => {
            println!(
                "{} OK: System and DoH resolutions match for {}.",
                "[+]".green(),
                report.domain
            );
        }
        CheckOutcome::Compared { suspicious } => {
            println!(
                "{} WARNING: Potential DNS spoofing detected for {}!",
                "[!]".red().bold(),
                report.domain.red().bold()
            );
            println!("    Suspicious IPs (system only): {}", suspicious.join(", ").red());
        }
    }
}

fn render_ips(ips: &[String]) -> String {
    if ips.is_empty() {
        "Resolution failed/No IPs found".dimmed().to_string()
    } else {
        ips.join(", ")
    }
}
