//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// DNS tampering monitor
///
/// Compares the IPs clients actually connect to with the addresses a
/// trusted DNS-over-HTTPS resolver reports, and raises an alert when a
/// connection cannot be explained.
#[derive(Parser, Debug)]
#[command(name = "dohwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, env = "DOHWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Alert log file, overriding the config
    #[arg(long, env = "DOHWATCH_ALERT_LOG", global = true)]
    pub alert_log: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate request events (one JSON object per line) and raise alerts
    Observe(ObserveArgs),

    /// Compare system DNS answers with DoH answers for domains
    Check(CheckArgs),

    /// Show or clear recorded alerts
    Alerts(AlertsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ============================================================================
// Observe command
// ============================================================================

#[derive(Args, Debug)]
pub struct ObserveArgs {
    /// Read events from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Maximum evaluations in flight
    #[arg(long)]
    pub max_in_flight: Option<usize>,
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Domains to check
    #[arg(required = true, value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// Only exact matches count (no /16 or /48 proximity)
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Alerts command
// ============================================================================

#[derive(Args, Debug)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AlertsCommands {
    /// List recorded alerts, newest first
    List {
        /// Show at most this many alerts
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Remove all recorded alerts
    Clear,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,

    /// Restore the default configuration
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_globals() {
        let cli = Cli::parse_from(["dohwatch", "check", "--strict", "example.com", "-o", "json"]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Check(args) => {
                assert!(args.strict);
                assert_eq!(args.domains, vec!["example.com"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
