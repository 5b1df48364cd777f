//! Command implementations.

pub mod alerts;
pub mod check;
pub mod config;
pub mod observe;

use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration, with command-line overrides applied
    pub config: Config,

    /// Where the configuration was loaded from
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,
}
