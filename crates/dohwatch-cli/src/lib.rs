//! # dohwatch-cli
//!
//! Command-line front end for the dohwatch alert pipeline.
//!
//! ## Features
//!
//! - **observe**: evaluate newline-delimited request events from a connection observer
//! - **check**: cross-check the system resolver against DoH for given domains
//! - **alerts**: list or clear the persisted alert log
//! - **config**: manage the TOML configuration file

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
