//! dohwatch - DNS tampering monitor
//!
//! Checks the IPs clients connect to against DNS-over-HTTPS answers.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dohwatch_cli::run().await
}
