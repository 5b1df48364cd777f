//! `dohwatch observe` - evaluate request events and raise alerts.

use anyhow::{Context as _, Result};
use colored::Colorize;
use dohwatch::{ConnectionObservation, RequestEvent};
use futures_util::{future, Stream, StreamExt};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::{debug, info, warn};

use super::Context;
use crate::cli::args::ObserveArgs;
use crate::output::{ConsoleNotifier, OutputFormat};

pub async fn execute(ctx: Context, args: ObserveArgs) -> Result<ExitCode> {
    let monitor = &ctx.config.monitor;
    let pipeline = monitor.build_pipeline(Arc::new(ConsoleNotifier))?;
    let max_in_flight = args.max_in_flight.unwrap_or(monitor.max_in_flight);

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    info!(max_in_flight, "observing request events");

    let observed = AtomicUsize::new(0);
    let observations = observation_stream(reader).inspect(|_| {
        observed.fetch_add(1, Ordering::Relaxed);
    });
    let raised = pipeline.run_stream(observations, max_in_flight).await;
    let observed = observed.into_inner();

    info!(observed, raised, "observation stream finished");

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "observed": observed,
                    "alerts": raised,
                }))?
            );
        }
        OutputFormat::Pretty => {
            let alerts = if raised == 0 {
                raised.to_string().green()
            } else {
                raised.to_string().red().bold()
            };
            println!("Observed {observed} requests, raised {alerts} alerts.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Parse newline-delimited [`RequestEvent`]s, keeping only network requests
/// with a known IP.
fn observation_stream<R>(reader: R) -> impl Stream<Item = ConnectionObservation>
where
    R: AsyncRead + Unpin,
{
    LinesStream::new(BufReader::new(reader).lines()).filter_map(|line| {
        future::ready(match line {
            Ok(line) => parse_event(&line),
            Err(e) => {
                warn!(error = %e, "failed to read event");
                None
            }
        })
    })
}

fn parse_event(line: &str) -> Option<ConnectionObservation> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<RequestEvent>(line) {
        Ok(event) => event.into_observation(),
        Err(e) => {
            debug!(error = %e, "skipping malformed event");
            None
        }
    }
}
