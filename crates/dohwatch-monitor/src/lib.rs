//! # dohwatch-monitor
//!
//! Turns completed-request observations into DNS tampering alerts.
//!
//! ## Data Flow
//!
//! ```text
//! ConnectionObservation
//!   -> domain filter (skip localhost / IP literals)
//!   -> AddressResolver (DoH A + AAAA, merged)
//!   -> AddressRelatednessPolicy (exact, then /16 or /48)
//!   -> related: done
//!   -> unrelated: Notifier + AlertStore (bounded, newest first)
//! ```
//!
//! Every collaborator is injected, so the pipeline runs against fakes in
//! tests and against [`dohwatch_client::DohClient`] plus a
//! [`JsonFileAlertStore`] in production.

pub mod check;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod store;

pub use check::{CheckOutcome, CheckReport, SystemCheck};
pub use config::MonitorConfig;
pub use notify::{Notifier, TracingNotifier};
pub use pipeline::{AlertPipeline, AlertPipelineBuilder, AlertSettings};
pub use store::{AlertStore, JsonFileAlertStore, MemoryAlertStore, DEFAULT_MAX_ALERTS};
