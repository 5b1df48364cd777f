//! Detect DNS tampering by comparing the IP a client connected to with the
//! addresses a trusted DNS-over-HTTPS resolver reports.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dohwatch::{ConnectionObservation, MonitorConfig, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> dohwatch::Result<()> {
//!     let pipeline = MonitorConfig::default().build_pipeline(Arc::new(TracingNotifier))?;
//!
//!     let observation =
//!         ConnectionObservation::new("example.com", "1.2.3.4", "https://example.com/");
//!     if let Some(alert) = pipeline.evaluate(&observation).await {
//!         println!("{}", alert.message());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/dohwatch/0.1.0")]

// Re-export core types
pub use dohwatch_core::*;

// Re-export the trusted resolver
pub use dohwatch_client::{ClientConfig, DohClient, DohClientBuilder};

// Re-export the alert pipeline
pub use dohwatch_monitor::{
    check, notify, pipeline, store, AlertPipeline, AlertPipelineBuilder, AlertSettings,
    AlertStore, CheckOutcome, CheckReport, JsonFileAlertStore, MemoryAlertStore,
    MonitorConfig, Notifier, SystemCheck, TracingNotifier, DEFAULT_MAX_ALERTS,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Fixed(&'static [&'static str]);

    #[async_trait]
    impl AddressResolver for Fixed {
        async fn lookup_trusted_addresses(&self, _domain: &str) -> TrustedAddressSet {
            self.0.iter().copied().collect()
        }
    }

    #[tokio::test]
    async fn facade_wires_pipeline() {
        let store = Arc::new(MemoryAlertStore::with_max_alerts(2));
        let pipeline = AlertPipeline::builder(Arc::new(Fixed(&["93.184.216.34"])))
            .store(store.clone())
            .build();

        for domain in ["a.example", "b.example", "c.example"] {
            let obs = ConnectionObservation::new(domain, "1.2.3.4", format!("https://{domain}/"));
            assert!(pipeline.evaluate(&obs).await.is_some());
        }

        let domains: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.domain)
            .collect();
        assert_eq!(domains, vec!["c.example", "b.example"]);
    }
}
