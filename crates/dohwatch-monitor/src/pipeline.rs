//! Per-request evaluation: resolve, compare, and raise alerts.

use chrono::Utc;
use dohwatch_core::{
    AddressRelatednessPolicy, AddressResolver, AlertRecord, ConnectionObservation, Notification,
    WideRangePolicy,
};
use futures_util::{FutureExt, Stream, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::notify::{Notifier, TracingNotifier};
use crate::store::{AlertStore, MemoryAlertStore};

/// Default icon reference passed to notifiers
pub const DEFAULT_ICON: &str = "icons/alert.png";

/// Default notification priority
pub const DEFAULT_PRIORITY: i32 = 2;

/// Presentation settings for raised alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSettings {
    /// Icon reference
    pub icon: String,
    /// Notification priority
    pub priority: i32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            priority: DEFAULT_PRIORITY,
        }
    }
}

/// Evaluates connection observations against a trusted resolver.
///
/// Holds no state between evaluations besides the injected alert store,
/// so one pipeline can serve any number of concurrent observations.
pub struct AlertPipeline {
    resolver: Arc<dyn AddressResolver>,
    policy: Arc<dyn AddressRelatednessPolicy>,
    store: Arc<dyn AlertStore>,
    notifier: Arc<dyn Notifier>,
    settings: AlertSettings,
}

impl AlertPipeline {
    /// Create a builder around a trusted resolver
    #[must_use]
    pub fn builder(resolver: Arc<dyn AddressResolver>) -> AlertPipelineBuilder {
        AlertPipelineBuilder::new(resolver)
    }

    /// The alert store this pipeline appends to
    #[must_use]
    pub fn store(&self) -> &Arc<dyn AlertStore> {
        &self.store
    }

    /// Evaluate one observation, returning the alert if one was raised.
    ///
    /// Never fails: inapplicable domains and inconclusive lookups yield
    /// `None`, and notifier or store failures are logged while the alert
    /// is still returned.
    pub async fn evaluate(&self, observation: &ConnectionObservation) -> Option<AlertRecord> {
        if !observation.is_applicable() {
            debug!(domain = %observation.domain, "skipping inapplicable domain");
            return None;
        }

        let trusted = self
            .resolver
            .lookup_trusted_addresses(&observation.domain)
            .await;
        if trusted.is_empty() {
            debug!(domain = %observation.domain, "trusted lookup inconclusive");
            return None;
        }

        if self.policy.is_related(&observation.connected_ip, &trusted) {
            debug!(
                domain = %observation.domain,
                ip = %observation.connected_ip,
                policy = self.policy.name(),
                "connection matches trusted DNS"
            );
            return None;
        }

        let record = AlertRecord::new(observation, &trusted, Utc::now());
        self.raise(&record).await;
        Some(record)
    }

    async fn raise(&self, record: &AlertRecord) {
        let notification =
            Notification::for_alert(record, &self.settings.icon, self.settings.priority);
        if let Err(e) = self.notifier.notify(&notification) {
            warn!(domain = %record.domain, error = %e, "failed to deliver notification");
        }

        if let Err(e) = self.store.append(record.clone()).await {
            warn!(domain = %record.domain, error = %e, "failed to record alert");
        }
    }

    /// Evaluate a stream of observations, at most `max_in_flight` at a time.
    ///
    /// Returns the number of alerts raised. A panicking evaluation is
    /// logged and the stream keeps going.
    pub async fn run_stream<S>(&self, observations: S, max_in_flight: usize) -> usize
    where
        S: Stream<Item = ConnectionObservation>,
    {
        let raised = AtomicUsize::new(0);
        observations
            .for_each_concurrent(Some(max_in_flight.max(1)), |observation| {
                let raised = &raised;
                async move {
                    match AssertUnwindSafe(self.evaluate(&observation))
                        .catch_unwind()
                        .await
                    {
                        Ok(Some(_)) => {
                            raised.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => {}
                        Err(_) => {
                            error!(domain = %observation.domain, "evaluation panicked");
                        }
                    }
                }
            })
            .await;
        raised.into_inner()
    }
}

/// Builder for an [`AlertPipeline`]
pub struct AlertPipelineBuilder {
    resolver: Arc<dyn AddressResolver>,
    policy: Arc<dyn AddressRelatednessPolicy>,
    store: Arc<dyn AlertStore>,
    notifier: Arc<dyn Notifier>,
    settings: AlertSettings,
}

impl AlertPipelineBuilder {
    /// Start from the wide-range policy, an in-memory store and the tracing notifier
    #[must_use]
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self {
            resolver,
            policy: Arc::new(WideRangePolicy),
            store: Arc::new(MemoryAlertStore::new()),
            notifier: Arc::new(TracingNotifier),
            settings: AlertSettings::default(),
        }
    }

    /// Set the relatedness policy
    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn AddressRelatednessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Set the alert store
    #[must_use]
    pub fn store(mut self, store: Arc<dyn AlertStore>) -> Self {
        self.store = store;
        self
    }

    /// Set the notifier
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the notification presentation settings
    #[must_use]
    pub fn settings(mut self, settings: AlertSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the pipeline
    #[must_use]
    pub fn build(self) -> AlertPipeline {
        AlertPipeline {
            resolver: self.resolver,
            policy: self.policy,
            store: self.store,
            notifier: self.notifier,
            settings: self.settings,
        }
    }
}
