//! Monitor configuration.

use dohwatch_client::{ClientConfig, DohClient, DEFAULT_ENDPOINT};
use dohwatch_core::{Error, Result, WideRangePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::notify::Notifier;
use crate::pipeline::{AlertPipeline, AlertSettings, DEFAULT_ICON, DEFAULT_PRIORITY};
use crate::store::{JsonFileAlertStore, DEFAULT_MAX_ALERTS};

/// Settings for the alert pipeline and its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// DNS JSON endpoint used as the trusted resolver
    #[serde(default = "default_endpoint")]
    pub doh_endpoint: String,

    /// Number of alerts kept in the log (default: 20)
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,

    /// Alert log location (default: platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_log: Option<PathBuf>,

    /// Icon reference handed to the notifier
    #[serde(default = "default_icon")]
    pub notification_icon: String,

    /// Notification priority
    #[serde(default = "default_priority")]
    pub notification_priority: i32,

    /// Observations evaluated concurrently by `observe`
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            doh_endpoint: default_endpoint(),
            max_alerts: default_max_alerts(),
            alert_log: None,
            notification_icon: default_icon(),
            notification_priority: default_priority(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl MonitorConfig {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.max_alerts == 0 {
            return Err(Error::Config("max_alerts must be at least 1".into()));
        }
        if self.max_in_flight == 0 {
            return Err(Error::Config("max_in_flight must be at least 1".into()));
        }
        if !self.doh_endpoint.starts_with("https://") && !self.doh_endpoint.starts_with("http://")
        {
            return Err(Error::Config(format!(
                "doh_endpoint must be an http(s) URL, got {}",
                self.doh_endpoint
            )));
        }
        Ok(())
    }

    /// Resolve the alert log path, falling back to the platform data dir
    pub fn alert_log_path(&self) -> Result<PathBuf> {
        match &self.alert_log {
            Some(path) => Ok(path.clone()),
            None => default_alert_log_path()
                .ok_or_else(|| Error::Config("could not determine data directory".into())),
        }
    }

    /// Client settings for the trusted resolver
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new().endpoint(&self.doh_endpoint)
    }

    /// Notification presentation settings
    #[must_use]
    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            icon: self.notification_icon.clone(),
            priority: self.notification_priority,
        }
    }

    /// Open the persistent alert log
    pub fn open_store(&self) -> Result<JsonFileAlertStore> {
        Ok(JsonFileAlertStore::new(self.alert_log_path()?, self.max_alerts))
    }

    /// Wire a pipeline from this configuration: DoH resolver, wide-range
    /// policy and the JSON alert log.
    pub fn build_pipeline(&self, notifier: Arc<dyn Notifier>) -> Result<AlertPipeline> {
        self.validate()?;
        let resolver = DohClient::from_config(&self.client_config())?;
        Ok(AlertPipeline::builder(Arc::new(resolver))
            .policy(Arc::new(WideRangePolicy))
            .store(Arc::new(self.open_store()?))
            .notifier(notifier)
            .settings(self.alert_settings())
            .build())
    }
}

/// Default alert log: `<data dir>/dohwatch/alerts.json`
pub fn default_alert_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("dohwatch").join("alerts.json"))
}

// Default value functions for serde.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_max_alerts() -> usize {
    DEFAULT_MAX_ALERTS
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

const fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

const fn default_max_in_flight() -> usize {
    16
}
