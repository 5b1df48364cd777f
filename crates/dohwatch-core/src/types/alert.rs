use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ConnectionObservation, TrustedAddressSet};

/// A connection whose IP could not be related to any trusted answer.
///
/// Serialized with the same camelCase keys the alert log consumers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,

    /// Domain the client requested
    pub domain: String,

    /// IP the client actually connected to
    pub connected_ip: String,

    /// Addresses the trusted resolver reported
    #[serde(default)]
    pub doh_ips: Vec<String>,

    /// Full request URL
    #[serde(default)]
    pub url: String,
}

impl AlertRecord {
    /// Build a record for an observation that failed the relatedness check
    #[must_use]
    pub fn new(
        observation: &ConnectionObservation,
        trusted: &TrustedAddressSet,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            domain: observation.domain.clone(),
            connected_ip: observation.connected_ip.clone(),
            doh_ips: trusted.to_vec(),
            url: observation.url.clone(),
        }
    }

    /// Title shown by the notifier
    #[must_use]
    pub fn title(&self) -> String {
        format!("DNS Alert: {}", self.domain)
    }

    /// Human-readable summary of connected IP versus trusted answers
    #[must_use]
    pub fn message(&self) -> String {
        let trusted = if self.doh_ips.is_empty() {
            "None".to_string()
        } else {
            self.doh_ips.join(", ")
        };
        format!(
            "Connected to {}, but trusted DNS reported: {}",
            self.connected_ip, trusted
        )
    }

    /// Notification identifier for this alert.
    ///
    /// `sequence` separates alerts raised for the same domain and IP within
    /// one millisecond.
    #[must_use]
    pub fn notification_id(&self, sequence: u64) -> String {
        format!(
            "dns-alert-{}-{}-{}-{}",
            self.domain,
            self.connected_ip,
            self.timestamp.timestamp_millis(),
            sequence
        )
    }
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Payload handed to a notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification ID
    pub id: String,

    /// Short title
    pub title: String,

    /// Body text
    pub message: String,

    /// Icon reference understood by the notifier backend
    pub icon: String,

    /// Backend-specific priority
    pub priority: i32,
}

impl Notification {
    /// Create a notification for an alert record.
    ///
    /// Every call draws a fresh id, so two notifications are never merged.
    #[must_use]
    pub fn for_alert(record: &AlertRecord, icon: impl Into<String>, priority: i32) -> Self {
        let sequence = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            id: record.notification_id(sequence),
            title: record.title(),
            message: record.message(),
            icon: icon.into(),
            priority,
        }
    }
}
