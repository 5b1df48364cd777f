//! Bounded, newest-first alert history.
//!
//! Every store serializes its read-modify-write so concurrent alerts never
//! lose an insertion and the log never grows past its bound.

use async_trait::async_trait;
use dohwatch_core::{AlertRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default number of alerts kept in the log
pub const DEFAULT_MAX_ALERTS: usize = 20;

/// Key the alert list is stored under in the persisted log.
///
/// `AlertLogFile` repeats this literal in its serde rename; keep them in sync.
pub const ALERT_LOG_KEY: &str = "dnsAlerts";

/// Persistent alert history
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert a record at the front, dropping the oldest past the bound
    async fn append(&self, record: AlertRecord) -> Result<()>;

    /// Current records, newest first
    async fn list(&self) -> Result<Vec<AlertRecord>>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;
}

fn push_bounded(log: &mut Vec<AlertRecord>, record: AlertRecord, max_alerts: usize) {
    log.insert(0, record);
    log.truncate(max_alerts);
}

/// Alert log held in memory
#[derive(Debug)]
pub struct MemoryAlertStore {
    records: Mutex<Vec<AlertRecord>>,
    max_alerts: usize,
}

impl MemoryAlertStore {
    /// Create an empty store with the default bound
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_alerts(DEFAULT_MAX_ALERTS)
    }

    /// Create an empty store keeping at most `max_alerts` records
    #[must_use]
    pub fn with_max_alerts(max_alerts: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_alerts,
        }
    }
}

impl Default for MemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn append(&self, record: AlertRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        push_bounded(&mut records, record, self.max_alerts);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AlertRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}

/// On-disk shape of the alert log
#[derive(Debug, Default, Serialize, Deserialize)]
struct AlertLogFile {
    // Must equal ALERT_LOG_KEY
    #[serde(rename = "dnsAlerts", default)]
    dns_alerts: Vec<AlertRecord>,
}

/// Alert log persisted as a JSON document.
///
/// The file holds `{"dnsAlerts": [...]}`. Writes go to a sibling temp
/// file that is renamed over the log, so readers never see a partial
/// document.
#[derive(Debug)]
pub struct JsonFileAlertStore {
    path: PathBuf,
    max_alerts: usize,
    write_lock: Mutex<()>,
}

impl JsonFileAlertStore {
    /// Create a store backed by `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>, max_alerts: usize) -> Self {
        Self {
            path: path.into(),
            max_alerts,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_content(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Store(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn parse(&self, content: &str) -> Result<Vec<AlertRecord>> {
        let file: AlertLogFile = serde_json::from_str(content).map_err(|e| {
            Error::Store(format!("failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(file.dns_alerts)
    }

    async fn read(&self) -> Result<Vec<AlertRecord>> {
        match self.read_content().await? {
            Some(content) => self.parse(&content),
            None => Ok(Vec::new()),
        }
    }

    /// Read the log for an append. An unparsable log is moved aside and
    /// history restarts, so new alerts are still recorded.
    async fn read_for_append(&self) -> Result<Vec<AlertRecord>> {
        let Some(content) = self.read_content().await? else {
            return Ok(Vec::new());
        };
        match self.parse(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                let aside = self.path.with_extension("json.corrupt");
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "alert log unreadable, starting a new history"
                );
                if let Err(e) = tokio::fs::rename(&self.path, &aside).await {
                    warn!(error = %e, "failed to move unreadable alert log aside");
                }
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, records: Vec<AlertRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(&AlertLogFile {
            dns_alerts: records,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AlertStore for JsonFileAlertStore {
    async fn append(&self, record: AlertRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_for_append().await?;
        push_bounded(&mut records, record, self.max_alerts);
        debug!(path = %self.path.display(), count = records.len(), "writing alert log");
        self.write(records).await
    }

    async fn list(&self) -> Result<Vec<AlertRecord>> {
        self.read().await
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn record(n: i64) -> AlertRecord {
        AlertRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n),
            domain: format!("site{n}.example"),
            connected_ip: "1.2.3.4".into(),
            doh_ips: vec!["93.184.216.34".into()],
            url: format!("https://site{n}.example/"),
        }
    }

    #[tokio::test]
    async fn memory_store_is_newest_first_and_bounded() {
        let store = MemoryAlertStore::with_max_alerts(3);
        for n in 0..5 {
            store.append(record(n)).await.unwrap();
            assert!(store.list().await.unwrap().len() <= 3);
        }
        let domains: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.domain)
            .collect();
        assert_eq!(domains, vec!["site4.example", "site3.example", "site2.example"]);
    }

    #[tokio::test]
    async fn clear_then_list_is_empty() {
        let store = MemoryAlertStore::new();
        store.append(record(1)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() {
        let store = Arc::new(MemoryAlertStore::with_max_alerts(100));
        let tasks: Vec<_> = (0..50)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(record(n)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn file_store_missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAlertStore::new(dir.path().join("alerts.json"), DEFAULT_MAX_ALERTS);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_persists_under_log_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("alerts.json");
        let store = JsonFileAlertStore::new(&path, 2);
        for n in 0..3 {
            store.append(record(n)).await.unwrap();
        }

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let alerts = raw[ALERT_LOG_KEY].as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0]["domain"], "site2.example");
        assert_eq!(alerts[0]["connectedIp"], "1.2.3.4");

        let reopened = JsonFileAlertStore::new(&path, 2);
        assert_eq!(reopened.list().await.unwrap()[1].domain, "site1.example");

        reopened.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn file_store_serializes_concurrent_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileAlertStore::new(dir.path().join("alerts.json"), 10));
        let tasks: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(record(n)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn corrupt_log_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileAlertStore::new(&path, DEFAULT_MAX_ALERTS);
        assert!(matches!(store.list().await, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn append_recovers_from_corrupt_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileAlertStore::new(&path, DEFAULT_MAX_ALERTS);

        store.append(record(0)).await.unwrap();
        store.append(record(1)).await.unwrap();

        let domains: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.domain)
            .collect();
        assert_eq!(domains, vec!["site1.example", "site0.example"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("alerts.json.corrupt")).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn log_key_matches_serialized_field() {
        let value = serde_json::to_value(AlertLogFile::default()).unwrap();
        assert!(value.get(ALERT_LOG_KEY).is_some());
    }
}
