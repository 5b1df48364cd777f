//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use dohwatch::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,

    /// Alert pipeline settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dohwatch", "dohwatch")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a file, falling back to defaults if it is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        config.monitor.validate()?;

        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Update a single setting by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "doh_endpoint" | "endpoint" => self.monitor.doh_endpoint = value.to_string(),
            "max_alerts" => self.monitor.max_alerts = value.parse()?,
            "alert_log" => self.monitor.alert_log = Some(PathBuf::from(value)),
            "notification_icon" => self.monitor.notification_icon = value.to_string(),
            "notification_priority" => self.monitor.notification_priority = value.parse()?,
            "max_in_flight" => self.monitor.max_in_flight = value.parse()?,
            _ => anyhow::bail!(
                "Unknown config key: {}\n\n\
                 Available keys:\n  \
                 output_format         - Default output format (pretty/json)\n  \
                 doh_endpoint          - DNS JSON endpoint used as trusted resolver\n  \
                 max_alerts            - Number of alerts kept in the log\n  \
                 alert_log             - Path of the alert log file\n  \
                 notification_icon     - Icon reference passed to notifiers\n  \
                 notification_priority - Notification priority\n  \
                 max_in_flight         - Concurrent evaluations in observe mode",
                key
            ),
        }
        self.monitor.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.output_format.is_none());
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("output", "json").unwrap();
        config.set("max_alerts", "5").unwrap();
        config.set("alert_log", "/var/lib/dohwatch/alerts.json").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.output_format, Some(OutputFormat::Json));
        assert_eq!(loaded.monitor.max_alerts, 5);
        assert_eq!(
            loaded.monitor.alert_log,
            Some(PathBuf::from("/var/lib/dohwatch/alerts.json"))
        );
    }

    #[test]
    fn reads_monitor_table() {
        let config: Config = toml::from_str(
            r#"
            output_format = "pretty"

            [monitor]
            doh_endpoint = "https://cloudflare-dns.com/dns-query"
            max_alerts = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.monitor.doh_endpoint, "https://cloudflare-dns.com/dns-query");
        assert_eq!(config.monitor.max_alerts, 50);
        assert_eq!(config.monitor.max_in_flight, 16);
    }

    #[test]
    fn rejects_unknown_and_invalid_keys() {
        let mut config = Config::default();
        assert!(config.set("api_key", "x").is_err());
        assert!(config.set("max_alerts", "many").is_err());
        assert!(config.set("max_alerts", "0").is_err());
    }
}
