//! Client configuration types.

use serde::{Deserialize, Serialize};

/// Google's public DNS JSON endpoint
pub const DEFAULT_ENDPOINT: &str = "https://dns.google/resolve";

/// Configuration for a [`DohClient`](crate::DohClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// DNS JSON endpoint; `name` and `type` are appended as query parameters
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// User-Agent header sent with every query
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    format!("dohwatch/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_google() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "https://dns.google/resolve");
        assert!(config.user_agent.starts_with("dohwatch/"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint": "https://cloudflare-dns.com/dns-query"}"#).unwrap();
        assert_eq!(config.endpoint, "https://cloudflare-dns.com/dns-query");
        assert_eq!(config.user_agent, default_user_agent());
    }
}
