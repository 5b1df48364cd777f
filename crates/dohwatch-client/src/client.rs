//! DNS JSON client implementation.

use crate::config::ClientConfig;
use async_trait::async_trait;
use dohwatch_core::{AddressResolver, DohResponse, Error, RecordType, Result, TrustedAddressSet};
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Media type for DNS JSON responses
const DNS_JSON: &str = "application/dns-json";

/// Trusted DNS-over-HTTPS resolver
#[derive(Clone)]
pub struct DohClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    endpoint: Url,
}

impl DohClient {
    /// Create a client for the default endpoint
    pub fn new() -> Result<Self> {
        DohClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> DohClientBuilder {
        DohClientBuilder::new()
    }

    /// Create a client from a configuration value
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        DohClientBuilder::new()
            .endpoint(&config.endpoint)
            .user_agent(&config.user_agent)
            .build()
    }

    /// The endpoint queries are sent to
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Run a single query and return the address answers.
    ///
    /// Fails on transport errors, non-success HTTP statuses, undecodable
    /// bodies and non-zero DNS status codes.
    pub async fn query(&self, domain: &str, record_type: RecordType) -> Result<Vec<String>> {
        let url = self.build_url(domain, record_type);
        debug!(url = %url, "DoH request");

        let response = self
            .inner
            .http
            .get(url)
            .header(ACCEPT, DNS_JSON)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let body = Self::handle_response(response).await?;
        if !body.is_success() {
            return Err(Error::DnsStatus(body.status));
        }

        Ok(body.addresses().map(String::from).collect())
    }

    /// Query A and AAAA concurrently and merge whatever succeeds.
    ///
    /// Each record type runs as its own task and both are always awaited.
    /// A failed query only contributes nothing; if both fail the set is
    /// empty.
    pub async fn lookup(&self, domain: &str) -> TrustedAddressSet {
        let handles = RecordType::ALL.map(|record_type| {
            let client = self.clone();
            let domain = domain.to_string();
            tokio::spawn(async move { client.query(&domain, record_type).await })
        });

        let mut addresses = TrustedAddressSet::new();
        for (record_type, handle) in RecordType::ALL.into_iter().zip(handles) {
            match handle.await {
                Ok(Ok(found)) => addresses.extend(found),
                Ok(Err(e)) => {
                    debug!(domain, %record_type, error = %e, "DoH query failed");
                }
                Err(e) => {
                    warn!(domain, %record_type, error = %e, "DoH query task did not complete");
                }
            }
        }
        addresses
    }

    fn build_url(&self, domain: &str, record_type: RecordType) -> Url {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("name", domain)
            .append_pair("type", record_type.as_str());
        url
    }

    async fn handle_response(response: reqwest::Response) -> Result<DohResponse> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        serde_json::from_str(&body).map_err(Error::Json)
    }
}

#[async_trait]
impl AddressResolver for DohClient {
    async fn lookup_trusted_addresses(&self, domain: &str) -> TrustedAddressSet {
        self.lookup(domain).await
    }
}

/// Builder for configuring a [`DohClient`]
pub struct DohClientBuilder {
    config: ClientConfig,
}

impl DohClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the endpoint URL (useful for testing)
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<DohClient> {
        let endpoint = Url::parse(&self.config.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.config.endpoint)))?;

        let http = HttpClient::builder()
            .user_agent(&self.config.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(DohClient {
            inner: Arc::new(ClientInner { http, endpoint }),
        })
    }
}

impl Default for DohClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
