use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::relatedness::parse_dotted_quad;

/// One completed network request, as reported by a connection observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionObservation {
    /// Hostname the client requested
    pub domain: String,

    /// IP address the client connected to
    pub connected_ip: String,

    /// Full request URL
    pub url: String,

    /// When the request completed
    pub observed_at: DateTime<Utc>,
}

impl ConnectionObservation {
    /// Create an observation stamped with the current time.
    ///
    /// Surrounding whitespace is stripped from the domain and IP, so the
    /// filter and the resolver see the same host.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        connected_ip: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into().trim().to_string(),
            connected_ip: connected_ip.into().trim().to_string(),
            url: url.into(),
            observed_at: Utc::now(),
        }
    }

    /// Returns true if the domain is worth checking.
    ///
    /// Empty hosts, `localhost` and literal IPv4 hosts have nothing a
    /// resolver could vouch for.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !self.domain.is_empty()
            && !self.domain.eq_ignore_ascii_case("localhost")
            && parse_dotted_quad(&self.domain).is_none()
    }
}

/// Raw completed-request event in the shape browser request hooks emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    /// Request URL
    pub url: String,

    /// Remote IP the request was served from, if known
    #[serde(default)]
    pub ip: Option<String>,

    /// Completion time in milliseconds since the Unix epoch
    #[serde(default)]
    pub time_stamp: Option<f64>,
}

impl RequestEvent {
    /// Convert into an observation.
    ///
    /// Returns `None` for non-network schemes, missing IPs, and URLs whose
    /// host is not a domain name.
    #[must_use]
    pub fn into_observation(self) -> Option<ConnectionObservation> {
        let ip = self.ip.filter(|ip| !ip.trim().is_empty())?;
        let parsed = Url::parse(&self.url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        let domain = parsed.domain()?.to_string();

        #[allow(clippy::cast_possible_truncation)]
        let observed_at = self
            .time_stamp
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            .unwrap_or_else(Utc::now);

        Some(ConnectionObservation {
            domain,
            connected_ip: ip.trim().to_string(),
            url: self.url,
            observed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(url: &str, ip: Option<&str>) -> RequestEvent {
        RequestEvent {
            url: url.into(),
            ip: ip.map(String::from),
            time_stamp: Some(1_714_564_800_000.0),
        }
    }

    #[test]
    fn applicable_domains() {
        assert!(ConnectionObservation::new("example.com", "1.2.3.4", "").is_applicable());
        assert!(!ConnectionObservation::new("", "1.2.3.4", "").is_applicable());
        assert!(!ConnectionObservation::new("localhost", "127.0.0.1", "").is_applicable());
        assert!(!ConnectionObservation::new("LOCALHOST", "127.0.0.1", "").is_applicable());
        assert!(!ConnectionObservation::new("192.168.1.1", "192.168.1.1", "").is_applicable());
        // Looks numeric but is not a dotted quad
        assert!(ConnectionObservation::new("1234.5.6.7", "1.2.3.4", "").is_applicable());
    }

    #[test]
    fn new_normalizes_padded_domain() {
        let obs = ConnectionObservation::new("  example.com\n", " 1.2.3.4 ", "");
        assert_eq!(obs.domain, "example.com");
        assert_eq!(obs.connected_ip, "1.2.3.4");
        assert!(obs.is_applicable());
        assert!(!ConnectionObservation::new("   ", "1.2.3.4", "").is_applicable());
        assert!(!ConnectionObservation::new(" localhost ", "127.0.0.1", "").is_applicable());
    }

    #[test]
    fn event_becomes_observation() {
        let obs = event("https://cdn.example/app.js", Some("104.16.5.10"))
            .into_observation()
            .unwrap();
        assert_eq!(obs.domain, "cdn.example");
        assert_eq!(obs.connected_ip, "104.16.5.10");
        assert_eq!(obs.observed_at.timestamp(), 1_714_564_800);
    }

    #[test]
    fn event_without_ip_is_skipped() {
        assert!(event("https://example.com/", None).into_observation().is_none());
        assert!(event("https://example.com/", Some("")).into_observation().is_none());
    }

    #[test]
    fn non_network_schemes_are_skipped() {
        assert!(event("data:text/plain,hi", Some("1.2.3.4")).into_observation().is_none());
        assert!(event("file:///etc/hosts", Some("1.2.3.4")).into_observation().is_none());
        assert!(event("not a url", Some("1.2.3.4")).into_observation().is_none());
    }

    #[test]
    fn ip_literal_hosts_are_skipped() {
        assert!(event("http://10.0.0.1/", Some("10.0.0.1")).into_observation().is_none());
        assert!(event("http://[::1]:8080/", Some("::1")).into_observation().is_none());
    }
}
