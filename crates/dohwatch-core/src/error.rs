use thiserror::Error;

/// Result type alias for dohwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, evaluating or recording alerts
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request to the DoH endpoint failed to complete
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// DoH endpoint answered with a non-success HTTP status
    #[error("DoH endpoint returned HTTP {code}")]
    Api {
        /// HTTP status code
        code: u16,
    },

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// DoH response carried a non-zero DNS status (NXDOMAIN, SERVFAIL, ...)
    #[error("DNS response status {0}")]
    DnsStatus(u32),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// System resolver could not be created or queried
    #[error("system resolver error: {0}")]
    Resolver(String),

    /// Alert log could not be read or written
    #[error("alert store error: {0}")]
    Store(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Notifier failed to deliver an alert
    #[error("notification failed: {0}")]
    Notify(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the error came from a single DoH lookup.
    ///
    /// These are recovered inside the resolver and only ever reduce the
    /// trusted address set; they never fail an evaluation.
    #[must_use]
    pub const fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Json(_) | Self::DnsStatus(_)
        )
    }

    /// Returns the HTTP status code if the DoH endpoint rejected the request
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code } => Some(*code),
            _ => None,
        }
    }
}
