//! One-shot cross-check of the system resolver against trusted DNS.
//!
//! Resolves a domain through the host's configured resolver and through
//! the trusted resolver, then reports system answers the relatedness
//! policy cannot explain.

use dohwatch_core::{AddressRelatednessPolicy, AddressResolver, Error, Result, TrustedAddressSet};
use hickory_resolver::TokioResolver;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Result of comparing the two resolvers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Neither resolver returned anything
    Unresolved,
    /// Only the trusted resolver answered
    SystemFailed,
    /// Only the system resolver answered
    TrustedFailed,
    /// Both answered; `suspicious` lists unexplained system answers
    Compared {
        /// System addresses not related to any trusted address
        suspicious: Vec<String>,
    },
}

/// Per-domain cross-check report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Domain checked
    pub domain: String,
    /// Addresses from the system resolver
    pub system_ips: Vec<String>,
    /// Addresses from the trusted resolver
    pub trusted_ips: Vec<String>,
    /// Comparison outcome
    pub outcome: CheckOutcome,
}

impl CheckReport {
    /// Compare system answers against trusted answers
    #[must_use]
    pub fn compare(
        domain: impl Into<String>,
        system_ips: Vec<String>,
        trusted: &TrustedAddressSet,
        policy: &dyn AddressRelatednessPolicy,
    ) -> Self {
        let outcome = match (system_ips.is_empty(), trusted.is_empty()) {
            (true, true) => CheckOutcome::Unresolved,
            (true, false) => CheckOutcome::SystemFailed,
            (false, true) => CheckOutcome::TrustedFailed,
            (false, false) => CheckOutcome::Compared {
                suspicious: system_ips
                    .iter()
                    .filter(|ip| !policy.is_related(ip, trusted))
                    .cloned()
                    .collect(),
            },
        };

        Self {
            domain: domain.into(),
            system_ips,
            trusted_ips: trusted.to_vec(),
            outcome,
        }
    }

    /// Returns true if any system answer was unexplained
    #[must_use]
    pub fn is_suspicious(&self) -> bool {
        matches!(&self.outcome, CheckOutcome::Compared { suspicious } if !suspicious.is_empty())
    }
}

/// Cross-checks the host resolver against a trusted resolver
pub struct SystemCheck {
    system: TokioResolver,
    trusted: Arc<dyn AddressResolver>,
    policy: Arc<dyn AddressRelatednessPolicy>,
}

impl SystemCheck {
    /// Create a checker using the host's resolver configuration
    pub fn new(
        trusted: Arc<dyn AddressResolver>,
        policy: Arc<dyn AddressRelatednessPolicy>,
    ) -> Result<Self> {
        let system = TokioResolver::builder_tokio()
            .map_err(|e| Error::Resolver(format!("failed to create resolver: {e}")))?
            .build();
        Ok(Self {
            system,
            trusted,
            policy,
        })
    }

    /// Resolve `domain` both ways and compare
    pub async fn check(&self, domain: &str) -> CheckReport {
        let (system_ips, trusted) = tokio::join!(
            self.resolve_system(domain),
            self.trusted.lookup_trusted_addresses(domain)
        );
        CheckReport::compare(domain, system_ips, &trusted, self.policy.as_ref())
    }

    async fn resolve_system(&self, domain: &str) -> Vec<String> {
        match self.system.lookup_ip(domain).await {
            Ok(lookup) => lookup
                .iter()
                .map(|ip| ip.to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Err(e) => {
                debug!(domain, error = %e, "system resolution failed");
                Vec::new()
            }
        }
    }
}
