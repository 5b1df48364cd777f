//! Trusted resolver seam.

use async_trait::async_trait;

use crate::types::TrustedAddressSet;

/// Source of trusted addresses for a domain.
///
/// Implementations are best-effort: failures are absorbed and reported as
/// an empty set, which callers treat as "cannot judge".
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up every A and AAAA address for `domain`
    async fn lookup_trusted_addresses(&self, domain: &str) -> TrustedAddressSet;
}

#[async_trait]
impl<R: AddressResolver + ?Sized> AddressResolver for std::sync::Arc<R> {
    async fn lookup_trusted_addresses(&self, domain: &str) -> TrustedAddressSet {
        (**self).lookup_trusted_addresses(domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Fixed(&'static [&'static str]);

    #[async_trait]
    impl AddressResolver for Fixed {
        async fn lookup_trusted_addresses(&self, _domain: &str) -> TrustedAddressSet {
            self.0.iter().copied().collect()
        }
    }

    #[tokio::test]
    async fn arc_forwards_to_inner() {
        let resolver: Arc<dyn AddressResolver> = Arc::new(Fixed(&["10.0.0.1"]));
        let set = resolver.lookup_trusted_addresses("example.com").await;
        assert!(set.contains("10.0.0.1"));
    }
}
