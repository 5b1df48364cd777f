use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All A/AAAA answers a trusted resolver reported for one domain.
///
/// Addresses are kept in textual form exactly as the resolver returned
/// them. Ordering is only used to render a stable list; it carries no
/// meaning. An empty set means the lookup was inconclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedAddressSet(BTreeSet<String>);

impl TrustedAddressSet {
    /// Create an empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Add an address, returning false if it was already present
    pub fn insert(&mut self, addr: impl Into<String>) -> bool {
        self.0.insert(addr.into())
    }

    /// Returns true if the exact textual address is in the set
    #[must_use]
    pub fn contains(&self, addr: &str) -> bool {
        self.0.contains(addr)
    }

    /// Returns true if no addresses were resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct addresses
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the addresses
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Render the set as a list
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl Extend<String> for TrustedAddressSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<S: Into<String>> FromIterator<S> for TrustedAddressSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for TrustedAddressSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
