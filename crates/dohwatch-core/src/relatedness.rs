//! Deciding whether a connected IP is plausibly one of a domain's real addresses.
//!
//! An exact match against the trusted answers is the strong signal. Large
//! providers rotate addresses inside big allocations, so a connected IP
//! that shares a wide prefix with any trusted answer also counts: the first
//! two octets for IPv4 (/16) and the first three groups for IPv6 (/48).
//!
//! This is a coarse textual comparison, not CIDR arithmetic. It needs no
//! ownership database and is intentionally approximate.

use crate::types::TrustedAddressSet;

/// Number of leading IPv4 octets that must match (/16)
const IPV4_PREFIX_OCTETS: usize = 2;

/// Number of leading IPv6 groups that must match (/48)
const IPV6_PREFIX_GROUPS: usize = 3;

/// A /48 prefix that never counts as a shared range
const IPV6_ZERO_PREFIX: &str = "0000:0000:0000";

/// Strategy for deciding whether a connection is explained by trusted answers.
///
/// Lets a real CIDR/ASN-backed implementation replace the heuristic without
/// touching the alert pipeline.
pub trait AddressRelatednessPolicy: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Returns true if `connected_ip` is explained by `trusted`
    fn is_related(&self, connected_ip: &str, trusted: &TrustedAddressSet) -> bool;
}

/// Exact match first, then /16 (IPv4) or /48 (IPv6) proximity
#[derive(Debug, Clone, Copy, Default)]
pub struct WideRangePolicy;

impl AddressRelatednessPolicy for WideRangePolicy {
    fn name(&self) -> &'static str {
        "wide-range"
    }

    fn is_related(&self, connected_ip: &str, trusted: &TrustedAddressSet) -> bool {
        is_related(connected_ip, trusted)
    }
}

/// Only literal membership counts
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchPolicy;

impl AddressRelatednessPolicy for ExactMatchPolicy {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn is_related(&self, connected_ip: &str, trusted: &TrustedAddressSet) -> bool {
        trusted.contains(connected_ip)
    }
}

/// Returns true if `connected_ip` is in `trusted` or shares a wide range with any member
#[must_use]
pub fn is_related(connected_ip: &str, trusted: &TrustedAddressSet) -> bool {
    trusted.contains(connected_ip) || trusted.iter().any(|t| same_wide_range(connected_ip, t))
}

/// Returns true if both addresses fall in the same /16 (IPv4) or /48 (IPv6).
///
/// Mixed families and malformed input are never related. An all-zero /48
/// never matches anything, so `::1` and `::2` are unrelated.
#[must_use]
pub fn same_wide_range(a: &str, b: &str) -> bool {
    match (a.contains(':'), b.contains(':')) {
        (true, true) => match (ipv6_prefix(a), ipv6_prefix(b)) {
            (Some(pa), Some(pb)) => {
                pa != IPV6_ZERO_PREFIX && pb != IPV6_ZERO_PREFIX && pa == pb
            }
            _ => false,
        },
        (false, false) => match (parse_dotted_quad(a), parse_dotted_quad(b)) {
            (Some(oa), Some(ob)) => oa[..IPV4_PREFIX_OCTETS] == ob[..IPV4_PREFIX_OCTETS],
            _ => false,
        },
        _ => false,
    }
}

/// Expand an IPv6 address to eight colon-separated four-digit lowercase groups.
///
/// Returns `None` unless the input expands to exactly eight hex groups.
#[must_use]
pub fn expand_ipv6(addr: &str) -> Option<String> {
    let lower = addr.to_ascii_lowercase();

    let groups: Vec<&str> = match lower.split_once("::") {
        Some((head, tail)) => {
            if tail.contains("::") {
                return None;
            }
            let head = split_groups(head);
            let tail = split_groups(tail);
            let given = head.len() + tail.len();
            // `::` stands for at least one zero group
            if given >= 8 {
                return None;
            }
            let mut groups = head;
            groups.extend(std::iter::repeat("0").take(8 - given));
            groups.extend(tail);
            groups
        }
        None => lower.split(':').collect(),
    };

    if groups.len() != 8 {
        return None;
    }

    let mut expanded = Vec::with_capacity(8);
    for group in groups {
        if group.is_empty() || group.len() > 4 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        expanded.push(format!("{group:0>4}"));
    }
    Some(expanded.join(":"))
}

fn split_groups(part: &str) -> Vec<&str> {
    if part.is_empty() {
        Vec::new()
    } else {
        part.split(':').collect()
    }
}

fn ipv6_prefix(addr: &str) -> Option<String> {
    let expanded = expand_ipv6(addr)?;
    // Each group is exactly 4 chars plus a separator
    let len = IPV6_PREFIX_GROUPS * 5 - 1;
    Some(expanded[..len].to_string())
}

/// Split a dotted-quad IPv4 string into its four 1-3 digit components
pub(crate) fn parse_dotted_quad(addr: &str) -> Option<[&str; 4]> {
    let mut parts = addr.split('.');
    let mut octets = [""; 4];
    for slot in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(addrs: &[&str]) -> TrustedAddressSet {
        addrs.iter().copied().collect()
    }

    #[test]
    fn exact_member_is_related() {
        let trusted = set(&["93.184.216.34", "2606:2800:220:1:248:1893:25c8:1946"]);
        for ip in trusted.iter() {
            assert!(is_related(ip, &trusted));
            assert!(ExactMatchPolicy.is_related(ip, &trusted));
        }
    }

    #[test]
    fn ipv4_same_slash16() {
        assert!(same_wide_range("104.16.5.10", "104.16.1.2"));
        assert!(same_wide_range("104.16.0.0", "104.16.255.255"));
        assert!(!same_wide_range("104.17.5.10", "104.16.5.10"));
        assert!(!same_wide_range("1.2.3.4", "93.184.216.34"));
    }

    #[test]
    fn ipv4_compares_text_not_value() {
        assert!(!same_wide_range("010.1.2.3", "10.1.2.3"));
    }

    #[test]
    fn ipv4_malformed_is_unrelated() {
        assert!(!same_wide_range("104.16.5", "104.16.1.2"));
        assert!(!same_wide_range("104.16.5.10.1", "104.16.1.2"));
        assert!(!same_wide_range("104.16.x.10", "104.16.1.2"));
        assert!(!same_wide_range("1040.16.5.10", "1040.16.1.2"));
        assert!(!same_wide_range("", ""));
    }

    #[test]
    fn expands_ipv6() {
        assert_eq!(
            expand_ipv6("::1").as_deref(),
            Some("0000:0000:0000:0000:0000:0000:0000:0001")
        );
        assert_eq!(
            expand_ipv6("::").as_deref(),
            Some("0000:0000:0000:0000:0000:0000:0000:0000")
        );
        assert_eq!(
            expand_ipv6("2001:DB8::8a2e:370:7334").as_deref(),
            Some("2001:0db8:0000:0000:0000:8a2e:0370:7334")
        );
        assert_eq!(
            expand_ipv6("fe80::").as_deref(),
            Some("fe80:0000:0000:0000:0000:0000:0000:0000")
        );
        assert_eq!(
            expand_ipv6("1:2:3:4:5:6:7:8").as_deref(),
            Some("0001:0002:0003:0004:0005:0006:0007:0008")
        );
    }

    #[test]
    fn rejects_malformed_ipv6() {
        assert_eq!(expand_ipv6("1:2:3"), None);
        assert_eq!(expand_ipv6("1::2::3"), None);
        assert_eq!(expand_ipv6("1:2:3:4:5:6:7:8:9"), None);
        assert_eq!(expand_ipv6("1:2:3:4::5:6:7:8"), None);
        assert_eq!(expand_ipv6("12345::1"), None);
        assert_eq!(expand_ipv6("::ffff:1.2.3.4"), None);
        assert_eq!(expand_ipv6("gggg::1"), None);
    }

    #[test]
    fn ipv6_same_slash48() {
        assert!(same_wide_range(
            "2606:4700:4700::1111",
            "2606:4700:4700:0:0:0:0:1001"
        ));
        assert!(same_wide_range("2a00:1450:4001:81c::200e", "2a00:1450:4001:800::2004"));
        assert!(!same_wide_range("2a00:1450:4001::1", "2a00:1450:4002::1"));
    }

    #[test]
    fn ipv6_zero_prefix_never_matches() {
        assert!(!same_wide_range("::1", "::2"));
        assert!(!same_wide_range("::1", "2606:4700::1"));
        assert!(!same_wide_range("::", "::"));
    }

    #[test]
    fn link_local_is_not_special_cased() {
        assert!(same_wide_range("fe80::1", "fe80::2"));
    }

    #[test]
    fn mixed_families_are_unrelated() {
        assert!(!same_wide_range("1.2.3.4", "::ffff:102:304"));
        assert!(!same_wide_range("2606:4700::1", "104.16.1.2"));
    }

    #[test]
    fn spoofed_connection_is_unrelated() {
        let trusted = set(&["93.184.216.34"]);
        assert!(!is_related("1.2.3.4", &trusted));
        assert!(!WideRangePolicy.is_related("1.2.3.4", &trusted));
    }

    #[test]
    fn cdn_rotation_is_related() {
        let trusted = set(&["104.16.1.2"]);
        assert!(WideRangePolicy.is_related("104.16.5.10", &trusted));
        assert!(!ExactMatchPolicy.is_related("104.16.5.10", &trusted));
    }

    #[test]
    fn empty_set_relates_nothing() {
        assert!(!is_related("1.2.3.4", &TrustedAddressSet::new()));
    }

    #[test]
    fn dotted_quad_parsing() {
        assert_eq!(parse_dotted_quad("10.0.0.1"), Some(["10", "0", "0", "1"]));
        assert_eq!(parse_dotted_quad("example.com"), None);
        assert_eq!(parse_dotted_quad("1.2.3.4."), None);
    }
}
