//! Visitor IP address anonymization.
//!
//! Follows the truncation policy used by common web-analytics tools: the last
//! octet of an IPv4 address and the last 80 bits of an IPv6 address are
//! discarded before the address is used for anything else.

/// Token returned for loopback and other addresses starting with `::`.
const IPV6_UNSPECIFIED: &str = "::";

/// Colon-delimited IPv6 groups kept after truncation.
const IPV6_KEPT_GROUPS: usize = 4;

/// IPv6 addresses with at most this many groups are already compressed enough
/// to carry no host bits worth removing.
const IPV6_MAX_UNTOUCHED_GROUPS: usize = 5;

/// Anonymizes an IPv4 or IPv6 address given in textual form.
///
/// - Addresses starting with `::` (e.g. `::1`) collapse to `::`.
/// - IPv4: the last octet becomes `0` (`192.168.1.42` → `192.168.1.0`).
/// - IPv6: five or fewer groups are returned unchanged; otherwise the first
///   four groups are kept and `::` is appended.
///
/// The function works on text and never fails; malformed input is truncated by
/// the same rules.
///
/// # Examples
///
/// ```
/// use link_endings::utils::anonymize_ip::anonymize_ip;
///
/// assert_eq!(anonymize_ip("192.168.1.42"), "192.168.1.0");
/// assert_eq!(anonymize_ip("2001:db8:1:2:3:4:5:6"), "2001:db8:1:2::");
/// ```
pub fn anonymize_ip(ip: &str) -> String {
    if ip.starts_with(IPV6_UNSPECIFIED) {
        return IPV6_UNSPECIFIED.to_string();
    }

    if ip.contains('.') {
        let mut octets: Vec<&str> = ip.split('.').collect();
        if octets.len() >= 4 {
            octets[3] = "0";
        } else if let Some(last) = octets.last_mut() {
            *last = "0";
        }
        return octets.join(".");
    }

    let groups: Vec<&str> = ip.split(':').collect();
    if groups.len() <= IPV6_MAX_UNTOUCHED_GROUPS {
        return ip.to_string();
    }

    format!("{}{}", groups[..IPV6_KEPT_GROUPS].join(":"), IPV6_UNSPECIFIED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_last_octet_zeroed() {
        assert_eq!(anonymize_ip("192.168.1.42"), "192.168.1.0");
        assert_eq!(anonymize_ip("8.8.8.8"), "8.8.8.0");
    }

    #[test]
    fn test_ipv4_already_anonymized_is_stable() {
        let once = anonymize_ip("10.1.2.3");
        assert_eq!(anonymize_ip(&once), once);
    }

    #[test]
    fn test_ipv6_unspecified() {
        assert_eq!(anonymize_ip("::"), "::");
    }

    #[test]
    fn test_ipv6_loopback_collapses() {
        assert_eq!(anonymize_ip("::1"), "::");
    }

    #[test]
    fn test_ipv6_full_address_truncated() {
        assert_eq!(anonymize_ip("2001:db8:1:2:3:4:5:6"), "2001:db8:1:2::");
    }

    #[test]
    fn test_ipv6_truncation_is_stable() {
        let once = anonymize_ip("2001:db8:85a3:8d3:1319:8a2e:370:7348");
        assert_eq!(once, "2001:db8:85a3:8d3::");
        assert_eq!(anonymize_ip(&once), once);
    }

    #[test]
    fn test_ipv6_compressed_short_address_unchanged() {
        assert_eq!(anonymize_ip("2001:db8::1"), "2001:db8::1");
        assert_eq!(anonymize_ip("fe80::1:2"), "fe80::1:2");
    }

    #[test]
    fn test_ipv4_mapped_ipv6_is_fully_masked() {
        // Request handling unwraps mapped addresses before they get here.
        assert_eq!(anonymize_ip("::ffff:192.0.2.128"), "::");
    }

    #[test]
    fn test_embedded_ipv4_suffix_uses_ipv4_rule() {
        assert_eq!(anonymize_ip("64:ff9b:1:2:3:4:192.0.2.128"), "64:ff9b:1:2:3:4:192.0.2.0");
    }
}
