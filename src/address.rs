/* src/address.rs */

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::private::is_private_or_local;

/// An IP address with an optional IPv6 zone, as found in headers or peer addresses.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are folded into their IPv4
/// form on construction, so both spellings compare, match ranges and display
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    ip: IpAddr,
    zone: Option<String>,
}

impl Address {
    /// Create an address without a zone.
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_canonical(),
            zone: None,
        }
    }

    /// Create an address with a zone. An empty zone is treated as no zone.
    pub fn with_zone(ip: IpAddr, zone: impl Into<String>) -> Self {
        let zone = zone.into();
        Self {
            ip: ip.to_canonical(),
            zone: (!zone.is_empty()).then_some(zone),
        }
    }

    /// The IP address, with IPv4-mapped IPv6 already folded to IPv4.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// The zone identifier, if any.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Whether this is `0.0.0.0` or `::`.
    pub fn is_unspecified(&self) -> bool {
        self.ip.is_unspecified()
    }

    /// Whether the IP is loopback, link-local, unique-local or RFC 1918 private.
    pub fn is_private_or_local(&self) -> bool {
        is_private_or_local(self.ip)
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self::new(ip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.zone {
            Some(zone) => write!(f, "{}%{}", self.ip, zone),
            None => write!(f, "{}", self.ip),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_address(s).ok_or_else(|| Error::InvalidIpFormat(s.to_string()))
    }
}

/// Parse one address token, discarding any port.
///
/// Accepts `ip`, `ipv4:port`, `[ipv6]`, `[ipv6]:port`, `ipv6%zone` and
/// `[ipv6%zone]:port`. Ports are skipped, never validated. The unspecified
/// address is accepted; see [`parse_client_address`] for the strict variant.
///
/// # Examples
///
/// ```rust
/// use real_client_ip::parse_address;
///
/// let addr = parse_address("[fe80::abcd%eth0]:4711").unwrap();
/// assert_eq!(addr.to_string(), "fe80::abcd%eth0");
///
/// let mapped = parse_address("::ffff:188.0.2.128").unwrap();
/// assert_eq!(mapped.to_string(), "188.0.2.128");
/// ```
pub fn parse_address(token: &str) -> Option<Address> {
    let host = strip_port(token)?;

    let (ip, zone) = match host.split_once('%') {
        Some((ip, zone)) => (ip, zone),
        None => (host, ""),
    };

    let ip = ip.parse::<IpAddr>().ok()?;
    Some(Address::with_zone(ip, zone))
}

/// Parse an address that is expected to identify a client.
///
/// Same grammar as [`parse_address`], but `0.0.0.0` and `::` are rejected:
/// they never identify a real client.
pub fn parse_client_address(token: &str) -> Option<Address> {
    parse_address(token).filter(|addr| !addr.is_unspecified())
}

/// Remove a port suffix, returning the host part (which may still carry a zone).
fn strip_port(token: &str) -> Option<&str> {
    if let Some(rest) = token.strip_prefix('[') {
        let (host, suffix) = rest.split_once(']')?;
        return (suffix.is_empty() || suffix.starts_with(':')).then_some(host);
    }

    // Bare IPv6 has several colons and is never split.
    match token.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':')
                && !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Some(host)
        }
        _ => Some(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(ip: &str, zone: &str) -> Address {
        Address::with_zone(ip.parse().unwrap(), zone)
    }

    #[test]
    fn test_parse_address_forms() {
        let cases = [
            ("1.1.1.1%", addr("1.1.1.1", "")),
            ("1.1.1.1", addr("1.1.1.1", "")),
            ("fe80::abcd%zone", addr("fe80::abcd", "zone")),
            ("[2607:f8b0:4004:83f::200e%zone]:4484", addr("2607:f8b0:4004:83f::200e", "zone")),
            ("1.1.1.1:48944", addr("1.1.1.1", "")),
            ("[fe80::abcd%eth0]:xyz", addr("fe80::abcd", "eth0")),
            ("[2607:f8b0:4004:83f::18]", addr("2607:f8b0:4004:83f::18", "")),
            ("2607:f8b0:4004:83f::18", addr("2607:f8b0:4004:83f::18", "")),
            ("0.0.0.0", addr("0.0.0.0", "")),
            ("::", addr("::", "")),
        ];

        for (input, want) in cases {
            assert_eq!(parse_address(input), Some(want), "input {input:?}");
        }
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        let cases = [
            "nope%zone",
            "nope!!",
            "",
            "@",
            "[::1",
            "[::1]x",
            "1.1.1.1:",
            "7.7.7.7.7",
            "::1]",
        ];

        for input in cases {
            assert_eq!(parse_address(input), None, "input {input:?}");
        }
    }

    #[test]
    fn test_client_address_rejects_unspecified() {
        assert_eq!(parse_client_address("0.0.0.0"), None);
        assert_eq!(parse_client_address("::"), None);
        assert_eq!(parse_client_address("[::]:80"), None);
        assert_eq!(parse_client_address("::ffff:0.0.0.0"), None);
        assert_eq!(parse_client_address("1.1.1.1:48944"), Some(addr("1.1.1.1", "")));
        assert_eq!(
            parse_client_address("[fe80::abcd%eth0]:xyz"),
            Some(addr("fe80::abcd", "eth0"))
        );
    }

    #[test]
    fn test_canonical_display() {
        let cases = [
            ("[::ffff:172.21.0.6]:4747", "172.21.0.6"),
            ("0:0:0:0:0:ffff:bc15:0006", "188.21.0.6"),
            ("[64:ff9b::188.0.2.128]:4747", "64:ff9b::bc00:280"),
            ("[2002:c000:204::]:4747", "2002:c000:204::"),
            ("[fe80::2222%eth0]:4848", "fe80::2222%eth0"),
            ("2607:F8B0:4004:083F:0:0:0:0018", "2607:f8b0:4004:83f::18"),
        ];

        for (input, want) in cases {
            assert_eq!(parse_address(input).unwrap().to_string(), want, "input {input:?}");
        }
    }

    #[test]
    fn test_mapped_and_plain_ipv4_are_equal() {
        assert_eq!(parse_address("::ffff:188.0.2.128"), parse_address("188.0.2.128"));
        assert_eq!(parse_address("::ffff:bc00:280"), parse_address("188.0.2.128"));
    }

    #[test]
    fn test_from_str() {
        let parsed: Address = "[::1]:8080".parse().unwrap();
        assert_eq!(parsed, addr("::1", ""));

        let err = "nope".parse::<Address>().unwrap_err();
        assert_eq!(err, Error::InvalidIpFormat("nope".to_string()));
    }
}
