/* src/private.rs */

use std::net::IpAddr;

/// Check if an IP is private or local.
///
/// Covers loopback (`127.0.0.0/8`, `::1`), link-local (`169.254.0.0/16`,
/// `fe80::/10`), unique-local (`fc00::/7`) and RFC 1918 space, including the
/// IPv4-mapped IPv6 spelling of the IPv4 ranges.
pub fn is_private_or_local(ip: IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local(),
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback() ||
            (ipv6.segments()[0] & 0xfe00) == 0xfc00 || // Unique local
            (ipv6.segments()[0] & 0xffc0) == 0xfe80 // Link local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_or_local() {
        let cases = [
            ("127.0.0.2", true),
            ("::1", true),
            ("10.0.0.1", true),
            ("172.16.5.4", true),
            ("172.31.255.255", true),
            ("192.168.1.1", true),
            ("fd12:3456:789a:1::1", true),
            ("169.254.1.1", true),
            ("fe80::abcd", true),
            ("febf::1", true),
            ("::ffff:192.168.1.1", true),
            ("::ffff:ac15:0006", true),
            ("1.1.1.1", false),
            ("172.32.0.1", false),
            ("::ffff:188.0.2.128", false),
            ("fec0::1", false),
            ("2607:f8b0:4004:83f::18", false),
            ("64:ff9b::192.168.1.1", false),
        ];

        for (ip, want) in cases {
            assert_eq!(is_private_or_local(ip.parse().unwrap()), want, "ip {ip}");
        }
    }
}
