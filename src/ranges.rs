/* src/ranges.rs */

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net};

use crate::error::{Error, Result};

/// Cloudflare edge ranges, as published at <https://www.cloudflare.com/ips/>.
///
/// Pass to [`RangeSet::compile`] when the service sits directly behind Cloudflare.
pub const CLOUDFLARE: &[&str] = &[
    "173.245.48.0/20",
    "103.21.244.0/22",
    "103.22.200.0/22",
    "103.31.4.0/22",
    "141.101.64.0/18",
    "108.162.192.0/18",
    "190.93.240.0/20",
    "188.114.96.0/20",
    "197.234.240.0/22",
    "198.41.128.0/17",
    "162.158.0.0/15",
    "104.16.0.0/13",
    "104.24.0.0/14",
    "172.64.0.0/13",
    "131.0.72.0/22",
    "2400:cb00::/32",
    "2606:4700::/32",
    "2803:f800::/32",
    "2405:b500::/32",
    "2405:8100::/32",
    "2a06:98c0::/29",
    "2c0f:f248::/32",
];

/// Loopback, link-local, unique-local and RFC 1918 ranges.
pub const PRIVATE_AND_LOCAL: &[&str] = &[
    "127.0.0.0/8",
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

/// Parse one trusted range: either a bare address or `address/prefix`.
///
/// Bare addresses become /32 or /128, host bits are masked off, and
/// IPv4-mapped IPv6 ranges with a prefix of at least 96 are rewritten as the
/// equivalent IPv4 range.
pub fn parse_range(literal: &str) -> Result<IpNet> {
    if literal.is_empty() {
        return Err(Error::EmptyRange);
    }

    // A zone is interface-local and has no meaning in a network literal.
    if literal.contains('%') {
        return Err(Error::ZonedRange(literal.to_string()));
    }

    let invalid = || Error::InvalidRange(literal.to_string());

    let net = match literal.parse::<IpNet>() {
        Ok(net) => net,
        Err(_) => {
            let ip = literal.parse::<IpAddr>().map_err(|_| invalid())?;
            let prefix = if ip.is_ipv4() { 32 } else { 128 };
            IpNet::new(ip, prefix).map_err(|_| invalid())?
        }
    };

    Ok(normalize(net))
}

/// Mask off host bits and rewrite IPv4-mapped ranges (prefix 96 or more) as
/// the equivalent IPv4 range.
fn normalize(net: IpNet) -> IpNet {
    if let IpNet::V6(v6) = net {
        if v6.prefix_len() >= 96 {
            if let Some(v4) = v6.addr().to_ipv4_mapped() {
                if let Ok(v4) = Ipv4Net::new(v4, v6.prefix_len() - 96) {
                    return IpNet::V4(v4.trunc());
                }
            }
        }
    }

    net.trunc()
}

/// An ordered set of trusted address ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    nets: Vec<IpNet>,
}

impl RangeSet {
    /// Create an empty range set. Nothing is trusted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile address and CIDR literals into a range set.
    ///
    /// The first malformed literal fails the whole batch; a partially compiled
    /// set is never returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use real_client_ip::RangeSet;
    ///
    /// let trusted = RangeSet::compile(["10.0.0.0/8", "2001:db8::1"]).unwrap();
    /// assert!(trusted.contains("10.1.2.3".parse().unwrap()));
    /// assert!(trusted.contains("::ffff:10.1.2.3".parse().unwrap()));
    /// assert!(RangeSet::compile(["10.0.0.0/8", "fe80::1%eth0"]).is_err());
    /// ```
    pub fn compile<I, S>(literals: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nets = literals
            .into_iter()
            .map(|literal| parse_range(literal.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nets })
    }

    /// Whether `ip` falls in any range.
    ///
    /// IPv4-mapped IPv6 addresses are also tested in their IPv4 form, so a
    /// range written in either family matches both spellings.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let canonical = ip.to_canonical();
        self.nets
            .iter()
            .any(|net| net.contains(&canonical) || net.contains(&ip))
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// Whether the set has no ranges.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Iterate over the compiled ranges in the order they were given.
    pub fn iter(&self) -> impl Iterator<Item = &IpNet> {
        self.nets.iter()
    }
}

/// Nets are normalized the same way as [`parse_range`] output.
impl From<Vec<IpNet>> for RangeSet {
    fn from(nets: Vec<IpNet>) -> Self {
        Self {
            nets: nets.into_iter().map(normalize).collect(),
        }
    }
}
