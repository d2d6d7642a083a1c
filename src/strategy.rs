/* src/strategy.rs */

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderName};
use tracing::{debug, trace};

use crate::address::{Address, parse_client_address};
use crate::error::{Error, Result};
use crate::headers::ListHeader;
use crate::ranges::RangeSet;

/// A policy for picking the client IP out of a request.
///
/// Strategies are validated when constructed and immutable afterwards, so a
/// single instance can be shared by every request handler.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Determine the client address from the request headers and the raw peer
    /// address of the connection (for example `"203.0.113.9:50122"`).
    ///
    /// Returns `None` when no trustworthy address can be determined.
    fn resolve(&self, headers: &HeaderMap, remote_addr: &str) -> Option<Address>;

    /// Like [`Strategy::resolve`], rendered as a canonical string.
    ///
    /// An empty string means no trustworthy client IP was found.
    fn client_ip(&self, headers: &HeaderMap, remote_addr: &str) -> String {
        self.resolve(headers, remote_addr)
            .map(|addr| addr.to_string())
            .unwrap_or_default()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn resolve(&self, headers: &HeaderMap, remote_addr: &str) -> Option<Address> {
        (**self).resolve(headers, remote_addr)
    }
}

impl<S: Strategy + ?Sized> Strategy for Arc<S> {
    fn resolve(&self, headers: &HeaderMap, remote_addr: &str) -> Option<Address> {
        (**self).resolve(headers, remote_addr)
    }
}

/// Validate a header name for a strategy that reads a single address.
fn single_header(name: &str) -> Result<HeaderName> {
    if name.is_empty() {
        return Err(Error::EmptyHeaderName);
    }

    if ListHeader::from_name(name).is_some() {
        return Err(Error::ReservedHeaderName(name.to_string()));
    }

    HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::InvalidHeaderName(name.to_string()))
}

/// Validate a header name for a strategy that reads a list of addresses.
fn list_header(name: &str) -> Result<ListHeader> {
    if name.is_empty() {
        return Err(Error::EmptyHeaderName);
    }

    ListHeader::from_name(name).ok_or_else(|| Error::UnsupportedListHeader(name.to_string()))
}

/// Uses the peer address of the connection and ignores all headers.
///
/// This is the right choice when the service is directly exposed to clients,
/// and the usual last entry of a [`ChainStrategy`](crate::ChainStrategy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteAddrStrategy;

impl Strategy for RemoteAddrStrategy {
    fn resolve(&self, _headers: &HeaderMap, remote_addr: &str) -> Option<Address> {
        let addr = parse_client_address(remote_addr);
        if addr.is_none() {
            trace!(remote_addr, "peer address is not a usable IP");
        }
        addr
    }
}

/// Reads a header that carries exactly one address, such as `X-Real-IP`,
/// `True-Client-IP` or `CF-Connecting-IP`.
///
/// Only use this when a trusted proxy sets (or overwrites) the header;
/// otherwise the client picks its own address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleIpHeaderStrategy {
    header: HeaderName,
}

impl SingleIpHeaderStrategy {
    /// Create a strategy for `header_name`.
    ///
    /// Fails for an empty or invalid name, and for `Forwarded` and
    /// `X-Forwarded-For`, which carry lists.
    pub fn new(header_name: &str) -> Result<Self> {
        let header = single_header(header_name)?;
        debug!(header = %header, "single IP header strategy configured");
        Ok(Self { header })
    }

    /// The header this strategy reads, lowercased.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Strategy for SingleIpHeaderStrategy {
    fn resolve(&self, headers: &HeaderMap, _remote_addr: &str) -> Option<Address> {
        let mut values = headers.get_all(&self.header).iter();

        let Some(value) = values.next() else {
            trace!(header = %self.header, "header absent");
            return None;
        };

        if values.next().is_some() {
            trace!(header = %self.header, "header repeated");
            return None;
        }

        let value = String::from_utf8_lossy(value.as_bytes());
        let addr = parse_client_address(value.trim());
        if addr.is_none() {
            trace!(header = %self.header, value = %value, "header value is not a usable IP");
        }
        addr
    }
}

/// Picks the leftmost valid, non-private address from `Forwarded` or
/// `X-Forwarded-For`.
///
/// The leftmost entry is written by the client itself, so this is trivially
/// spoofable. Use it only when the result is informational or the first hop is
/// sanitized by infrastructure you control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeftmostNonPrivateStrategy {
    header: ListHeader,
}

impl LeftmostNonPrivateStrategy {
    /// Create a strategy reading `Forwarded` or `X-Forwarded-For`.
    pub fn new(header_name: &str) -> Result<Self> {
        let header = list_header(header_name)?;
        debug!(%header, "leftmost non-private strategy configured");
        Ok(Self { header })
    }
}

impl Strategy for LeftmostNonPrivateStrategy {
    fn resolve(&self, headers: &HeaderMap, _remote_addr: &str) -> Option<Address> {
        let found = self
            .header
            .parse(headers)
            .into_iter()
            .flatten()
            .find(|addr| !addr.is_private_or_local());

        if found.is_none() {
            trace!(header = %self.header, "no public address in header");
        }
        found
    }
}

/// Picks the rightmost valid, non-private address from `Forwarded` or
/// `X-Forwarded-For`.
///
/// Suitable when every reverse proxy in front of the service has a private
/// address: the first public address from the right was added by the
/// proxy closest to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightmostNonPrivateStrategy {
    header: ListHeader,
}

impl RightmostNonPrivateStrategy {
    /// Create a strategy reading `Forwarded` or `X-Forwarded-For`.
    pub fn new(header_name: &str) -> Result<Self> {
        let header = list_header(header_name)?;
        debug!(%header, "rightmost non-private strategy configured");
        Ok(Self { header })
    }
}

impl Strategy for RightmostNonPrivateStrategy {
    fn resolve(&self, headers: &HeaderMap, _remote_addr: &str) -> Option<Address> {
        let found = self
            .header
            .parse(headers)
            .into_iter()
            .rev()
            .flatten()
            .find(|addr| !addr.is_private_or_local());

        if found.is_none() {
            trace!(header = %self.header, "no public address in header");
        }
        found
    }
}

/// Picks the address added by the outermost of a known number of reverse
/// proxies.
///
/// With `trusted_count` proxies each appending one entry, the client is the
/// entry at index `len - trusted_count`. A list that is too short, or an
/// invalid entry at that index, fails instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightmostTrustedCountStrategy {
    header: ListHeader,
    trusted_count: usize,
}

impl RightmostTrustedCountStrategy {
    /// Create a strategy reading `Forwarded` or `X-Forwarded-For`.
    ///
    /// `trusted_count` must be at least one.
    pub fn new(header_name: &str, trusted_count: usize) -> Result<Self> {
        let header = list_header(header_name)?;

        if trusted_count == 0 {
            return Err(Error::ZeroTrustedCount);
        }

        debug!(%header, trusted_count, "rightmost trusted count strategy configured");
        Ok(Self {
            header,
            trusted_count,
        })
    }
}

impl Strategy for RightmostTrustedCountStrategy {
    fn resolve(&self, headers: &HeaderMap, _remote_addr: &str) -> Option<Address> {
        let mut list = self.header.parse(headers);

        let Some(index) = list.len().checked_sub(self.trusted_count) else {
            trace!(
                header = %self.header,
                len = list.len(),
                trusted_count = self.trusted_count,
                "list shorter than trusted count"
            );
            return None;
        };

        let found = list.swap_remove(index);
        if found.is_none() {
            trace!(header = %self.header, index, "entry at trusted count is invalid");
        }
        found
    }
}

/// Skips addresses in trusted ranges from the right and picks the first one
/// outside them.
///
/// Scanning stops at the first untrusted entry; if that entry is invalid the
/// strategy fails rather than looking further left, since that is exactly
/// where a forged value would sit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightmostTrustedRangeStrategy {
    header: ListHeader,
    trusted: RangeSet,
}

impl RightmostTrustedRangeStrategy {
    /// Create a strategy reading `Forwarded` or `X-Forwarded-For`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use http::HeaderMap;
    /// use real_client_ip::{RangeSet, RightmostTrustedRangeStrategy, Strategy};
    ///
    /// let trusted = RangeSet::compile(["10.0.0.0/8"]).unwrap();
    /// let strategy = RightmostTrustedRangeStrategy::new("X-Forwarded-For", trusted).unwrap();
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-forwarded-for", "1.1.1.1, 203.0.113.7, 10.0.0.3".parse().unwrap());
    /// assert_eq!(strategy.client_ip(&headers, "10.0.0.4:443"), "203.0.113.7");
    /// ```
    pub fn new(header_name: &str, trusted: RangeSet) -> Result<Self> {
        let header = list_header(header_name)?;
        debug!(%header, ranges = trusted.len(), "rightmost trusted range strategy configured");
        Ok(Self { header, trusted })
    }

    /// The trusted ranges.
    pub fn trusted(&self) -> &RangeSet {
        &self.trusted
    }
}

impl Strategy for RightmostTrustedRangeStrategy {
    fn resolve(&self, headers: &HeaderMap, _remote_addr: &str) -> Option<Address> {
        for candidate in self.header.parse(headers).into_iter().rev() {
            match candidate {
                Some(addr) if self.trusted.contains(addr.ip()) => continue,
                Some(addr) => return Some(addr),
                None => {
                    trace!(header = %self.header, "untrusted boundary entry is invalid");
                    return None;
                }
            }
        }

        trace!(header = %self.header, "every entry is trusted");
        None
    }
}
