/* src/headers.rs */

//! Parsers for the two headers that carry a list of proxy hops.
//!
//! Both parsers keep one slot per list element. An element that fails to
//! parse is kept as `None` so that positional strategies count hops
//! correctly.

use std::fmt;

use http::HeaderMap;

use crate::address::{Address, parse_client_address};

/// Lowercase name of the RFC 7239 `Forwarded` header.
pub const FORWARDED: &str = "forwarded";

/// Lowercase name of the `X-Forwarded-For` header.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// One of the headers that carry an ordered list of addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListHeader {
    /// RFC 7239 `Forwarded`.
    Forwarded,
    /// `X-Forwarded-For`.
    XForwardedFor,
}

impl ListHeader {
    /// Match a header name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(FORWARDED) {
            Some(Self::Forwarded)
        } else if name.eq_ignore_ascii_case(X_FORWARDED_FOR) {
            Some(Self::XForwardedFor)
        } else {
            None
        }
    }

    /// The lowercase header name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Forwarded => FORWARDED,
            Self::XForwardedFor => X_FORWARDED_FOR,
        }
    }

    /// Collect every candidate from every occurrence of this header.
    pub fn parse(self, headers: &HeaderMap) -> Vec<Option<Address>> {
        match self {
            Self::Forwarded => forwarded_list(headers),
            Self::XForwardedFor => x_forwarded_for_list(headers),
        }
    }
}

impl fmt::Display for ListHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Candidates from all `Forwarded` headers, leftmost first.
///
/// Elements are split on every comma, including commas inside quoted strings,
/// so a quoted comma cannot merge two hops into one.
pub fn forwarded_list(headers: &HeaderMap) -> Vec<Option<Address>> {
    collect_list(headers, FORWARDED, parse_forwarded_element)
}

/// Candidates from all `X-Forwarded-For` headers, leftmost first.
pub fn x_forwarded_for_list(headers: &HeaderMap) -> Vec<Option<Address>> {
    collect_list(headers, X_FORWARDED_FOR, parse_client_address)
}

fn collect_list(
    headers: &HeaderMap,
    name: &str,
    parse: fn(&str) -> Option<Address>,
) -> Vec<Option<Address>> {
    let mut list = Vec::new();

    for value in headers.get_all(name) {
        let value = String::from_utf8_lossy(value.as_bytes());
        list.extend(value.split(',').map(|element| parse(element.trim())));
    }

    list
}

/// Extract the client address from one `Forwarded` element, e.g.
/// `for="[2001:db8::1]:4711";proto=https;by=203.0.113.43`.
///
/// Deliberately looser than RFC 7239:
/// - only the `for` directive is looked at, and the last one wins;
/// - whitespace after `=` is tolerated, whitespace before it is not;
/// - quoted values are not unescaped;
/// - one pair of surrounding brackets is stripped, even around IPv4.
pub fn parse_forwarded_element(element: &str) -> Option<Address> {
    let mut value = None;

    for directive in element.split(';') {
        let Some((key, val)) = directive.split_once('=') else {
            continue;
        };

        if key.trim_start().eq_ignore_ascii_case("for") {
            value = Some(val);
        }
    }

    let value = value?.trim();

    let value = match value.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix('"')?,
        None => value,
    };

    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    parse_client_address(value)
}
