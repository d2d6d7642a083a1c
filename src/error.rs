/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing addresses or constructing strategies.
///
/// Resolving a client IP never produces one of these: a request without a
/// trustworthy address resolves to `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid IP address format.
    #[error("Invalid IP address format: {0}")]
    InvalidIpFormat(String),

    /// A strategy was given an empty header name.
    #[error("Header name must not be empty")]
    EmptyHeaderName,

    /// The header name is not a valid HTTP field name.
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A single-IP strategy was given one of the list headers.
    #[error("Header {0} carries a list of addresses and cannot be used as a single-IP header")]
    ReservedHeaderName(String),

    /// A list strategy was given something other than `Forwarded` or `X-Forwarded-For`.
    #[error("Header {0} is not a supported list header (expected Forwarded or X-Forwarded-For)")]
    UnsupportedListHeader(String),

    /// The trusted proxy count must be at least one.
    #[error("Trusted proxy count must be greater than zero")]
    ZeroTrustedCount,

    /// An empty string was given as a trusted range.
    #[error("Trusted range must not be empty")]
    EmptyRange,

    /// A trusted range carried an IPv6 zone.
    #[error("Trusted range must not carry a zone: {0}")]
    ZonedRange(String),

    /// A trusted range is neither an address nor `address/prefix`.
    #[error("Invalid trusted range: {0}")]
    InvalidRange(String),
}
