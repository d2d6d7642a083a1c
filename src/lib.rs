/* src/lib.rs */
//! # Real Client IP
//!
//! Determine which address, if any, can be trusted as the client IP of an HTTP
//! request that may have passed through reverse proxies, load balancers or CDNs.
//!
//! Proxy headers are written by whoever sends them, so a client can put any
//! address it likes into `X-Forwarded-For`. The right way to read them depends
//! on the deployment, which is why this crate provides several [`Strategy`]
//! implementations instead of a single extractor:
//!
//! - [`RemoteAddrStrategy`] - the connection's peer address; for services exposed directly
//! - [`SingleIpHeaderStrategy`] - a header such as `X-Real-IP` set by a trusted proxy
//! - [`RightmostTrustedCountStrategy`] - a known number of proxies append to the list
//! - [`RightmostTrustedRangeStrategy`] - proxies are identified by address range
//! - [`RightmostNonPrivateStrategy`] - all proxies have private addresses
//! - [`LeftmostNonPrivateStrategy`] - spoofable; for informational use only
//! - [`ChainStrategy`] - try several of the above in order
//!
//! Strategies are validated when constructed and never fail at request time:
//! a request without a trustworthy address resolves to `None` (or an empty
//! string from [`Strategy::client_ip`]).
//!
//! ## Features
//!
//! - `serde`: deserialize a [`StrategyConfig`] from configuration files
//! - `axum`: a layer and extractor that attach the resolved `ClientIp` to requests
//!
//! ## Examples
//!
//! ### Behind a known number of proxies
//!
//! ```rust
//! use http::HeaderMap;
//! use real_client_ip::{RightmostTrustedCountStrategy, Strategy};
//!
//! // One load balancer appends the address it sees to X-Forwarded-For.
//! let strategy = RightmostTrustedCountStrategy::new("X-Forwarded-For", 1).unwrap();
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-forwarded-for", "6.6.6.6, 203.0.113.195".parse().unwrap());
//!
//! assert_eq!(strategy.client_ip(&headers, "10.0.0.2:39122"), "203.0.113.195");
//! ```
//!
//! ### Falling back to the peer address
//!
//! ```rust
//! use http::HeaderMap;
//! use real_client_ip::{ChainStrategy, RemoteAddrStrategy, RightmostNonPrivateStrategy, Strategy};
//!
//! let strategy = ChainStrategy::default()
//!     .with(RightmostNonPrivateStrategy::new("Forwarded").unwrap())
//!     .with(RemoteAddrStrategy);
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("forwarded", r#"for="[2001:db8:cafe::17]:4711", for=10.1.2.3"#.parse().unwrap());
//! assert_eq!(strategy.client_ip(&headers, "10.0.0.2:39122"), "2001:db8:cafe::17");
//!
//! assert_eq!(strategy.client_ip(&HeaderMap::new(), "192.0.2.60:1234"), "192.0.2.60");
//! ```

pub mod address;
pub mod chain;
pub mod config;
pub mod error;
pub mod headers;
pub mod private;
pub mod ranges;
pub mod strategy;

#[cfg(feature = "axum")]
pub mod middleware;

pub use address::{Address, parse_address, parse_client_address};
pub use chain::ChainStrategy;
pub use config::StrategyConfig;
pub use error::{Error, Result};
pub use headers::{ListHeader, forwarded_list, x_forwarded_for_list};
pub use private::is_private_or_local;
pub use ranges::{RangeSet, parse_range};
pub use strategy::{
    LeftmostNonPrivateStrategy, RemoteAddrStrategy, RightmostNonPrivateStrategy,
    RightmostTrustedCountStrategy, RightmostTrustedRangeStrategy, SingleIpHeaderStrategy, Strategy,
};

#[cfg(feature = "axum")]
pub use middleware::{ClientIp, ClientIpLayer, ClientIpService};

/// Re-export commonly used types
pub use http::HeaderMap;
pub use std::net::IpAddr;
