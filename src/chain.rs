/* src/chain.rs */

use http::HeaderMap;
use tracing::trace;

use crate::address::Address;
use crate::strategy::Strategy;

/// Tries several strategies in order and returns the first result.
///
/// # Examples
///
/// ```rust
/// use http::HeaderMap;
/// use real_client_ip::{ChainStrategy, RemoteAddrStrategy, SingleIpHeaderStrategy, Strategy};
///
/// let chain = ChainStrategy::default()
///     .with(SingleIpHeaderStrategy::new("X-Real-IP").unwrap())
///     .with(RemoteAddrStrategy);
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(chain.client_ip(&headers, "192.0.2.10:4711"), "192.0.2.10");
///
/// headers.insert("x-real-ip", "203.0.113.45".parse().unwrap());
/// assert_eq!(chain.client_ip(&headers, "192.0.2.10:4711"), "203.0.113.45");
/// ```
#[derive(Debug, Default)]
pub struct ChainStrategy {
    strategies: Vec<Box<dyn Strategy>>,
}

impl ChainStrategy {
    /// Create a chain from already boxed strategies.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Append a strategy to try after the ones already in the chain.
    pub fn with<S: Strategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Number of strategies in the chain.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the chain is empty. An empty chain never resolves.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Strategy for ChainStrategy {
    fn resolve(&self, headers: &HeaderMap, remote_addr: &str) -> Option<Address> {
        let found = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.resolve(headers, remote_addr));

        if found.is_none() {
            trace!(strategies = self.strategies.len(), "no strategy in chain resolved");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::tests::headers;
    use crate::{RemoteAddrStrategy, RightmostNonPrivateStrategy, SingleIpHeaderStrategy};

    fn fallback_chain() -> ChainStrategy {
        ChainStrategy::default()
            .with(RightmostNonPrivateStrategy::new("Forwarded").unwrap())
            .with(SingleIpHeaderStrategy::new("true-client-ip").unwrap())
            .with(SingleIpHeaderStrategy::new("x-real-ip").unwrap())
            .with(RemoteAddrStrategy)
    }

    #[test]
    fn test_single_strategy() {
        let chain = ChainStrategy::new(vec![Box::new(RemoteAddrStrategy) as Box<dyn Strategy>]);
        let map = headers(&[
            ("X-Real-Ip", "1.1.1.1"),
            ("X-Forwarded-For", "2.2.2.2:3384, 3.3.3.3"),
        ]);
        assert_eq!(chain.client_ip(&map, "5.5.5.5"), "5.5.5.5");
    }

    #[test]
    fn test_first_non_empty_result_wins() {
        let map = headers(&[
            ("X-Real-Ip", "1.1.1.1"),
            ("X-Forwarded-For", "2.2.2.2:3384, 3.3.3.3"),
        ]);
        assert_eq!(fallback_chain().client_ip(&map, "5.5.5.5"), "1.1.1.1");

        let map = headers(&[("Forwarded", "for=10.0.0.1, for=7.7.7.7"), ("X-Real-Ip", "1.1.1.1")]);
        assert_eq!(fallback_chain().client_ip(&map, "5.5.5.5"), "7.7.7.7");
    }

    #[test]
    fn test_remote_addr_is_last_resort() {
        assert_eq!(
            fallback_chain().client_ip(&HeaderMap::new(), "[2001:db8::7]:443"),
            "2001:db8::7"
        );
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChainStrategy::default();
        assert!(chain.is_empty());

        let map = headers(&[("X-Real-Ip", "1.1.1.1")]);
        assert_eq!(chain.resolve(&map, "5.5.5.5"), None);
    }

    #[test]
    fn test_all_fail() {
        let chain = fallback_chain();
        assert_eq!(chain.len(), 4);

        let map = headers(&[("X-Forwarded-For", "2.2.2.2:3384, 3.3.3.3")]);
        assert_eq!(chain.client_ip(&map, ""), "");
    }
}
