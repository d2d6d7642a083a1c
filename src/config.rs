/* src/config.rs */

use crate::chain::ChainStrategy;
use crate::error::Result;
use crate::ranges::{CLOUDFLARE, PRIVATE_AND_LOCAL, RangeSet};
use crate::strategy::{
    LeftmostNonPrivateStrategy, RemoteAddrStrategy, RightmostNonPrivateStrategy,
    RightmostTrustedCountStrategy, RightmostTrustedRangeStrategy, SingleIpHeaderStrategy, Strategy,
};

/// Declarative description of a strategy, for loading from configuration files.
///
/// With the `serde` feature this deserializes from a map tagged by `type`:
///
/// ```json
/// {
///   "type": "chain",
///   "strategies": [
///     {
///       "type": "rightmost_trusted_range",
///       "header": "X-Forwarded-For",
///       "trusted_ranges": ["cloudflare", "10.0.0.0/8"]
///     },
///     { "type": "remote_addr" }
///   ]
/// }
/// ```
///
/// In `trusted_ranges`, the entries `"cloudflare"` and `"private"` expand to
/// [`CLOUDFLARE`] and [`PRIVATE_AND_LOCAL`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum StrategyConfig {
    /// See [`RemoteAddrStrategy`].
    RemoteAddr,
    /// See [`SingleIpHeaderStrategy`].
    SingleIpHeader { header: String },
    /// See [`LeftmostNonPrivateStrategy`].
    LeftmostNonPrivate { header: String },
    /// See [`RightmostNonPrivateStrategy`].
    RightmostNonPrivate { header: String },
    /// See [`RightmostTrustedCountStrategy`].
    RightmostTrustedCount { header: String, trusted_count: usize },
    /// See [`RightmostTrustedRangeStrategy`].
    RightmostTrustedRange {
        header: String,
        #[cfg_attr(feature = "serde", serde(default))]
        trusted_ranges: Vec<String>,
    },
    /// See [`ChainStrategy`].
    Chain { strategies: Vec<StrategyConfig> },
}

impl StrategyConfig {
    /// Validate the configuration and build the strategy it describes.
    pub fn build(&self) -> Result<Box<dyn Strategy>> {
        let strategy: Box<dyn Strategy> = match self {
            Self::RemoteAddr => Box::new(RemoteAddrStrategy),
            Self::SingleIpHeader { header } => Box::new(SingleIpHeaderStrategy::new(header)?),
            Self::LeftmostNonPrivate { header } => {
                Box::new(LeftmostNonPrivateStrategy::new(header)?)
            }
            Self::RightmostNonPrivate { header } => {
                Box::new(RightmostNonPrivateStrategy::new(header)?)
            }
            Self::RightmostTrustedCount {
                header,
                trusted_count,
            } => Box::new(RightmostTrustedCountStrategy::new(header, *trusted_count)?),
            Self::RightmostTrustedRange {
                header,
                trusted_ranges,
            } => {
                let trusted = RangeSet::compile(expand_ranges(trusted_ranges))?;
                Box::new(RightmostTrustedRangeStrategy::new(header, trusted)?)
            }
            Self::Chain { strategies } => Box::new(ChainStrategy::new(
                strategies
                    .iter()
                    .map(StrategyConfig::build)
                    .collect::<Result<Vec<_>>>()?,
            )),
        };

        Ok(strategy)
    }
}

fn expand_ranges(literals: &[String]) -> Vec<&str> {
    let mut expanded = Vec::with_capacity(literals.len());

    for literal in literals {
        match literal.as_str() {
            "cloudflare" => expanded.extend_from_slice(CLOUDFLARE),
            "private" => expanded.extend_from_slice(PRIVATE_AND_LOCAL),
            other => expanded.push(other),
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::strategy::tests::headers;

    #[test]
    fn test_build_each_kind() {
        let map = headers(&[
            ("X-Real-Ip", "1.1.1.1"),
            ("X-Forwarded-For", "2.2.2.2, 10.0.0.1, 104.16.0.9"),
        ]);

        let cases = [
            (StrategyConfig::RemoteAddr, "9.9.9.9"),
            (
                StrategyConfig::SingleIpHeader {
                    header: "X-Real-IP".into(),
                },
                "1.1.1.1",
            ),
            (
                StrategyConfig::LeftmostNonPrivate {
                    header: "X-Forwarded-For".into(),
                },
                "2.2.2.2",
            ),
            (
                StrategyConfig::RightmostNonPrivate {
                    header: "X-Forwarded-For".into(),
                },
                "104.16.0.9",
            ),
            (
                StrategyConfig::RightmostTrustedCount {
                    header: "X-Forwarded-For".into(),
                    trusted_count: 2,
                },
                "10.0.0.1",
            ),
            (
                StrategyConfig::RightmostTrustedRange {
                    header: "X-Forwarded-For".into(),
                    trusted_ranges: vec!["cloudflare".into(), "private".into()],
                },
                "2.2.2.2",
            ),
        ];

        for (config, want) in cases {
            let strategy = config.build().unwrap();
            assert_eq!(strategy.client_ip(&map, "9.9.9.9:80"), want, "config {config:?}");
        }
    }

    #[test]
    fn test_build_chain() {
        let config = StrategyConfig::Chain {
            strategies: vec![
                StrategyConfig::SingleIpHeader {
                    header: "CF-Connecting-IP".into(),
                },
                StrategyConfig::RemoteAddr,
            ],
        };
        let strategy = config.build().unwrap();

        assert_eq!(strategy.client_ip(&headers(&[]), "[::1]:80"), "::1");
        assert_eq!(
            strategy.client_ip(&headers(&[("CF-Connecting-IP", "203.0.113.5")]), "[::1]:80"),
            "203.0.113.5"
        );
    }

    #[test]
    fn test_build_errors() {
        let cases = [
            (
                StrategyConfig::SingleIpHeader {
                    header: "X-Forwarded-For".into(),
                },
                Error::ReservedHeaderName("X-Forwarded-For".into()),
            ),
            (
                StrategyConfig::RightmostTrustedCount {
                    header: "X-Forwarded-For".into(),
                    trusted_count: 0,
                },
                Error::ZeroTrustedCount,
            ),
            (
                StrategyConfig::RightmostTrustedRange {
                    header: "Forwarded".into(),
                    trusted_ranges: vec!["10.0.0.0/8".into(), "fe80::1%eth0".into()],
                },
                Error::ZonedRange("fe80::1%eth0".into()),
            ),
            (
                StrategyConfig::Chain {
                    strategies: vec![
                        StrategyConfig::RemoteAddr,
                        StrategyConfig::LeftmostNonPrivate {
                            header: String::new(),
                        },
                    ],
                },
                Error::EmptyHeaderName,
            ),
        ];

        for (config, want) in cases {
            assert_eq!(config.build().unwrap_err(), want, "config {config:?}");
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        let config: StrategyConfig = serde_json::from_str(
            r#"{
                "type": "chain",
                "strategies": [
                    {
                        "type": "rightmost_trusted_range",
                        "header": "X-Forwarded-For",
                        "trusted_ranges": ["cloudflare", "10.0.0.0/8"]
                    },
                    {
                        "type": "rightmost_trusted_count",
                        "header": "Forwarded",
                        "trusted_count": 1
                    },
                    { "type": "remote_addr" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            StrategyConfig::Chain {
                strategies: vec![
                    StrategyConfig::RightmostTrustedRange {
                        header: "X-Forwarded-For".into(),
                        trusted_ranges: vec!["cloudflare".into(), "10.0.0.0/8".into()],
                    },
                    StrategyConfig::RightmostTrustedCount {
                        header: "Forwarded".into(),
                        trusted_count: 1,
                    },
                    StrategyConfig::RemoteAddr,
                ],
            }
        );

        let strategy = config.build().unwrap();
        let map = headers(&[("X-Forwarded-For", "198.51.100.4, 10.1.1.1, 172.64.0.1")]);
        assert_eq!(strategy.client_ip(&map, "10.0.0.2:443"), "198.51.100.4");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_negative_count() {
        let result = serde_json::from_str::<StrategyConfig>(
            r#"{
                "type": "rightmost_trusted_count",
                "header": "X-Forwarded-For",
                "trusted_count": -999
            }"#,
        );
        assert!(result.is_err());
    }
}
