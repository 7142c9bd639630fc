//! Compatibility report between a stored and a candidate chain configuration.

use crate::is_forked;
use thiserror::Error;

/// Raised when a locally stored chain was built under a [`ChainConfig`] that the new
/// configuration would rewrite.
///
/// [`ChainConfig`]: crate::ChainConfig
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "mismatching {what} in database (have {}, want {}, rewindto {rewind_to})",
    display_block(.stored),
    display_block(.new)
)]
pub struct ConfigCompatError {
    /// The setting that differs.
    pub what: String,
    /// Activation block in the stored configuration.
    pub stored: Option<u64>,
    /// Activation block in the new configuration.
    pub new: Option<u64>,
    /// The block number the local chain must be rewound to.
    pub rewind_to: u64,
}

impl ConfigCompatError {
    /// Creates a new [`ConfigCompatError`], deriving the rewind target from the lower of
    /// the two activation blocks.
    pub fn new(what: impl Into<String>, stored: Option<u64>, new: Option<u64>) -> Self {
        let rewind_from = match (stored, new) {
            (None, new) => new,
            (Some(stored), Some(new)) if new <= stored => Some(new),
            (stored, _) => stored,
        };
        let rewind_to = rewind_from.map_or(0, |block| block.saturating_sub(1));
        Self { what: what.into(), stored, new, rewind_to }
    }

    /// Returns whether a fork scheduled at `stored` cannot be moved to `new` because `head`
    /// has already reached one of them.
    pub const fn is_fork_incompatible(stored: Option<u64>, new: Option<u64>, head: u64) -> bool {
        let differs = match (stored, new) {
            (Some(a), Some(b)) => a != b,
            (None, None) => false,
            _ => true,
        };
        (is_forked(stored, head) || is_forked(new, head)) && differs
    }
}

fn display_block(block: &Option<u64>) -> String {
    block.map_or_else(|| "<nil>".to_string(), |b| b.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChainConfig, MAINNET_CONFIG};
    use proptest::prelude::*;

    fn frontier() -> ChainConfig {
        ChainConfig { chain_id: 1, ..Default::default() }
    }

    #[test]
    fn test_rewind_target() {
        assert_eq!(ConfigCompatError::new("x", Some(10), Some(20)).rewind_to, 9);
        assert_eq!(ConfigCompatError::new("x", Some(20), Some(10)).rewind_to, 9);
        assert_eq!(ConfigCompatError::new("x", None, Some(20)).rewind_to, 19);
        assert_eq!(ConfigCompatError::new("x", Some(20), None).rewind_to, 19);
        assert_eq!(ConfigCompatError::new("x", Some(0), Some(5)).rewind_to, 0);
        assert_eq!(ConfigCompatError::new("x", None, None).rewind_to, 0);
    }

    #[test]
    fn test_compatible_future_reschedule() {
        let stored = frontier();
        let new = ChainConfig { homestead_block: Some(20), ..frontier() };
        assert_eq!(stored.check_compatible(&new, 0), Ok(()));
        assert_eq!(stored.check_compatible(&new, 19), Ok(()));
    }

    #[test]
    fn test_incompatible_homestead_in_past() {
        let stored = frontier();
        let new = ChainConfig { homestead_block: Some(20), ..frontier() };
        let err = stored.check_compatible(&new, 30).unwrap_err();
        assert_eq!(
            err,
            ConfigCompatError {
                what: "Homestead fork block".to_string(),
                stored: None,
                new: Some(20),
                rewind_to: 19,
            }
        );
        assert_eq!(
            err.to_string(),
            "mismatching Homestead fork block in database (have <nil>, want 20, rewindto 19)"
        );
    }

    #[test]
    fn test_reports_lowest_conflict() {
        let stored =
            ChainConfig { homestead_block: Some(30), eip150_block: Some(10), ..frontier() };
        let new = ChainConfig { homestead_block: Some(25), eip150_block: Some(20), ..frontier() };

        let err = stored.check_compatible(&new, 40).unwrap_err();
        assert_eq!(err.what, "EIP150 fork block");
        assert_eq!(err.rewind_to, 9);
    }

    #[test]
    fn test_dao_support_flag() {
        let stored = ChainConfig { dao_fork_block: Some(5), dao_fork_support: true, ..frontier() };
        let new = ChainConfig { dao_fork_support: false, ..stored.clone() };

        assert_eq!(stored.check_compatible(&new, 4), Ok(()));
        let err = stored.check_compatible(&new, 5).unwrap_err();
        assert_eq!(err.what, "DAO fork support flag");
        assert_eq!(err.rewind_to, 4);
    }

    #[test]
    fn test_chain_id_after_eip158() {
        let stored = ChainConfig { eip158_block: Some(10), ..frontier() };
        let new = ChainConfig { chain_id: 2, ..stored.clone() };

        assert_eq!(stored.check_compatible(&new, 9), Ok(()));
        let err = stored.check_compatible(&new, 10).unwrap_err();
        assert_eq!(err.what, "EIP158 chain ID");
        assert_eq!(err.rewind_to, 9);
    }

    fn arb_block() -> impl Strategy<Value = Option<u64>> {
        prop_oneof![Just(None), (0u64..1_000).prop_map(Some)]
    }

    proptest! {
        #[test]
        fn test_identical_configs_always_compatible(
            homestead in arb_block(),
            dao in arb_block(),
            support in any::<bool>(),
            eip150 in arb_block(),
            eip158 in arb_block(),
            byzantium in arb_block(),
            constantinople in arb_block(),
            height in any::<u64>(),
        ) {
            let config = ChainConfig {
                chain_id: 786,
                homestead_block: homestead,
                dao_fork_block: dao,
                dao_fork_support: support,
                eip150_block: eip150,
                eip155_block: eip150,
                eip158_block: eip158,
                byzantium_block: byzantium,
                constantinople_block: constantinople,
                ..Default::default()
            };
            prop_assert_eq!(config.check_compatible(&config.clone(), height), Ok(()));
        }
    }

    #[test]
    fn test_mainnet_self_compatible() {
        assert_eq!(MAINNET_CONFIG.check_compatible(&MAINNET_CONFIG, u64::MAX), Ok(()));
    }
}
