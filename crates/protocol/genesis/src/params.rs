//! Protocol parameters consumed by the proof-of-work consensus rules.

use core::time::Duration;

/// Maximum size of a header's extra-data section, in bytes.
pub const MAXIMUM_EXTRA_DATA_SIZE: u64 = 32;

/// The bound divisor of the gas limit, used in update calculations.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Minimum the gas limit may ever be.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// The bound divisor of the difficulty, used in the update calculations.
pub const DIFFICULTY_BOUND_DIVISOR: u64 = 2048;

/// The minimum that the difficulty may ever be.
pub const MINIMUM_DIFFICULTY: u64 = 131_072;

/// The decision boundary on the block time gap for the Frontier difficulty rule.
pub const DURATION_LIMIT: u64 = 13;

/// Number of blocks in one period of the exponential difficulty bomb.
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// Tunable protocol parameters for header validation and difficulty adjustment.
///
/// The [`Default`] implementation yields the mainnet constants. Test networks
/// may override individual values, e.g. to shorten the bomb period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ConsensusParams {
    /// Maximum size of the extra-data section, in bytes.
    pub maximum_extra_data_size: u64,
    /// Divisor bounding the per-block gas limit change.
    pub gas_limit_bound_divisor: u64,
    /// Lowest gas limit a header may declare.
    pub min_gas_limit: u64,
    /// Divisor bounding the per-block difficulty change.
    pub difficulty_bound_divisor: u64,
    /// Floor for the difficulty, before the bomb is added.
    pub minimum_difficulty: u64,
    /// Frontier block time target, in seconds.
    pub duration_limit: u64,
    /// Clock skew tolerated before a header is treated as a future block.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub allowed_future_block_time: Duration,
    /// Length of one difficulty bomb period, in blocks.
    pub exp_diff_period: u64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            maximum_extra_data_size: MAXIMUM_EXTRA_DATA_SIZE,
            gas_limit_bound_divisor: GAS_LIMIT_BOUND_DIVISOR,
            min_gas_limit: MIN_GAS_LIMIT,
            difficulty_bound_divisor: DIFFICULTY_BOUND_DIVISOR,
            minimum_difficulty: MINIMUM_DIFFICULTY,
            duration_limit: DURATION_LIMIT,
            allowed_future_block_time: Duration::from_secs(15),
            exp_diff_period: EXP_DIFF_PERIOD,
        }
    }
}

#[cfg(feature = "serde")]
mod duration_secs {
    use core::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
