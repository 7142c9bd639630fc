//! Difficulty adjustment rules.
//!
//! All arithmetic is carried out on unbounded integers. Divisions truncate toward zero. The
//! only exception is the difficulty bomb: once its term alone is `2^256` or more, no header can
//! carry the result and the calculation stops with `None`.

use alloy_consensus::{EMPTY_OMMER_ROOT_HASH, Header};
use alloy_primitives::U256;
use ember_genesis::{ChainConfig, ConsensusParams};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// Number of blocks the difficulty bomb is pushed back by from Byzantium on.
pub const BYZANTIUM_BOMB_DELAY: u64 = 3_000_000;

/// Number of blocks the difficulty bomb is pushed back by from Constantinople on.
pub const CONSTANTINOPLE_BOMB_DELAY: u64 = 5_000_000;

/// Homestead divides the block time gap by this value.
const HOMESTEAD_TIME_DIVISOR: i64 = 10;

/// Byzantium divides the block time gap by this value.
const BYZANTIUM_TIME_DIVISOR: i64 = 2;

/// Lowest adjustment factor of every rule after Frontier.
const ADJUSTMENT_FLOOR: i64 = -99;

/// Largest bomb exponent whose term still fits in 256 bits.
const MAX_BOMB_EXPONENT: u64 = 255;

/// The difficulty adjustment rule in effect for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DifficultyRule {
    /// The launch rule.
    Frontier,
    /// The Homestead rule, graded by the time gap.
    Homestead,
    /// The Byzantium rule, aware of parent uncles, bomb delayed by [`BYZANTIUM_BOMB_DELAY`].
    Byzantium,
    /// The Byzantium rule with the bomb delayed by [`CONSTANTINOPLE_BOMB_DELAY`].
    Constantinople,
}

impl DifficultyRule {
    /// Returns the rule that applies to block `number`, most recent upgrade first.
    pub const fn at(config: &ChainConfig, number: u64) -> Self {
        if config.is_constantinople(number) {
            Self::Constantinople
        } else if config.is_byzantium(number) {
            Self::Byzantium
        } else if config.is_homestead(number) {
            Self::Homestead
        } else {
            Self::Frontier
        }
    }

    /// Returns how far the difficulty bomb is delayed under this rule.
    pub const fn bomb_delay(&self) -> Option<u64> {
        match self {
            Self::Frontier | Self::Homestead => None,
            Self::Byzantium => Some(BYZANTIUM_BOMB_DELAY),
            Self::Constantinople => Some(CONSTANTINOPLE_BOMB_DELAY),
        }
    }

    /// Computes the difficulty of a block created at `time` on top of `parent`.
    ///
    /// Returns `None` when the difficulty bomb alone exceeds 256 bits.
    pub fn calculate(
        &self,
        params: &ConsensusParams,
        time: u64,
        parent: &Header,
    ) -> Option<BigUint> {
        let diff = match (self, self.bomb_delay()) {
            (Self::Frontier, _) => frontier(params, time, parent)?,
            (_, Some(delay)) => delayed_bomb(params, time, parent, delay)?,
            (_, None) => homestead(params, time, parent)?,
        };
        Some(diff.to_biguint().unwrap_or_default())
    }
}

/// Returns the difficulty a new block must have when created at `time` on top of `parent`.
///
/// Returns `None` when the difficulty bomb alone exceeds 256 bits, so that no header can
/// carry the result.
pub fn calc_difficulty(
    config: &ChainConfig,
    params: &ConsensusParams,
    time: u64,
    parent: &Header,
) -> Option<BigUint> {
    let rule = DifficultyRule::at(config, parent.number.saturating_add(1));
    rule.calculate(params, time, parent)
}

pub(crate) fn u256_to_big(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

fn time_gap(time: u64, parent: &Header) -> BigInt {
    BigInt::from(i128::from(time) - i128::from(parent.timestamp))
}

/// The exponential term `2^(period - 2)` for bomb period `period`, zero for the first two
/// periods. `None` once the term no longer fits in 256 bits.
fn bomb(period: u64) -> Option<BigInt> {
    match period.checked_sub(2) {
        None => Some(BigInt::zero()),
        Some(exponent) if exponent <= MAX_BOMB_EXPONENT => Some(BigInt::one() << exponent),
        Some(_) => None,
    }
}

/// Applies `parent + parent / divisor * factor` and clamps to the minimum difficulty.
fn adjust(params: &ConsensusParams, parent: &Header, factor: BigInt) -> BigInt {
    let parent_diff = BigInt::from(u256_to_big(parent.difficulty));
    let step = &parent_diff / params.difficulty_bound_divisor.max(1);
    let factor = factor.max(BigInt::from(ADJUSTMENT_FLOOR));
    (parent_diff + step * factor).max(BigInt::from(params.minimum_difficulty))
}

fn frontier(params: &ConsensusParams, time: u64, parent: &Header) -> Option<BigInt> {
    let parent_diff = BigInt::from(u256_to_big(parent.difficulty));
    let step = &parent_diff / params.difficulty_bound_divisor.max(1);
    let minimum = BigInt::from(params.minimum_difficulty);

    let diff = if time_gap(time, parent) < BigInt::from(params.duration_limit) {
        parent_diff + step
    } else {
        parent_diff - step
    };
    let diff = diff.max(minimum.clone());

    let period = parent.number.saturating_add(1) / params.exp_diff_period.max(1);
    Some((diff + bomb(period)?).max(minimum))
}

fn homestead(params: &ConsensusParams, time: u64, parent: &Header) -> Option<BigInt> {
    let factor = BigInt::one() - time_gap(time, parent) / HOMESTEAD_TIME_DIVISOR;
    let diff = adjust(params, parent, factor);

    let period = parent.number.saturating_add(1) / params.exp_diff_period.max(1);
    Some(diff + bomb(period)?)
}

fn delayed_bomb(
    params: &ConsensusParams,
    time: u64,
    parent: &Header,
    delay: u64,
) -> Option<BigInt> {
    // Uncles already penalize late blocks, so a parent with uncles allows a larger step.
    let base = if parent.ommers_hash == EMPTY_OMMER_ROOT_HASH { 7 } else { 8 };
    let factor = BigInt::from(base) - time_gap(time, parent) / BYZANTIUM_TIME_DIVISOR;
    let diff = adjust(params, parent, factor);

    // The bomb runs on a block number shifted back by the delay, counted from the parent.
    let fake_number = parent.number.checked_sub(delay.saturating_sub(1)).unwrap_or_default();
    let period = fake_number / params.exp_diff_period.max(1);
    Some(diff + bomb(period)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use proptest::prelude::*;
    use rstest::rstest;

    const PARENT_DIFFICULTY: u64 = 1 << 20;

    fn frontier_config() -> ChainConfig {
        ChainConfig { chain_id: 1, ..Default::default() }
    }

    fn homestead_config() -> ChainConfig {
        ChainConfig { homestead_block: Some(0), ..frontier_config() }
    }

    fn byzantium_config() -> ChainConfig {
        ChainConfig {
            eip150_block: Some(0),
            eip155_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            ..homestead_config()
        }
    }

    fn constantinople_config() -> ChainConfig {
        ChainConfig { constantinople_block: Some(0), ..byzantium_config() }
    }

    fn parent(number: u64, difficulty: u64, with_uncles: bool) -> Header {
        Header {
            number,
            timestamp: 1_000_000,
            difficulty: U256::from(difficulty),
            ommers_hash: if with_uncles { B256::repeat_byte(0x11) } else { EMPTY_OMMER_ROOT_HASH },
            ..Default::default()
        }
    }

    fn calc(config: &ChainConfig, gap: u64, parent: &Header) -> BigUint {
        calc_difficulty(config, &ConsensusParams::default(), parent.timestamp + gap, parent)
            .unwrap()
    }

    #[test]
    fn test_rule_dispatch() {
        let staged = ChainConfig {
            homestead_block: Some(10),
            byzantium_block: Some(20),
            constantinople_block: Some(30),
            ..frontier_config()
        };
        assert_eq!(DifficultyRule::at(&staged, 9), DifficultyRule::Frontier);
        assert_eq!(DifficultyRule::at(&staged, 10), DifficultyRule::Homestead);
        assert_eq!(DifficultyRule::at(&staged, 20), DifficultyRule::Byzantium);
        assert_eq!(DifficultyRule::at(&staged, 30), DifficultyRule::Constantinople);
        assert_eq!(DifficultyRule::Byzantium.bomb_delay(), Some(BYZANTIUM_BOMB_DELAY));
    }

    #[test]
    fn test_rule_uses_child_number() {
        let config = ChainConfig { homestead_block: Some(1_001), ..frontier_config() };
        // Block 1001 is the first Homestead block, so its parent is still Frontier.
        let p = parent(1_000, PARENT_DIFFICULTY, false);
        assert_eq!(calc(&config, 5, &p), BigUint::from(1_049_088u64));
        assert_eq!(calc(&config, 15, &p), BigUint::from(PARENT_DIFFICULTY));
    }

    #[rstest]
    #[case::frontier_fast(frontier_config(), 5, 1_049_088)]
    #[case::frontier_slow(frontier_config(), 20, 1_048_064)]
    #[case::frontier_at_limit(frontier_config(), 13, 1_048_064)]
    #[case::homestead_fast(homestead_config(), 5, 1_049_088)]
    #[case::homestead_neutral(homestead_config(), 15, 1_048_576)]
    #[case::homestead_slow(homestead_config(), 25, 1_048_064)]
    #[case::homestead_floor(homestead_config(), 1_000, 997_888)]
    #[case::byzantium(byzantium_config(), 4, 1_051_136)]
    #[case::byzantium_slow(byzantium_config(), 30, 1_044_480)]
    #[case::constantinople(constantinople_config(), 4, 1_051_136)]
    fn test_difficulty_vectors(#[case] config: ChainConfig, #[case] gap: u64, #[case] want: u64) {
        let p = parent(1_000, PARENT_DIFFICULTY, false);
        assert_eq!(calc(&config, gap, &p), BigUint::from(want));
    }

    #[test]
    fn test_byzantium_parent_uncles() {
        let p = parent(1_000, PARENT_DIFFICULTY, true);
        assert_eq!(calc(&byzantium_config(), 4, &p), BigUint::from(1_051_648u64));
    }

    #[rstest]
    #[case::frontier(frontier_config())]
    #[case::homestead(homestead_config())]
    #[case::byzantium(byzantium_config())]
    fn test_minimum_difficulty_floor(#[case] config: ChainConfig) {
        let p = parent(1_000, 131_072, false);
        assert_eq!(calc(&config, 1_000, &p), BigUint::from(131_072u64));
    }

    #[rstest]
    #[case::homestead_first_period(homestead_config(), 99_999, 1_049_088)]
    #[case::homestead_second_period(homestead_config(), 199_999, 1_049_089)]
    #[case::frontier_third_period(frontier_config(), 299_999, 1_049_090)]
    fn test_bomb(#[case] config: ChainConfig, #[case] number: u64, #[case] want: u64) {
        let p = parent(number, PARENT_DIFFICULTY, false);
        assert_eq!(calc(&config, 5, &p), BigUint::from(want));
    }

    #[rstest]
    #[case::byzantium_before(byzantium_config(), 3_099_999, 1_051_136)]
    #[case::byzantium_active(byzantium_config(), 3_199_999, 1_051_137)]
    #[case::constantinople_delayed(constantinople_config(), 3_199_999, 1_051_136)]
    #[case::constantinople_active(constantinople_config(), 5_199_999, 1_051_137)]
    #[case::constantinople_grown(constantinople_config(), 5_299_999, 1_051_138)]
    fn test_delayed_bomb(#[case] config: ChainConfig, #[case] number: u64, #[case] want: u64) {
        let p = parent(number, PARENT_DIFFICULTY, false);
        assert_eq!(calc(&config, 4, &p), BigUint::from(want));
    }

    #[test]
    fn test_largest_bomb_is_exact() {
        // Block 25_700_000 is in period 257, the bomb term is 2^255.
        let p = parent(25_699_999, PARENT_DIFFICULTY, false);
        let diff = calc(&homestead_config(), 15, &p);
        assert_eq!(diff, BigUint::from(PARENT_DIFFICULTY) + (BigUint::one() << 255u32));
    }

    #[rstest]
    #[case::homestead_first_wide_period(homestead_config(), 25_799_999)]
    #[case::homestead_far(homestead_config(), 30_000_000)]
    #[case::frontier_last_block(frontier_config(), u64::MAX - 1)]
    #[case::constantinople_last_block(constantinople_config(), u64::MAX - 1)]
    fn test_bomb_beyond_256_bits(#[case] config: ChainConfig, #[case] number: u64) {
        let p = parent(number, PARENT_DIFFICULTY, false);
        let time = p.timestamp + 15;
        assert_eq!(calc_difficulty(&config, &ConsensusParams::default(), time, &p), None);
    }

    fn arb_config() -> impl Strategy<Value = ChainConfig> {
        prop_oneof![
            Just(frontier_config()),
            Just(homestead_config()),
            Just(byzantium_config()),
            Just(constantinople_config()),
        ]
    }

    proptest! {
        #[test]
        fn test_never_below_floor(
            config in arb_config(),
            difficulty in 0u64..u64::MAX,
            number in 0u64..10_000_000,
            gap in 0u64..100_000,
            with_uncles in any::<bool>(),
        ) {
            let p = parent(number, difficulty, with_uncles);
            prop_assert!(calc(&config, gap, &p) >= BigUint::from(131_072u64));
        }

        #[test]
        fn test_frontier_monotonic(
            difficulty in 131_072u64..u64::MAX,
            gap in 0u64..10_000,
            extra in 0u64..10_000,
        ) {
            let p = parent(1_000, difficulty, false);
            let config = frontier_config();
            prop_assert!(calc(&config, gap, &p) >= calc(&config, gap + extra, &p));
        }

        #[test]
        fn test_homestead_monotonic(
            difficulty in 131_072u64..u64::MAX,
            gap in 0u64..10_000,
            extra in 0u64..10_000,
        ) {
            let p = parent(1_000, difficulty, false);
            let config = homestead_config();
            prop_assert!(calc(&config, gap, &p) >= calc(&config, gap + extra, &p));
        }
    }
}
