//! Block rewards and finalization.

use crate::{Block, Ethash, StateDb};
use alloy_consensus::{Header, proofs::calculate_ommers_root};
use alloy_primitives::{Address, U256};
use ember_genesis::ChainConfig;

/// Block reward in units of [`BLOCK_REWARD_MULTIPLIER`] for blocks before Byzantium.
pub const FRONTIER_BLOCK_REWARD: u64 = 0;

/// Block reward in units of [`BLOCK_REWARD_MULTIPLIER`] from Byzantium.
pub const BYZANTIUM_BLOCK_REWARD: u64 = 0;

/// Block reward in units of [`BLOCK_REWARD_MULTIPLIER`] from Constantinople.
pub const CONSTANTINOPLE_BLOCK_REWARD: u64 = 0;

/// Premine amount in units of [`PREMINE_MULTIPLIER`] shared by the premine addresses in
/// every block.
pub const PREMINE_ALLOCATION: u64 = 0;

/// Unit of the block reward constants, `10^16` wei.
pub const BLOCK_REWARD_MULTIPLIER: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Unit of the premine allocation, `10^18` wei.
pub const PREMINE_MULTIPLIER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Number of addresses sharing the premine allocation.
const PREMINE_RECIPIENTS: usize = 500;

/// Addresses credited with an equal share of the premine allocation in every block.
pub static PREMINE_ADDRESSES: [Address; PREMINE_RECIPIENTS] =
    [Address::ZERO; PREMINE_RECIPIENTS];

/// Reward and premine supply for one calendar year of issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearlyIssuance {
    /// The calendar year.
    pub year: u16,
    /// Block reward, in units of [`BLOCK_REWARD_MULTIPLIER`].
    pub block_reward: u64,
    /// Premine supply released over the year, in whole coins.
    pub premine_supply: u64,
}

const fn issuance(year: u16, block_reward: u64, premine_supply: u64) -> YearlyIssuance {
    YearlyIssuance { year, block_reward, premine_supply }
}

/// Issuance schedule by calendar year.
///
/// Finalization does not consult this table; block rewards follow the flat constants above.
pub const ISSUANCE_SCHEDULE: [YearlyIssuance; 44] = [
    issuance(2019, 52, 9_680_857),
    issuance(2020, 30, 11_350_000),
    issuance(2021, 25, 14_450_000),
    issuance(2022, 21, 15_550_000),
    issuance(2023, 16, 16_650_000),
    issuance(2024, 11, 17_750_000),
    issuance(2025, 11, 18_750_000),
    issuance(2026, 11, 19_750_000),
    issuance(2027, 11, 19_750_000),
    issuance(2028, 11, 19_750_000),
    issuance(2029, 11, 20_750_000),
    issuance(2030, 11, 20_750_000),
    issuance(2031, 11, 20_750_000),
    issuance(2032, 11, 21_750_000),
    issuance(2033, 11, 21_750_000),
    issuance(2034, 11, 21_750_000),
    issuance(2035, 11, 22_750_000),
    issuance(2036, 11, 22_750_000),
    issuance(2037, 11, 22_750_000),
    issuance(2038, 11, 22_750_000),
    issuance(2039, 11, 23_750_000),
    issuance(2040, 11, 25_750_000),
    issuance(2041, 11, 25_750_000),
    issuance(2042, 11, 25_750_000),
    issuance(2043, 11, 25_750_000),
    issuance(2044, 11, 25_750_000),
    issuance(2045, 11, 25_750_000),
    issuance(2046, 11, 25_750_000),
    issuance(2047, 11, 25_750_000),
    issuance(2048, 11, 25_750_000),
    issuance(2049, 11, 25_750_000),
    issuance(2050, 11, 25_750_000),
    issuance(2051, 11, 25_750_000),
    issuance(2052, 11, 25_750_000),
    issuance(2053, 11, 25_750_000),
    issuance(2054, 11, 25_750_000),
    issuance(2055, 11, 25_750_000),
    issuance(2056, 11, 25_750_000),
    issuance(2057, 11, 25_750_000),
    issuance(2058, 11, 25_750_000),
    issuance(2059, 11, 25_750_000),
    issuance(2060, 11, 25_750_000),
    issuance(2061, 11, 25_750_000),
    issuance(2062, 11, 15_750_000),
];

impl YearlyIssuance {
    /// Looks up the issuance of `year` in [`ISSUANCE_SCHEDULE`].
    pub fn for_year(year: u16) -> Option<&'static Self> {
        let first = ISSUANCE_SCHEDULE[0].year;
        year.checked_sub(first).and_then(|offset| ISSUANCE_SCHEDULE.get(offset as usize))
    }
}

/// Credits the block reward to the coinbase of `header`, and an equal share of the premine
/// allocation to each of the [`PREMINE_ADDRESSES`].
///
/// The reward is flat across forks, and uncles are not rewarded.
pub fn accumulate_rewards<S: StateDb + ?Sized>(
    state: &mut S,
    header: &Header,
    _uncles: &[Header],
) {
    let reward = U256::from(FRONTIER_BLOCK_REWARD) * BLOCK_REWARD_MULTIPLIER;
    state.add_balance(header.beneficiary, reward);

    let share = U256::from(PREMINE_ALLOCATION) * PREMINE_MULTIPLIER /
        U256::from(PREMINE_RECIPIENTS);
    for address in &PREMINE_ADDRESSES {
        state.add_balance(*address, share);
    }

    trace!(
        target: "ethash::rewards",
        number = header.number,
        coinbase = %header.beneficiary,
        %reward,
        %share,
        "Accumulated block rewards"
    );
}

impl Ethash {
    /// Credits the block rewards, writes the resulting state root and the uncle hash into
    /// `header`, and assembles the final block.
    ///
    /// Must run exactly once per block, after the block has been fully validated.
    pub fn finalize<S, T, R>(
        &self,
        config: &ChainConfig,
        state: &mut S,
        mut header: Header,
        transactions: Vec<T>,
        uncles: Vec<Header>,
        receipts: Vec<R>,
    ) -> Block<T, R>
    where
        S: StateDb + ?Sized,
    {
        accumulate_rewards(state, &header, &uncles);
        header.state_root = state.intermediate_root(config.is_eip158(header.number));
        header.ommers_hash = calculate_ommers_root(&uncles);

        debug!(
            target: "ethash::rewards",
            number = header.number,
            state_root = %header.state_root,
            uncles = uncles.len(),
            "Finalized block"
        );
        Block::new(header, transactions, uncles, receipts)
    }
}
