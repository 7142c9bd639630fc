//! Built-in chain configurations.

use crate::{ChainConfig, PremineSchedule};
use alloy_primitives::{B256, b256};
use std::collections::BTreeMap;

/// Genesis hash of the main network.
pub const MAINNET_GENESIS_HASH: B256 =
    b256!("0x35ac7a156d894756c089aa8deaf1574cc523d1573f37c55da41663f16cde55a3");

/// Start blocks of each premine year on the main network.
const MAINNET_PREMINE_STARTS: [(u16, u64); 44] = [
    (2019, 50),
    (2020, 613_788),
    (2021, 2_788_684),
    (2022, 4_963_581),
    (2023, 7_138_478),
    (2024, 9_313_374),
    (2025, 11_488_271),
    (2026, 13_663_167),
    (2027, 15_838_064),
    (2028, 18_012_960),
    (2029, 20_187_857),
    (2030, 22_362_753),
    (2031, 24_537_650),
    (2032, 26_712_547),
    (2033, 28_887_443),
    (2034, 31_062_340),
    (2035, 33_237_236),
    (2036, 35_412_133),
    (2037, 37_587_029),
    (2038, 39_761_926),
    (2039, 41_936_822),
    (2040, 44_111_719),
    (2041, 46_286_616),
    (2042, 48_461_512),
    (2043, 50_636_409),
    (2044, 52_811_305),
    (2045, 54_986_202),
    (2046, 57_161_098),
    (2047, 59_335_995),
    (2048, 61_510_891),
    (2049, 63_685_788),
    (2050, 65_860_684),
    (2051, 68_035_581),
    (2052, 70_210_478),
    (2053, 72_385_374),
    (2054, 74_560_271),
    (2055, 76_735_167),
    (2056, 78_910_064),
    (2057, 81_084_960),
    (2058, 83_259_857),
    (2059, 85_434_753),
    (2060, 87_609_650),
    (2061, 89_784_547),
    (2062, 91_959_443),
];

/// Block at which premine allocation ends on the main network.
const MAINNET_PREMINE_END: u64 = 91_970_000;

/// Returns a configuration with every upgrade except the DAO fork and eWASM active from
/// genesis, and every premine year starting at genesis.
fn all_from_genesis(chain_id: u64) -> ChainConfig {
    ChainConfig {
        chain_id,
        homestead_block: Some(0),
        dao_fork_block: None,
        dao_fork_support: false,
        eip150_block: Some(0),
        eip150_hash: B256::ZERO,
        eip155_block: Some(0),
        eip158_block: Some(0),
        byzantium_block: Some(0),
        constantinople_block: Some(0),
        ewasm_block: None,
        premine_schedule: PremineSchedule {
            starts: MAINNET_PREMINE_STARTS.iter().map(|(year, _)| (*year, 0)).collect(),
            end: Some(0),
        },
    }
}

lazy_static::lazy_static! {
    /// The chain parameters of the main network.
    pub static ref MAINNET_CONFIG: ChainConfig = ChainConfig {
        premine_schedule: PremineSchedule {
            starts: BTreeMap::from(MAINNET_PREMINE_STARTS),
            end: Some(MAINNET_PREMINE_END),
        },
        ..all_from_genesis(786)
    };

    /// Every protocol change accepted into the proof-of-work rule set, active from genesis.
    pub static ref ALL_ETHASH_PROTOCOL_CHANGES: ChainConfig = all_from_genesis(1337);

    /// Configuration used by tests.
    pub static ref TEST_CHAIN_CONFIG: ChainConfig = all_from_genesis(1);
}
