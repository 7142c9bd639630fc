#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/ember-chain/ember/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod params;
pub use params::{
    ConsensusParams, DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, EXP_DIFF_PERIOD,
    GAS_LIMIT_BOUND_DIVISOR, MAXIMUM_EXTRA_DATA_SIZE, MIN_GAS_LIMIT, MINIMUM_DIFFICULTY,
};

mod hardfork;
pub use hardfork::{Hardfork, is_forked};

mod chain;
pub use chain::{ChainConfig, ForkOrderError, Rules};

mod compat;
pub use compat::ConfigCompatError;

mod premine;
pub use premine::PremineSchedule;

mod networks;
pub use networks::{
    ALL_ETHASH_PROTOCOL_CHANGES, MAINNET_CONFIG, MAINNET_GENESIS_HASH, TEST_CHAIN_CONFIG,
};
