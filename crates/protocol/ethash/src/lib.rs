#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/ember-chain/ember/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod macros;

mod metrics;
pub use metrics::Metrics;

mod error;
pub use error::EthashError;

mod config;
pub use config::{EthashConfig, VerificationMode};

mod difficulty;
pub use difficulty::{
    BYZANTIUM_BOMB_DELAY, CONSTANTINOPLE_BOMB_DELAY, DifficultyRule, calc_difficulty,
};

mod primitive;
pub use primitive::{Hashimoto, PowOutput};

mod epoch;
pub use epoch::{Dataset, EPOCH_LENGTH, EpochStore, LightCache, epoch};

mod seal;
pub use seal::{meets_target, seal_hash, seal_target};

mod misc;
pub use misc::{
    DAO_FORK_BLOCK_EXTRA, DAO_FORK_EXTRA_RANGE, verify_dao_header_extra_data, verify_fork_hashes,
};

mod traits;
pub use traits::{ChainReader, StateDb};

mod block;
pub use block::Block;

mod engine;
pub use engine::Ethash;

mod header;
pub use header::MAX_GAS_LIMIT;

mod uncles;
pub use uncles::UNCLE_ANCESTRY_DEPTH;

mod batch;
pub use batch::VerificationResult;

mod rewards;
pub use rewards::{
    BLOCK_REWARD_MULTIPLIER, BYZANTIUM_BLOCK_REWARD, CONSTANTINOPLE_BLOCK_REWARD,
    FRONTIER_BLOCK_REWARD, ISSUANCE_SCHEDULE, PREMINE_ADDRESSES, PREMINE_ALLOCATION,
    PREMINE_MULTIPLIER, YearlyIssuance, accumulate_rewards,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
