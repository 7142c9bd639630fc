//! Error types for the proof-of-work engine.

use alloy_primitives::{B256, U256};
use ember_genesis::ConfigCompatError;
use num_bigint::BigUint;
use thiserror::Error;

/// An error raised while verifying a header, a seal, or a block's uncles.
#[derive(Debug, Clone, PartialEq, Eq, Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EthashError {
    /// The parent of the header could not be located.
    #[error("unknown ancestor")]
    UnknownAncestor,
    /// The header timestamp is too far ahead of the local clock.
    #[error("block in the future: timestamp {timestamp}, max {max}")]
    FutureBlock {
        /// The header timestamp.
        timestamp: u64,
        /// The latest acceptable timestamp.
        max: u64,
    },
    /// The header number does not follow its parent.
    #[error("invalid block number {number}, parent is {parent}")]
    InvalidNumber {
        /// The header number.
        number: u64,
        /// The parent number.
        parent: u64,
    },
    /// The header timestamp is not strictly greater than the parent's.
    #[error("timestamp {timestamp} not after parent timestamp {parent}")]
    TimestampNotAfterParent {
        /// The header timestamp.
        timestamp: u64,
        /// The parent timestamp.
        parent: u64,
    },
    /// The header difficulty differs from the calculated one.
    #[error("invalid difficulty: have {have}, want {}", display_difficulty(.want))]
    DifficultyMismatch {
        /// The difficulty carried by the header.
        have: U256,
        /// The difficulty computed from the parent, `None` when it exceeds 256 bits.
        want: Option<BigUint>,
    },
    /// The calculated difficulty does not fit in a header.
    #[error("difficulty exceeds 256 bits")]
    DifficultyOverflow,
    /// Verification of a header panicked.
    #[error("header verification panicked")]
    VerificationPanicked,
    /// The gas limit exceeds `2^63 - 1`.
    #[error("invalid gas limit: have {have}, max {max}")]
    GasLimitExceedsCap {
        /// The header gas limit.
        have: u64,
        /// The cap.
        max: u64,
    },
    /// More gas was used than the header allows.
    #[error("invalid gas used: have {used}, gas limit {limit}")]
    GasUsedExceedsLimit {
        /// The header gas used.
        used: u64,
        /// The header gas limit.
        limit: u64,
    },
    /// The gas limit moved too far from the parent's, or dropped below the minimum.
    #[error("invalid gas limit: have {have}, want {parent} += {limit}")]
    GasLimitDelta {
        /// The header gas limit.
        have: u64,
        /// The parent gas limit.
        parent: u64,
        /// The allowed divergence, exclusive.
        limit: u64,
    },
    /// The extra-data section is longer than allowed.
    #[error("extra-data too long: {len} > {max}")]
    ExtraDataTooLong {
        /// The extra-data length.
        len: usize,
        /// The maximum allowed length.
        max: u64,
    },
    /// An uncle was already included by the block or one of its recent ancestors.
    #[error("duplicate uncle")]
    DuplicateUncle,
    /// An uncle is an ancestor of the block.
    #[error("uncle is ancestor")]
    UncleIsAncestor,
    /// An uncle does not hang off a recent ancestor, or is a sibling of the block.
    #[error("uncle's parent is not ancestor")]
    DanglingUncle,
    /// The header difficulty is zero.
    #[error("non-positive difficulty")]
    InvalidDifficulty,
    /// The mix digest does not match the one computed from the nonce.
    #[error("invalid mix digest")]
    InvalidMixDigest,
    /// The proof-of-work result is above the target.
    #[error("invalid proof-of-work")]
    InvalidProofOfWork,
    /// A DAO-supporting node saw a header without the fork marker in its extra-data.
    #[error("bad DAO pro-fork extra-data")]
    DaoExtraDataMissing,
    /// A DAO-opposing node saw a header carrying the fork marker.
    #[error("bad DAO no-fork extra-data")]
    DaoExtraDataForbidden,
    /// The EIP-150 block hash does not match the configured fork hash.
    #[error("homestead gas reprice fork: have {have}, want {want}")]
    ForkHashMismatch {
        /// The header hash.
        have: B256,
        /// The configured hash.
        want: B256,
    },
    /// A new chain configuration conflicts with the stored one.
    #[error(transparent)]
    ConfigIncompatible(#[from] ConfigCompatError),
}

fn display_difficulty(want: &Option<BigUint>) -> String {
    want.as_ref().map_or_else(|| "above 2^256".to_string(), ToString::to_string)
}

impl EthashError {
    /// Returns a short, stable label for the error kind.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
