//! Block container.

use alloy_consensus::Header;
use alloy_primitives::{B256, Bytes};

/// A header together with its transactions, uncles and receipts.
///
/// Transactions and receipts default to their encoded form, since the engine never looks
/// inside them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Constructor)]
pub struct Block<T = Bytes, R = Bytes> {
    /// The block header.
    pub header: Header,
    /// The ordered transactions.
    pub transactions: Vec<T>,
    /// The ordered uncle headers.
    pub uncles: Vec<Header>,
    /// The ordered receipts.
    pub receipts: Vec<R>,
}

impl<T, R> Block<T, R> {
    /// Creates a block without transactions, uncles or receipts.
    pub const fn from_header(header: Header) -> Self {
        Self { header, transactions: Vec::new(), uncles: Vec::new(), receipts: Vec::new() }
    }

    /// Computes the hash of the block header.
    pub fn hash_slow(&self) -> B256 {
        self.header.hash_slow()
    }

    /// The block number.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// The hash of the parent block.
    pub const fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }
}
