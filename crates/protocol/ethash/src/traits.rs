//! Collaborators the engine consumes.

use crate::Block;
use alloy_consensus::Header;
use alloy_primitives::{Address, B256, U256};
use ember_genesis::ChainConfig;

/// Read access to the local chain.
#[auto_impl::auto_impl(&, Box, Arc)]
pub trait ChainReader {
    /// Returns the chain configuration.
    fn config(&self) -> &ChainConfig;

    /// Returns the header with the given hash and number, if known.
    fn header(&self, hash: B256, number: u64) -> Option<Header>;

    /// Returns the block with the given hash and number, if known.
    fn block(&self, hash: B256, number: u64) -> Option<Block>;
}

/// Write access to account balances during block finalization.
#[auto_impl::auto_impl(&mut, Box)]
pub trait StateDb {
    /// Credits `amount` to `address`.
    fn add_balance(&mut self, address: Address, amount: U256);

    /// Computes the current state root. With `delete_empty_objects` set, empty accounts are
    /// pruned first.
    fn intermediate_root(&mut self, delete_empty_objects: bool) -> B256;
}
