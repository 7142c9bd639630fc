//! Uncle validation.

use crate::{Block, ChainReader, Ethash, EthashError};
use alloy_consensus::Header;
use alloy_primitives::B256;
use std::collections::{HashMap, HashSet};

/// Number of ancestor generations an uncle may hang off.
pub const UNCLE_ANCESTRY_DEPTH: usize = 7;

impl Ethash {
    /// Checks that the uncles of `block` are recent, unused siblings of its ancestors, and
    /// that each conforms to the consensus rules including its seal.
    ///
    /// Uncles are checked in list order, so the reported error is deterministic.
    pub fn verify_uncles<C: ChainReader, T, R>(
        &self,
        chain: &C,
        block: &Block<T, R>,
    ) -> Result<(), EthashError> {
        if self.config.mode.is_fully_permissive() || block.uncles.is_empty() {
            return Ok(());
        }

        let mut used: HashSet<B256> = HashSet::new();
        let mut ancestors: HashMap<B256, Header> = HashMap::new();

        let (mut hash, mut number) = (block.parent_hash(), block.number().checked_sub(1));
        for _ in 0..UNCLE_ANCESTRY_DEPTH {
            let Some(ancestor) = number.and_then(|number| chain.block(hash, number)) else {
                break;
            };
            used.extend(ancestor.uncles.iter().map(Header::hash_slow));
            (hash, number) = (ancestor.parent_hash(), ancestor.number().checked_sub(1));
            ancestors.insert(ancestor.hash_slow(), ancestor.header);
        }

        let block_hash = block.hash_slow();
        ancestors.insert(block_hash, block.header.clone());
        used.insert(block_hash);

        for uncle in &block.uncles {
            let uncle_hash = uncle.hash_slow();
            if !used.insert(uncle_hash) {
                debug!(target: "ethash::uncles", %uncle_hash, "Duplicate uncle");
                return Err(EthashError::DuplicateUncle);
            }
            if ancestors.contains_key(&uncle_hash) {
                return Err(EthashError::UncleIsAncestor);
            }

            let parent = match ancestors.get(&uncle.parent_hash) {
                Some(parent) if uncle.parent_hash != block.parent_hash() => parent,
                _ => return Err(EthashError::DanglingUncle),
            };
            self.verify_header_with_parent(chain.config(), uncle, parent, true, true)?;
        }
        Ok(())
    }
}
