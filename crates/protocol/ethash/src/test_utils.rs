//! Test utilities for the proof-of-work engine.

use crate::{Block, ChainReader, Ethash, Hashimoto, PowOutput, calc_difficulty, meets_target};
use alloy_consensus::{Header, constants::EMPTY_OMMER_ROOT_HASH};
use alloy_primitives::{B64, B256, Keccak256, U256, keccak256};
use ember_genesis::{ChainConfig, ConsensusParams};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Size of the light cache produced by [`KeccakHashimoto`].
const CACHE_SIZE: usize = 64;

/// A cheap, deterministic stand-in for the hashimoto primitive.
///
/// The light cache is a short keccak chain seeded by the epoch, and the dataset is the cache
/// followed by its hash. Both mixing paths hash the cache prefix together with the seal hash
/// and nonce, so light and full verification always agree. Generation runs are counted.
#[derive(Debug, Default)]
pub struct KeccakHashimoto {
    caches: AtomicUsize,
    datasets: AtomicUsize,
}

impl KeccakHashimoto {
    /// Number of light caches generated so far.
    pub fn cache_generations(&self) -> usize {
        self.caches.load(Ordering::SeqCst)
    }

    /// Number of datasets generated so far.
    pub fn dataset_generations(&self) -> usize {
        self.datasets.load(Ordering::SeqCst)
    }

    fn mix(cache: &[u8], seal_hash: B256, nonce: u64) -> PowOutput {
        let mut hasher = Keccak256::new();
        hasher.update(&cache[..CACHE_SIZE.min(cache.len())]);
        hasher.update(seal_hash);
        hasher.update(nonce.to_be_bytes());
        let mix_digest = hasher.finalize();

        let mut hasher = Keccak256::new();
        hasher.update(mix_digest);
        hasher.update(seal_hash);
        PowOutput::new(mix_digest, hasher.finalize())
    }
}

impl Hashimoto for KeccakHashimoto {
    fn generate_cache(&self, epoch: u64) -> Vec<u8> {
        self.caches.fetch_add(1, Ordering::SeqCst);
        let seed = keccak256(epoch.to_be_bytes());
        let mut cache = seed.to_vec();
        cache.extend_from_slice(keccak256(seed).as_slice());
        cache
    }

    fn generate_dataset(&self, _epoch: u64, cache: &[u8]) -> Vec<u8> {
        self.datasets.fetch_add(1, Ordering::SeqCst);
        let mut dataset = cache.to_vec();
        dataset.extend_from_slice(keccak256(cache).as_slice());
        dataset
    }

    fn hashimoto_light(
        &self,
        _epoch: u64,
        cache: &[u8],
        seal_hash: B256,
        nonce: u64,
    ) -> PowOutput {
        Self::mix(cache, seal_hash, nonce)
    }

    fn hashimoto_full(&self, dataset: &[u8], seal_hash: B256, nonce: u64) -> PowOutput {
        Self::mix(dataset, seal_hash, nonce)
    }
}

/// An in-memory [`ChainReader`].
#[derive(Debug, Clone)]
pub struct MemoryChain {
    config: ChainConfig,
    headers: HashMap<B256, Header>,
    blocks: HashMap<B256, Block>,
}

impl MemoryChain {
    /// Creates an empty chain with the given configuration.
    pub fn new(config: ChainConfig) -> Self {
        Self { config, headers: HashMap::new(), blocks: HashMap::new() }
    }

    /// Adds a header.
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.insert(header.hash_slow(), header);
        self
    }

    /// Adds a block, making its header known too.
    pub fn with_block(mut self, block: Block) -> Self {
        let hash = block.hash_slow();
        self.headers.insert(hash, block.header.clone());
        self.blocks.insert(hash, block);
        self
    }
}

impl ChainReader for MemoryChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn header(&self, hash: B256, number: u64) -> Option<Header> {
        self.headers.get(&hash).filter(|header| header.number == number).cloned()
    }

    fn block(&self, hash: B256, number: u64) -> Option<Block> {
        self.blocks.get(&hash).filter(|block| block.number() == number).cloned()
    }
}

/// A genesis header at the minimum difficulty with an 8M gas limit.
pub fn genesis_header() -> Header {
    Header {
        ommers_hash: EMPTY_OMMER_ROOT_HASH,
        number: 0,
        timestamp: 1_000_000,
        difficulty: U256::from(ConsensusParams::default().minimum_difficulty),
        gas_limit: 8_000_000,
        ..Default::default()
    }
}

/// A valid, unsealed child of `parent` created `gap` seconds after it, with the difficulty
/// required under `config` and the default consensus parameters.
pub fn child_header(config: &ChainConfig, parent: &Header, gap: u64) -> Header {
    let timestamp = parent.timestamp + gap;
    let difficulty = calc_difficulty(config, &ConsensusParams::default(), timestamp, parent)
        .and_then(|difficulty| U256::try_from_be_slice(&difficulty.to_bytes_be()))
        .expect("difficulty fits 256 bits");
    Header {
        parent_hash: parent.hash_slow(),
        ommers_hash: EMPTY_OMMER_ROOT_HASH,
        number: parent.number + 1,
        timestamp,
        difficulty,
        gas_limit: parent.gas_limit,
        ..Default::default()
    }
}

/// Searches for a nonce that seals `header` under the mixing primitive of `engine`, and
/// writes it together with the mix digest into the header.
pub fn mine(engine: &Ethash, header: &mut Header) {
    let seal_hash = engine.seal_hash(header);
    let (nonce, output) = (0u64..)
        .map(|nonce| (nonce, engine.store().hashimoto(header.number, seal_hash, nonce, false)))
        .find(|(_, output)| meets_target(output.result, header.difficulty))
        .expect("nonce space exhausted");
    header.nonce = B64::from(nonce.to_be_bytes());
    header.mix_hash = output.mix_digest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_genesis::TEST_CHAIN_CONFIG;

    #[test]
    fn test_light_and_full_agree() {
        let hasher = KeccakHashimoto::default();
        let cache = hasher.generate_cache(3);
        let dataset = hasher.generate_dataset(3, &cache);
        let seal_hash = B256::repeat_byte(7);

        assert_eq!(
            hasher.hashimoto_light(3, &cache, seal_hash, 99),
            hasher.hashimoto_full(&dataset, seal_hash, 99)
        );
        assert_ne!(
            hasher.hashimoto_light(3, &cache, seal_hash, 99),
            hasher.hashimoto_light(3, &cache, seal_hash, 100)
        );
        assert_eq!(hasher.cache_generations(), 1);
        assert_eq!(hasher.dataset_generations(), 1);
    }

    #[test]
    fn test_memory_chain_checks_number() {
        let genesis = genesis_header();
        let hash = genesis.hash_slow();
        let chain = MemoryChain::new(TEST_CHAIN_CONFIG.clone())
            .with_block(Block::from_header(genesis.clone()));

        assert_eq!(chain.header(hash, 0), Some(genesis));
        assert!(chain.block(hash, 0).is_some());
        assert_eq!(chain.header(hash, 1), None);
        assert!(chain.block(B256::ZERO, 0).is_none());
    }
}
