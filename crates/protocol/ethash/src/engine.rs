//! The proof-of-work consensus engine.

use crate::{
    ChainReader, EpochStore, EthashConfig, EthashError, Hashimoto, VerificationMode,
    difficulty::calc_difficulty, seal,
};
use alloy_consensus::Header;
use alloy_primitives::{Address, B256, U256};
use ember_genesis::ChainConfig;
use num_bigint::BigUint;
use std::sync::Arc;

/// A consensus engine based on proof-of-work.
///
/// The engine is cheap to clone: clones share the same epoch buffers.
#[derive(Debug, Clone)]
pub struct Ethash {
    pub(crate) config: EthashConfig,
    pub(crate) store: Arc<EpochStore>,
}

impl Ethash {
    /// Creates an engine with the given configuration and mixing primitive.
    pub fn new(config: EthashConfig, hasher: Arc<dyn Hashimoto>) -> Self {
        let store = EpochStore::new(hasher, config.caches_in_mem, config.datasets_in_mem);
        Self { config, store: Arc::new(store) }
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EthashConfig {
        &self.config
    }

    /// The store of per-epoch verification buffers.
    pub fn store(&self) -> &EpochStore {
        &self.store
    }

    /// Returns the address that mined `header`.
    pub const fn author(&self, header: &Header) -> Address {
        header.beneficiary
    }

    /// Returns the hash `header` is sealed over.
    pub fn seal_hash(&self, header: &Header) -> B256 {
        seal::seal_hash(header)
    }

    /// Returns the difficulty a new block must have when created at `time` on top of `parent`,
    /// or `None` when it does not fit in 256 bits.
    pub fn calc_difficulty(
        &self,
        config: &ChainConfig,
        time: u64,
        parent: &Header,
    ) -> Option<BigUint> {
        calc_difficulty(config, &self.config.params, time, parent)
    }

    /// Sets the difficulty of `header` from its parent, as found in `chain`.
    pub fn prepare<C: ChainReader>(
        &self,
        chain: &C,
        header: &mut Header,
    ) -> Result<(), EthashError> {
        let parent = header
            .number
            .checked_sub(1)
            .and_then(|number| chain.header(header.parent_hash, number))
            .ok_or(EthashError::UnknownAncestor)?;

        header.difficulty = self
            .calc_difficulty(chain.config(), header.timestamp, &parent)
            .and_then(|difficulty| U256::try_from_be_slice(&difficulty.to_bytes_be()))
            .ok_or(EthashError::DifficultyOverflow)?;
        Ok(())
    }

    /// Checks whether `header` carries a valid proof-of-work.
    ///
    /// With `full` set, the full dataset of the epoch is used once it has been generated; until
    /// then, and without `full`, the light cache is used. In the fake modes the seal is
    /// accepted without running the mixing primitive.
    pub fn verify_seal(&self, header: &Header, full: bool) -> Result<(), EthashError> {
        match self.config.mode {
            VerificationMode::Strict => seal::verify_pow(&self.store, header, full),
            VerificationMode::FakeDelay(delay) => {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                Ok(())
            }
            VerificationMode::FakeFail(number) if number == header.number => {
                Err(EthashError::InvalidProofOfWork)
            }
            VerificationMode::FakeFail(_) | VerificationMode::FullyPermissive => Ok(()),
        }
    }

    /// Checks whether `header` conforms to the consensus rules.
    ///
    /// Headers already present in `chain` are accepted as is.
    pub fn verify_header<C: ChainReader>(
        &self,
        chain: &C,
        header: &Header,
        seal: bool,
    ) -> Result<(), EthashError> {
        if self.config.mode.is_fully_permissive() {
            return Ok(());
        }

        let number = header.number;
        if chain.header(header.hash_slow(), number).is_some() {
            return Ok(());
        }
        let parent = number
            .checked_sub(1)
            .and_then(|parent_number| chain.header(header.parent_hash, parent_number))
            .ok_or(EthashError::UnknownAncestor)?;

        self.verify_header_with_parent(chain.config(), header, &parent, false, seal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{KeccakHashimoto, MemoryChain, child_header, genesis_header, mine};
    use alloy_primitives::{B64, Bytes};
    use core::time::Duration;
    use ember_genesis::TEST_CHAIN_CONFIG;
    use std::time::Instant;

    fn engine(config: EthashConfig) -> Ethash {
        Ethash::new(config, Arc::new(KeccakHashimoto::default()))
    }

    fn low_difficulty_header() -> Header {
        Header {
            number: 42,
            difficulty: U256::from(1_024u64),
            extra_data: Bytes::from_static(b"seal"),
            ..Default::default()
        }
    }

    #[test]
    fn test_author() {
        let header = Header { beneficiary: Address::repeat_byte(0xaa), ..Default::default() };
        assert_eq!(engine(EthashConfig::default()).author(&header), Address::repeat_byte(0xaa));
    }

    #[test]
    fn test_verify_seal() {
        let engine = engine(EthashConfig::default());
        let mut header = low_difficulty_header();
        mine(&engine, &mut header);
        assert_eq!(engine.verify_seal(&header, false), Ok(()));

        for byte in 0..32 {
            for bit in 0..8 {
                let mut tampered = header.clone();
                tampered.mix_hash.0[byte] ^= 1 << bit;
                assert_eq!(
                    engine.verify_seal(&tampered, false),
                    Err(EthashError::InvalidMixDigest)
                );
            }
        }
    }

    #[test]
    fn test_verify_seal_wrong_nonce() {
        let engine = engine(EthashConfig::default());
        let mut header = low_difficulty_header();
        mine(&engine, &mut header);

        let nonce = u64::from_be_bytes(header.nonce.0).wrapping_add(1);
        let tampered = Header { nonce: B64::from(nonce.to_be_bytes()), ..header };
        assert_eq!(engine.verify_seal(&tampered, false), Err(EthashError::InvalidMixDigest));
    }

    #[test]
    fn test_verify_seal_insufficient_work() {
        let engine = engine(EthashConfig::default());
        let mut header = low_difficulty_header();
        mine(&engine, &mut header);

        // Find a nonce whose result misses the target, and give it a matching mix digest.
        let seal_hash = engine.seal_hash(&header);
        let (nonce, output) = (0u64..)
            .map(|nonce| (nonce, engine.store().hashimoto(header.number, seal_hash, nonce, false)))
            .find(|(_, output)| !crate::meets_target(output.result, header.difficulty))
            .unwrap();
        let weak =
            Header { nonce: B64::from(nonce.to_be_bytes()), mix_hash: output.mix_digest, ..header };
        assert_eq!(engine.verify_seal(&weak, false), Err(EthashError::InvalidProofOfWork));
    }

    #[test]
    fn test_verify_seal_zero_difficulty() {
        let engine = engine(EthashConfig::default());
        let header = Header { difficulty: U256::ZERO, ..low_difficulty_header() };
        assert_eq!(engine.verify_seal(&header, false), Err(EthashError::InvalidDifficulty));
    }

    #[test]
    fn test_verify_seal_full_dataset() {
        let engine = engine(EthashConfig::default());
        let mut header = low_difficulty_header();
        mine(&engine, &mut header);

        // Falls back to the light cache while the dataset is generating, then uses it.
        assert_eq!(engine.verify_seal(&header, true), Ok(()));
        let dataset = engine.store().dataset(header.number);
        let deadline = Instant::now() + Duration::from_secs(10);
        while dataset.generated().is_none() {
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(engine.verify_seal(&header, true), Ok(()));
    }

    #[test]
    fn test_fake_modes() {
        let header = low_difficulty_header();
        assert_eq!(engine(EthashConfig::fake()).verify_seal(&header, false), Ok(()));
        assert_eq!(
            engine(EthashConfig::fake_failer(42)).verify_seal(&header, false),
            Err(EthashError::InvalidProofOfWork)
        );
        assert_eq!(engine(EthashConfig::fake_failer(43)).verify_seal(&header, false), Ok(()));

        let delayed = engine(EthashConfig::fake_delayer(Duration::from_millis(20)));
        let start = Instant::now();
        assert_eq!(delayed.verify_seal(&header, false), Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_prepare() {
        let engine = engine(EthashConfig::fake());
        let genesis = genesis_header();
        let chain = MemoryChain::new(TEST_CHAIN_CONFIG.clone()).with_header(genesis.clone());

        let mut header = child_header(&TEST_CHAIN_CONFIG, &genesis, 10);
        let want = header.difficulty;
        header.difficulty = U256::ZERO;
        assert_eq!(engine.prepare(&chain, &mut header), Ok(()));
        assert_eq!(header.difficulty, want);

        let mut orphan = Header { parent_hash: B256::repeat_byte(1), ..header };
        assert_eq!(engine.prepare(&chain, &mut orphan), Err(EthashError::UnknownAncestor));
    }

    #[test]
    fn test_prepare_overflow() {
        let engine = engine(EthashConfig::fake());
        let genesis = Header { number: 30_000_000, ..genesis_header() };
        let chain = MemoryChain::new(ember_genesis::ChainConfig {
            homestead_block: Some(0),
            ..Default::default()
        })
        .with_header(genesis.clone());

        let mut header = Header {
            parent_hash: genesis.hash_slow(),
            number: genesis.number + 1,
            timestamp: genesis.timestamp + 15,
            ..Default::default()
        };
        assert_eq!(engine.prepare(&chain, &mut header), Err(EthashError::DifficultyOverflow));
        assert_eq!(header.difficulty, U256::ZERO);
    }

    #[test]
    fn test_verify_header_lookup() {
        let engine = engine(EthashConfig::fake());
        let genesis = genesis_header();
        let child = child_header(&TEST_CHAIN_CONFIG, &genesis, 10);
        let chain = MemoryChain::new(TEST_CHAIN_CONFIG.clone()).with_header(genesis.clone());

        assert_eq!(engine.verify_header(&chain, &child, true), Ok(()));

        let orphan = Header { parent_hash: B256::repeat_byte(1), ..child.clone() };
        assert_eq!(engine.verify_header(&chain, &orphan, true), Err(EthashError::UnknownAncestor));

        // Known headers are accepted without any check.
        let bogus = Header { number: 7, ..Default::default() };
        let chain = chain.with_header(bogus.clone());
        assert_eq!(engine.verify_header(&chain, &bogus, true), Ok(()));
    }

    #[test]
    fn test_fully_permissive() {
        let engine = engine(EthashConfig::fully_permissive());
        let chain = MemoryChain::new(TEST_CHAIN_CONFIG.clone());
        let orphan = Header { number: 5, parent_hash: B256::repeat_byte(1), ..Default::default() };
        assert_eq!(engine.verify_header(&chain, &orphan, true), Ok(()));
    }
}
