//! The proof-of-work mixing primitive.

use alloy_primitives::B256;
use core::fmt::Debug;

/// Output of one proof-of-work mixing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Constructor)]
pub struct PowOutput {
    /// The mix digest, committed to by the header.
    pub mix_digest: B256,
    /// The final hash, compared against the difficulty target.
    pub result: B256,
}

/// The hashimoto family of functions: generation of the per-epoch verification buffers and
/// the mixing run over them.
///
/// Both mixing functions are pure given their buffer, so the light and the full path must
/// produce the same [`PowOutput`] for the same epoch, seal hash and nonce.
#[auto_impl::auto_impl(&, Box, Arc)]
pub trait Hashimoto: Debug + Send + Sync {
    /// Generates the light verification cache of `epoch`.
    fn generate_cache(&self, epoch: u64) -> Vec<u8>;

    /// Expands the light cache of `epoch` into the full dataset.
    fn generate_dataset(&self, epoch: u64, cache: &[u8]) -> Vec<u8>;

    /// Runs the mixing function against the light cache, deriving dataset items on the fly.
    fn hashimoto_light(&self, epoch: u64, cache: &[u8], seal_hash: B256, nonce: u64)
    -> PowOutput;

    /// Runs the mixing function against the full dataset.
    fn hashimoto_full(&self, dataset: &[u8], seal_hash: B256, nonce: u64) -> PowOutput;
}
