//! Engine configuration.

use core::time::Duration;
use ember_genesis::ConsensusParams;

/// How strictly the engine checks proof-of-work seals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum VerificationMode {
    /// Full verification of every seal.
    #[default]
    Strict,
    /// Accept every seal after sleeping for the given delay.
    FakeDelay(Duration),
    /// Accept every seal except the one of the given block number.
    FakeFail(u64),
    /// Accept every header without running any check.
    FullyPermissive,
}

impl VerificationMode {
    /// Returns whether every check is skipped.
    pub const fn is_fully_permissive(&self) -> bool {
        matches!(self, Self::FullyPermissive)
    }
}

/// Configuration of the [`Ethash`] engine.
///
/// [`Ethash`]: crate::Ethash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EthashConfig {
    /// Seal verification mode.
    pub mode: VerificationMode,
    /// Protocol constants.
    pub params: ConsensusParams,
    /// Number of light caches kept in memory.
    pub caches_in_mem: usize,
    /// Number of full datasets kept in memory.
    pub datasets_in_mem: usize,
}

impl Default for EthashConfig {
    fn default() -> Self {
        Self {
            mode: VerificationMode::Strict,
            params: ConsensusParams::default(),
            caches_in_mem: 2,
            datasets_in_mem: 1,
        }
    }
}

impl EthashConfig {
    /// A configuration that accepts all seals as valid.
    pub fn fake() -> Self {
        Self::with_mode(VerificationMode::FakeDelay(Duration::ZERO))
    }

    /// A configuration that accepts all seals except the one of block `number`.
    pub fn fake_failer(number: u64) -> Self {
        Self::with_mode(VerificationMode::FakeFail(number))
    }

    /// A configuration that accepts all seals after sleeping for `delay`.
    pub fn fake_delayer(delay: Duration) -> Self {
        Self::with_mode(VerificationMode::FakeDelay(delay))
    }

    /// A configuration that accepts all headers without checking anything.
    pub fn fully_permissive() -> Self {
        Self::with_mode(VerificationMode::FullyPermissive)
    }

    fn with_mode(mode: VerificationMode) -> Self {
        Self { mode, ..Default::default() }
    }
}
