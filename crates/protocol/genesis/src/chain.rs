//! The chain configuration: fork rule set and chain identity.

use crate::{ConfigCompatError, Hardfork, PremineSchedule, is_forked};
use alloy_primitives::{B256, ChainId};
use thiserror::Error;

/// The core configuration that determines the consensus rules of the chain.
///
/// Every upgrade is a named, optional activation block. `None` means the upgrade is not
/// scheduled; `Some(0)` means it is active from genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChainConfig {
    /// Identifies the chain and is used for replay protection.
    pub chain_id: ChainId,
    /// Homestead switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub homestead_block: Option<u64>,
    /// The DAO hard-fork switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub dao_fork_block: Option<u64>,
    /// Whether the node supports or opposes the DAO hard-fork.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dao_fork_support: bool,
    /// EIP-150 switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip150_block: Option<u64>,
    /// Expected hash of the EIP-150 block, zero when unchecked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub eip150_hash: B256,
    /// EIP-155 switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip155_block: Option<u64>,
    /// EIP-158 switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip158_block: Option<u64>,
    /// Byzantium switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub byzantium_block: Option<u64>,
    /// Constantinople switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub constantinople_block: Option<u64>,
    /// eWASM switch block.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ewasm_block: Option<u64>,
    /// Year-indexed premine activation schedule.
    #[cfg_attr(feature = "serde", serde(default))]
    pub premine_schedule: PremineSchedule,
}

/// Snapshot of which upgrades are active at a single block.
///
/// Only valid for the block it was taken at; it must not be reused across a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rules {
    /// The chain id.
    pub chain_id: ChainId,
    /// Homestead is active.
    pub is_homestead: bool,
    /// EIP-150 is active.
    pub is_eip150: bool,
    /// EIP-155 is active.
    pub is_eip155: bool,
    /// EIP-158 is active.
    pub is_eip158: bool,
    /// Byzantium is active.
    pub is_byzantium: bool,
    /// Constantinople is active.
    pub is_constantinople: bool,
}

/// A later upgrade is scheduled without, or before, an upgrade it builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported fork ordering: {earlier} not enabled before {later}")]
pub struct ForkOrderError {
    /// The upgrade that should have been scheduled first.
    pub earlier: Hardfork,
    /// The upgrade scheduled out of order.
    pub later: Hardfork,
}

impl ChainConfig {
    /// Returns the activation block configured for `fork`.
    pub const fn fork_block(&self, fork: Hardfork) -> Option<u64> {
        match fork {
            Hardfork::Homestead => self.homestead_block,
            Hardfork::Dao => self.dao_fork_block,
            Hardfork::Eip150 => self.eip150_block,
            Hardfork::Eip155 => self.eip155_block,
            Hardfork::Eip158 => self.eip158_block,
            Hardfork::Byzantium => self.byzantium_block,
            Hardfork::Constantinople => self.constantinople_block,
            Hardfork::Ewasm => self.ewasm_block,
        }
    }

    /// Returns whether Homestead is active at block `number`.
    pub const fn is_homestead(&self, number: u64) -> bool {
        is_forked(self.homestead_block, number)
    }

    /// Returns whether the DAO fork is active at block `number`.
    pub const fn is_dao_fork(&self, number: u64) -> bool {
        is_forked(self.dao_fork_block, number)
    }

    /// Returns whether EIP-150 is active at block `number`.
    pub const fn is_eip150(&self, number: u64) -> bool {
        is_forked(self.eip150_block, number)
    }

    /// Returns whether EIP-155 is active at block `number`.
    pub const fn is_eip155(&self, number: u64) -> bool {
        is_forked(self.eip155_block, number)
    }

    /// Returns whether EIP-158 is active at block `number`.
    pub const fn is_eip158(&self, number: u64) -> bool {
        is_forked(self.eip158_block, number)
    }

    /// Returns whether Byzantium is active at block `number`.
    pub const fn is_byzantium(&self, number: u64) -> bool {
        is_forked(self.byzantium_block, number)
    }

    /// Returns whether Constantinople is active at block `number`.
    pub const fn is_constantinople(&self, number: u64) -> bool {
        is_forked(self.constantinople_block, number)
    }

    /// Returns whether eWASM is active at block `number`.
    pub const fn is_ewasm(&self, number: u64) -> bool {
        is_forked(self.ewasm_block, number)
    }

    /// Returns the premine year in effect at block `number`.
    pub fn premine_year(&self, number: u64) -> Option<u16> {
        self.premine_schedule.active_year(number)
    }

    /// Takes a [`Rules`] snapshot at block `number`.
    pub const fn rules(&self, number: u64) -> Rules {
        Rules {
            chain_id: self.chain_id,
            is_homestead: self.is_homestead(number),
            is_eip150: self.is_eip150(number),
            is_eip155: self.is_eip155(number),
            is_eip158: self.is_eip158(number),
            is_byzantium: self.is_byzantium(number),
            is_constantinople: self.is_constantinople(number),
        }
    }

    /// Checks that the mandatory upgrades are scheduled in order.
    ///
    /// Every upgrade from Homestead through Constantinople requires its predecessor to be
    /// scheduled at the same block or earlier. The DAO fork and eWASM are optional and
    /// therefore skipped.
    pub fn check_fork_order(&self) -> Result<(), ForkOrderError> {
        const ORDERED: [Hardfork; 6] = [
            Hardfork::Homestead,
            Hardfork::Eip150,
            Hardfork::Eip155,
            Hardfork::Eip158,
            Hardfork::Byzantium,
            Hardfork::Constantinople,
        ];

        for pair in ORDERED.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            let Some(later_block) = self.fork_block(later) else { continue };
            match self.fork_block(earlier) {
                Some(earlier_block) if earlier_block <= later_block => {}
                _ => return Err(ForkOrderError { earlier, later }),
            }
        }
        Ok(())
    }

    /// Checks whether a chain stored under this configuration at `height` can safely adopt
    /// `new`.
    ///
    /// Returns the lowest conflicting upgrade, together with the height the local chain must
    /// be rewound to before the new configuration can be applied.
    pub fn check_compatible(&self, new: &Self, height: u64) -> Result<(), ConfigCompatError> {
        let mut head = height;
        let mut last: Option<ConfigCompatError> = None;

        while let Some(err) = self.check_compatible_at(new, head) {
            if last.as_ref().is_some_and(|last| last.rewind_to == err.rewind_to) {
                break;
            }
            head = err.rewind_to;
            last = Some(err);
        }

        match last {
            Some(err) => {
                debug!(target: "genesis::compat", height, %err, "Incompatible chain configuration");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn check_compatible_at(&self, new: &Self, head: u64) -> Option<ConfigCompatError> {
        use strum::IntoEnumIterator;

        for fork in Hardfork::iter() {
            let (stored_block, new_block) = (self.fork_block(fork), new.fork_block(fork));
            if ConfigCompatError::is_fork_incompatible(stored_block, new_block, head) {
                return Some(ConfigCompatError::new(
                    format!("{fork} fork block"),
                    stored_block,
                    new_block,
                ));
            }

            match fork {
                Hardfork::Dao
                    if self.is_dao_fork(head) && self.dao_fork_support != new.dao_fork_support =>
                {
                    return Some(ConfigCompatError::new(
                        "DAO fork support flag",
                        self.dao_fork_block,
                        new.dao_fork_block,
                    ));
                }
                Hardfork::Eip158 if self.is_eip158(head) && self.chain_id != new.chain_id => {
                    return Some(ConfigCompatError::new(
                        "EIP158 chain ID",
                        self.eip158_block,
                        new.eip158_block,
                    ));
                }
                _ => {}
            }
        }
        None
    }
}
