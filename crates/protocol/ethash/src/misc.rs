//! Header rules tied to individual hard-forks.

use crate::EthashError;
use alloy_consensus::Header;
use ember_genesis::ChainConfig;

/// Extra-data marker that DAO-supporting blocks carry right after the fork.
pub const DAO_FORK_BLOCK_EXTRA: &[u8] = b"dao-hard-fork";

/// Number of blocks from the DAO fork block on that must carry the fork marker.
pub const DAO_FORK_EXTRA_RANGE: u64 = 10;

/// Validates the extra-data of headers around the DAO hard-fork.
///
/// Within [`DAO_FORK_EXTRA_RANGE`] blocks of the fork, a supporting node requires the
/// [`DAO_FORK_BLOCK_EXTRA`] marker and an opposing node rejects it, so the two sides split
/// into separate networks.
pub fn verify_dao_header_extra_data(
    config: &ChainConfig,
    header: &Header,
) -> Result<(), EthashError> {
    let Some(fork_block) = config.dao_fork_block else { return Ok(()) };
    let limit = fork_block.saturating_add(DAO_FORK_EXTRA_RANGE);
    if header.number < fork_block || header.number >= limit {
        return Ok(());
    }

    let marked = header.extra_data.as_ref() == DAO_FORK_BLOCK_EXTRA;
    match (config.dao_fork_support, marked) {
        (true, false) => Err(EthashError::DaoExtraDataMissing),
        (false, true) => Err(EthashError::DaoExtraDataForbidden),
        _ => Ok(()),
    }
}

/// Checks the hash of the EIP-150 block against the configured fork hash, if any.
/// Uncles are exempt.
pub fn verify_fork_hashes(
    config: &ChainConfig,
    header: &Header,
    uncle: bool,
) -> Result<(), EthashError> {
    if uncle || config.eip150_block != Some(header.number) || config.eip150_hash.is_zero() {
        return Ok(());
    }

    let hash = header.hash_slow();
    if hash != config.eip150_hash {
        return Err(EthashError::ForkHashMismatch { have: hash, want: config.eip150_hash });
    }
    Ok(())
}
