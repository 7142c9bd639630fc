//! Single header validation against its parent.

use crate::{
    Ethash, EthashError,
    difficulty::{calc_difficulty, u256_to_big},
    misc::{verify_dao_header_extra_data, verify_fork_hashes},
};
use alloy_consensus::Header;
use ember_genesis::ChainConfig;
use std::time::{SystemTime, UNIX_EPOCH};

/// Largest gas limit a header may declare, `2^63 - 1`.
pub const MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;

impl Ethash {
    /// Checks whether `header` conforms to the consensus rules on top of `parent`.
    ///
    /// Uncles are exempt from the future-block check and from the EIP-150 fork hash. The
    /// checks run in a fixed order and the first failure is returned.
    pub fn verify_header_with_parent(
        &self,
        config: &ChainConfig,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> Result<(), EthashError> {
        let result = self.check_header(config, header, parent, uncle, seal);
        match &result {
            Ok(()) => {
                trace!(target: "ethash", number = header.number, uncle, "Header verified");
                crate::inc!(counter, HEADERS_VERIFIED);
            }
            Err(err) => {
                debug!(target: "ethash", number = header.number, uncle, %err, "Header rejected");
                crate::inc!(counter, HEADER_VERIFICATION_FAILURES, "kind", err.kind());
            }
        }
        result
    }

    fn check_header(
        &self,
        config: &ChainConfig,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> Result<(), EthashError> {
        let params = &self.config.params;

        let extra_len = header.extra_data.len();
        if extra_len as u64 > params.maximum_extra_data_size {
            return Err(EthashError::ExtraDataTooLong {
                len: extra_len,
                max: params.maximum_extra_data_size,
            });
        }

        if !uncle {
            let max = unix_now().saturating_add(params.allowed_future_block_time.as_secs());
            if header.timestamp > max {
                return Err(EthashError::FutureBlock { timestamp: header.timestamp, max });
            }
        }
        if header.timestamp <= parent.timestamp {
            return Err(EthashError::TimestampNotAfterParent {
                timestamp: header.timestamp,
                parent: parent.timestamp,
            });
        }

        let want = calc_difficulty(config, params, header.timestamp, parent);
        if want.as_ref() != Some(&u256_to_big(header.difficulty)) {
            return Err(EthashError::DifficultyMismatch { have: header.difficulty, want });
        }

        if header.gas_limit > MAX_GAS_LIMIT {
            return Err(EthashError::GasLimitExceedsCap {
                have: header.gas_limit,
                max: MAX_GAS_LIMIT,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(EthashError::GasUsedExceedsLimit {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }

        let limit = parent.gas_limit / params.gas_limit_bound_divisor.max(1);
        if parent.gas_limit.abs_diff(header.gas_limit) >= limit ||
            header.gas_limit < params.min_gas_limit
        {
            return Err(EthashError::GasLimitDelta {
                have: header.gas_limit,
                parent: parent.gas_limit,
                limit,
            });
        }

        if header.number.checked_sub(1) != Some(parent.number) {
            let (number, parent) = (header.number, parent.number);
            return Err(EthashError::InvalidNumber { number, parent });
        }

        if seal {
            self.verify_seal(header, false)?;
        }

        verify_dao_header_extra_data(config, header)?;
        verify_fork_hashes(config, header, uncle)
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |now| now.as_secs())
}
