//! Proof-of-work seal hashing and target checks.

use crate::{EpochStore, EthashError, difficulty::u256_to_big};
use alloy_consensus::Header;
use alloy_primitives::{B256, U256, keccak256};
use alloy_rlp::Encodable;
use num_bigint::BigUint;
use num_traits::One;

/// Returns the hash of a header prior to it being sealed: the keccak of the RLP list of every
/// header field except the mix digest and the nonce.
pub fn seal_hash(header: &Header) -> B256 {
    let fields: [&dyn Encodable; 13] = [
        &header.parent_hash,
        &header.ommers_hash,
        &header.beneficiary,
        &header.state_root,
        &header.transactions_root,
        &header.receipts_root,
        &header.logs_bloom,
        &header.difficulty,
        &header.number,
        &header.gas_limit,
        &header.gas_used,
        &header.timestamp,
        &header.extra_data,
    ];
    let mut out = Vec::new();
    alloy_rlp::encode_list::<_, dyn Encodable>(&fields, &mut out);
    keccak256(out)
}

/// Returns `2^256 / difficulty`, or `None` for a zero difficulty.
pub fn seal_target(difficulty: U256) -> Option<BigUint> {
    (!difficulty.is_zero()).then(|| (BigUint::one() << 256u32) / u256_to_big(difficulty))
}

/// Returns whether `result`, read as a big-endian integer, is within the target of
/// `difficulty`.
pub fn meets_target(result: B256, difficulty: U256) -> bool {
    seal_target(difficulty)
        .is_some_and(|target| BigUint::from_bytes_be(result.as_slice()) <= target)
}

/// Checks the nonce and mix digest of `header` with the mixing primitive of `store`.
pub(crate) fn verify_pow(
    store: &EpochStore,
    header: &Header,
    full: bool,
) -> Result<(), EthashError> {
    let target = seal_target(header.difficulty).ok_or(EthashError::InvalidDifficulty)?;

    let nonce = u64::from_be_bytes(header.nonce.0);
    let output = store.hashimoto(header.number, seal_hash(header), nonce, full);

    if output.mix_digest != header.mix_hash {
        return Err(EthashError::InvalidMixDigest);
    }
    if BigUint::from_bytes_be(output.result.as_slice()) > target {
        return Err(EthashError::InvalidProofOfWork);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B64, Bytes, b256};

    #[test]
    fn test_seal_hash_ignores_seal_fields() {
        let header = Header { number: 1, difficulty: U256::from(131_072u64), ..Default::default() };
        let sealed = Header {
            nonce: B64::repeat_byte(0xff),
            mix_hash: B256::repeat_byte(0xee),
            ..header.clone()
        };
        assert_eq!(seal_hash(&header), seal_hash(&sealed));
        assert_ne!(seal_hash(&header), header.hash_slow());
    }

    #[test]
    fn test_seal_hash_commits_to_extra_data() {
        let header = Header::default();
        let other = Header { extra_data: Bytes::from_static(b"ember"), ..Default::default() };
        assert_ne!(seal_hash(&header), seal_hash(&other));
    }

    #[test]
    fn test_seal_hash_of_empty_header() {
        let header = Header {
            ommers_hash: B256::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            ..Default::default()
        };
        let mut out = Vec::new();
        alloy_rlp::Header { list: true, payload_length: 33 * 5 + 21 + 259 + 6 }.encode(&mut out);
        for field in 0..6 {
            if field == 2 {
                out.push(0x94);
                out.extend_from_slice(&[0u8; 20]);
            } else {
                out.push(0xa0);
                out.extend_from_slice(&[0u8; 32]);
            }
        }
        out.extend_from_slice(&[0xb9, 0x01, 0x00]);
        out.extend_from_slice(&[0u8; 256]);
        // difficulty, number, gas limit, gas used, timestamp are zero, extra-data is empty.
        out.extend_from_slice(&[0x80; 6]);
        assert_eq!(seal_hash(&header), keccak256(&out));
    }

    #[test]
    fn test_seal_target() {
        assert_eq!(seal_target(U256::ZERO), None);
        assert_eq!(seal_target(U256::from(1u64)), Some(BigUint::one() << 256u32));
        assert_eq!(seal_target(U256::from(2u64)), Some(BigUint::one() << 255u32));
    }

    #[test]
    fn test_meets_target() {
        let difficulty = U256::from(2u64);
        let edge = b256!("0x8000000000000000000000000000000000000000000000000000000000000000");
        assert!(meets_target(B256::ZERO, difficulty));
        assert!(meets_target(edge, difficulty));
        assert!(!meets_target(B256::with_last_byte(1) | edge, difficulty));
        assert!(meets_target(B256::repeat_byte(0xff), U256::from(1u64)));
        assert!(!meets_target(B256::ZERO, U256::ZERO));
    }
}
