//! Fixed-width numeric primitives: hashes, addresses and difficulty targets

use primitive_types::U256;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::*;

/// SHA256: 𝕊 → ℍ
pub fn sha256(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&digest);
    hash
}

/// HashToInt: ℍ → [0, 2^256)
///
/// Big-endian interpretation of the hash bytes.
pub fn hash_to_int(hash: &Hash) -> U256 {
    U256::from_big_endian(hash)
}

/// HashToAddress: ℍ → 𝔸
///
/// address = SHA256(hash)[0..20]
pub fn hash_to_address(hash: &Hash) -> Address {
    let digest = sha256(hash);
    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&digest[..ADDRESS_SIZE]);
    Address::from_bytes(bytes)
}

/// Address of a miner key: the hash of the compressed public key, hashed
/// again and truncated.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    hash_to_address(&sha256(&public_key.serialize()))
}

/// DifficultyToInt: 𝔻 → [0, MIN_DIFFICULTY]
///
/// target = MIN_DIFFICULTY - big_endian(d)
pub fn difficulty_to_int(difficulty: &Difficulty) -> Result<U256> {
    let bytes = difficulty.as_bytes();
    if bytes.len() > MAX_DIFFICULTY_LEN {
        return Err(ConsensusError::InvalidDifficultyLength(bytes.len()));
    }

    MIN_DIFFICULTY
        .checked_sub(U256::from_big_endian(bytes))
        .ok_or(ConsensusError::DifficultyUnderflow)
}

/// IntToDifficulty: [0, MIN_DIFFICULTY] → 𝔻
///
/// d = minimal_big_endian(MIN_DIFFICULTY - target)
pub fn int_to_difficulty(target: U256) -> Result<Difficulty> {
    let gap = MIN_DIFFICULTY
        .checked_sub(target)
        .ok_or(ConsensusError::DifficultyOutOfRange)?;

    let bytes = minimal_big_endian(gap);
    if bytes.len() > MAX_DIFFICULTY_LEN {
        return Err(ConsensusError::InvalidDifficultyLength(bytes.len()));
    }
    Ok(Difficulty::new(bytes))
}

/// Big-endian bytes of `value` with leading zero bytes stripped
fn minimal_big_endian(value: U256) -> ByteString {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let skip = (value.leading_zeros() / 8) as usize;
    buf[skip..].to_vec()
}
