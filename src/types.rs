//! Core stake-proof types for block acceptance

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ADDRESS_SIZE, MAX_DIFFICULTY_LEN};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Account address: the first 20 bytes of a hash.
///
/// There is no public constructor from raw bytes; addresses are derived
/// with [`crate::numeric::hash_to_address`] or
/// [`crate::numeric::public_key_to_address`]. It serializes for export but
/// is only ever decoded by [`crate::header::deserialize_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub(crate) fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Difficulty: big-endian gap between `MIN_DIFFICULTY` and the target.
///
/// Holds whatever bytes it was given; lengths above 32 are rejected when
/// the value is interpreted, not when it is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difficulty(ByteString);

impl Difficulty {
    pub fn new(bytes: ByteString) -> Self {
        Difficulty(bytes)
    }

    /// The empty difficulty, whose target is `MIN_DIFFICULTY`
    pub fn empty() -> Self {
        Difficulty(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Minimal encoding: at most 32 bytes and no leading zero byte
    pub fn is_canonical(&self) -> bool {
        self.0.len() <= MAX_DIFFICULTY_LEN && self.0.first() != Some(&0)
    }
}

impl From<ByteString> for Difficulty {
    fn from(bytes: ByteString) -> Self {
        Difficulty(bytes)
    }
}

/// Block Header: parent, time, provenance, difficulty, coinbase, stake, merkle root
///
/// Decode with [`crate::header::deserialize_header`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub parent: Hash,
    pub time: Timestamp,
    pub provenance: Hash,
    pub difficulty: Difficulty,
    pub coinbase: Address,
    pub stake: u64,
    pub merkle_root: Hash,
}

/// Block: a header plus the opaque masternode finality signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub header: BlockHeader,
    pub finality_signature: ByteString,
}

impl Block {
    pub fn new(header: BlockHeader) -> Self {
        Block {
            header,
            finality_signature: Vec::new(),
        }
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_canonical() {
        assert!(Difficulty::empty().is_canonical());
        assert!(Difficulty::new(vec![0x01, 0x00]).is_canonical());
        assert!(!Difficulty::new(vec![0x00, 0x01]).is_canonical());
        assert!(!Difficulty::new(vec![0x01; 33]).is_canonical());
    }

    #[test]
    fn test_address_display() {
        let address = Address::from_bytes([0xab; ADDRESS_SIZE]);
        assert_eq!(address.to_string(), "ab".repeat(ADDRESS_SIZE));
    }

    #[test]
    fn test_header_exports_derived_coinbase() {
        let coinbase = crate::numeric::hash_to_address(&[9; 32]);
        let header = BlockHeader {
            parent: [0; 32],
            time: 7,
            provenance: [0; 32],
            difficulty: Difficulty::empty(),
            coinbase,
            stake: 1,
            merkle_root: [0; 32],
        };
        let json = serde_json::to_value(&header).unwrap();
        let exported: Vec<u8> = json["coinbase"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b.as_u64().unwrap() as u8)
            .collect();
        assert_eq!(exported, coinbase.as_bytes().to_vec());
    }
}
