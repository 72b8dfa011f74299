//! Canonical header encoding and hashing
//!
//! Wire layout (all integers big-endian):
//!
//! | field       | size        |
//! |-------------|-------------|
//! | parent      | 32          |
//! | time        | 8 (signed)  |
//! | provenance  | 32          |
//! | difficulty  | 1 + 0..=32  |
//! | coinbase    | 20          |
//! | stake       | 8           |
//! | merkle root | 32          |
//!
//! A block appends its finality signature as a 4-byte length followed by
//! the signature bytes.

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::numeric::sha256;
use crate::types::*;

/// SerializeHeader: ℋ → 𝕊
///
/// Fails with `InvalidDifficultyLength` when the difficulty cannot be
/// length-prefixed canonically.
pub fn serialize_header(header: &BlockHeader) -> Result<ByteString> {
    let difficulty = header.difficulty.as_bytes();
    if difficulty.len() > MAX_DIFFICULTY_LEN {
        return Err(ConsensusError::InvalidDifficultyLength(difficulty.len()));
    }

    let mut bytes = Vec::with_capacity(HEADER_BASE_SIZE + difficulty.len());
    bytes.extend_from_slice(&header.parent);
    bytes.extend_from_slice(&header.time.to_be_bytes());
    bytes.extend_from_slice(&header.provenance);
    bytes.push(difficulty.len() as u8);
    bytes.extend_from_slice(difficulty);
    bytes.extend_from_slice(header.coinbase.as_bytes());
    bytes.extend_from_slice(&header.stake.to_be_bytes());
    bytes.extend_from_slice(&header.merkle_root);

    Ok(bytes)
}

/// DeserializeHeader: 𝕊 → ℋ
///
/// Strict inverse of [`serialize_header`]: truncated input, trailing bytes
/// and non-minimal difficulty bytes are rejected.
pub fn deserialize_header(data: &[u8]) -> Result<BlockHeader> {
    let mut reader = Reader::new(data);
    let header = read_header(&mut reader)?;
    reader.finish()?;
    Ok(header)
}

/// HeaderHash: ℋ → ℍ
///
/// SHA256 over the canonical encoding.
pub fn header_hash(header: &BlockHeader) -> Result<Hash> {
    Ok(sha256(&serialize_header(header)?))
}

/// SerializeBlock: ℬ → 𝕊
pub fn serialize_block(block: &Block) -> Result<ByteString> {
    let signature = &block.finality_signature;
    if signature.len() > MAX_FINALITY_SIGNATURE_SIZE {
        return Err(ConsensusError::Serialization(format!(
            "finality signature of {} bytes exceeds {}",
            signature.len(),
            MAX_FINALITY_SIGNATURE_SIZE
        )));
    }

    let mut bytes = serialize_header(&block.header)?;
    bytes.extend_from_slice(&(signature.len() as u32).to_be_bytes());
    bytes.extend_from_slice(signature);
    Ok(bytes)
}

/// DeserializeBlock: 𝕊 → ℬ
pub fn deserialize_block(data: &[u8]) -> Result<Block> {
    let mut reader = Reader::new(data);
    let header = read_header(&mut reader)?;

    let len = u32::from_be_bytes(reader.array()?) as usize;
    if len > MAX_FINALITY_SIGNATURE_SIZE {
        return Err(ConsensusError::Serialization(format!(
            "finality signature of {} bytes exceeds {}",
            len, MAX_FINALITY_SIGNATURE_SIZE
        )));
    }
    let finality_signature = reader.take(len)?.to_vec();
    reader.finish()?;

    Ok(Block {
        header,
        finality_signature,
    })
}

/// Provenance for the first block: hash of the application state handed
/// over at chain initialisation.
pub fn provenance_from_app_state(app_state: &[u8]) -> Hash {
    sha256(app_state)
}

fn read_header(reader: &mut Reader<'_>) -> Result<BlockHeader> {
    let parent = reader.array()?;
    let time = i64::from_be_bytes(reader.array()?);
    let provenance = reader.array()?;

    let [difficulty_len] = reader.array::<1>()?;
    let difficulty_len = difficulty_len as usize;
    if difficulty_len > MAX_DIFFICULTY_LEN {
        return Err(ConsensusError::InvalidDifficultyLength(difficulty_len));
    }
    let difficulty = Difficulty::new(reader.take(difficulty_len)?.to_vec());
    if !difficulty.is_canonical() {
        return Err(ConsensusError::NonCanonicalEncoding(
            "difficulty has a leading zero byte".to_string(),
        ));
    }

    let coinbase = Address::from_bytes(reader.array()?);
    let stake = u64::from_be_bytes(reader.array()?);
    let merkle_root = reader.array()?;

    Ok(BlockHeader {
        parent,
        time,
        provenance,
        difficulty,
        coinbase,
        stake,
        merkle_root,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                ConsensusError::Serialization(format!(
                    "truncated input: need {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn finish(self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(ConsensusError::NonCanonicalEncoding(format!(
                "{} trailing bytes",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }
}
