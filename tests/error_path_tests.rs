//! Tests for error paths and edge cases

use stake_proof::*;
use stake_proof::header::*;
use stake_proof::numeric::*;
use stake_proof::pow::*;
use stake_proof::retarget::*;

fn header(difficulty: Difficulty, stake: u64) -> BlockHeader {
    BlockHeader {
        parent: [0; 32],
        time: 1_000,
        provenance: [0; 32],
        difficulty,
        coinbase: hash_to_address(&[0; 32]),
        stake,
        merkle_root: [0; 32],
    }
}

#[test]
fn test_invalid_difficulty_length_on_decode_path() {
    let h = header(Difficulty::new(vec![1; 33]), 1);
    assert_eq!(difficulty_to_int(&h.difficulty), Err(ConsensusError::InvalidDifficultyLength(33)));
    assert_eq!(validate_stake(&h), Err(ConsensusError::InvalidDifficultyLength(33)));
    assert_eq!(minimal_stake(&h), Err(ConsensusError::InvalidDifficultyLength(33)));
}

#[test]
fn test_invalid_difficulty_length_on_encode_path() {
    let h = header(Difficulty::new(vec![1; 64]), 1);
    assert_eq!(serialize_header(&h), Err(ConsensusError::InvalidDifficultyLength(64)));
    assert_eq!(header_hash(&h), Err(ConsensusError::InvalidDifficultyLength(64)));
}

#[test]
fn test_difficulty_underflow() {
    let mut bytes = MIN_DIFFICULTY_BYTES.to_vec();
    bytes[31] = 0x00;
    bytes[0] = 0xf0;
    let h = header(Difficulty::new(bytes), 1);
    assert_eq!(validate_stake(&h), Err(ConsensusError::DifficultyUnderflow));
}

#[test]
fn test_zero_stake_is_error_not_boolean() {
    let h = header(Difficulty::empty(), 0);
    assert_eq!(validate_stake(&h), Err(ConsensusError::ZeroStake));
}

#[test]
fn test_arithmetic_overflow_on_zero_target() {
    // Target 0 needs a stake above the full hash value
    let mut h = header(int_to_difficulty(U256::zero()).unwrap(), 1);
    let wide = (0u8..=255)
        .map(|i| {
            h.merkle_root[0] = i;
            h.clone()
        })
        .find(|h| hash_to_int(&header_hash(h).unwrap()) >= U256::from(u64::MAX))
        .expect("a proof wider than 64 bits");

    assert_eq!(minimal_stake(&wide), Err(ConsensusError::ArithmeticOverflow));
    assert_eq!(
        required_stake(U256::from(u64::MAX), U256::zero()),
        Err(ConsensusError::ArithmeticOverflow)
    );
}

#[test]
fn test_retarget_clamps_slow_blocks_at_easiest_difficulty() {
    let params = ConsensusParameters::default();
    let parent = header(Difficulty::empty(), 1);
    let mut child = parent.clone();
    child.time += params.block_interval_target * 5;
    assert_eq!(retarget(&[parent, child], &params).unwrap(), Difficulty::empty());
}

#[test]
fn test_target_above_threshold_is_out_of_range() {
    let params = ConsensusParameters::default();
    let above = MIN_DIFFICULTY + U256::one();
    assert_eq!(
        adjust_target(above, params.block_interval_target, &params),
        Err(ConsensusError::DifficultyOutOfRange)
    );
    assert_eq!(int_to_difficulty(above), Err(ConsensusError::DifficultyOutOfRange));
}

#[test]
fn test_truncated_header_is_rejected() {
    let bytes = serialize_header(&header(Difficulty::empty(), 1)).unwrap();
    for len in [0, 1, 32, 72, HEADER_BASE_SIZE - 1] {
        assert!(deserialize_header(&bytes[..len]).is_err(), "accepted {} bytes", len);
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ConsensusError::InvalidDifficultyLength(40).to_string(),
        "Difficulty encoding is 40 bytes, maximum is 32"
    );
    assert_eq!(ConsensusError::ZeroStake.to_string(), "Stake must be non-zero");
    assert_eq!(
        ConsensusError::TimestampTooEarly { time: 5, min: 6 }.to_string(),
        "Block time 5 is earlier than the minimum 6"
    );
}
