//! Stake-proof consensus constants

use primitive_types::U256;

/// Size of a block or state hash in bytes
pub const HASH_SIZE: usize = 32;

/// Size of an account address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Maximum length of a difficulty encoding
pub const MAX_DIFFICULTY_LEN: usize = 32;

/// Minimum difficulty (maximum target): `0xefff...ff`.
///
/// Strictly below `U256::MAX`, so an empty difficulty still yields a
/// target that leaves room for the `target + 1` divisor in the stake rule.
pub const MIN_DIFFICULTY: U256 = U256([
    u64::MAX,
    u64::MAX,
    u64::MAX,
    0xefff_ffff_ffff_ffff,
]);

/// Big-endian bytes of `MIN_DIFFICULTY`
pub const MIN_DIFFICULTY_BYTES: [u8; 32] = [
    0xef, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Encoded header size with an empty difficulty:
/// parent + time + provenance + difficulty length + coinbase + stake + merkle root
pub const HEADER_BASE_SIZE: usize = HASH_SIZE + 8 + HASH_SIZE + 1 + ADDRESS_SIZE + 8 + HASH_SIZE;

/// Encoded header size with a full 32-byte difficulty
pub const MAX_HEADER_SIZE: usize = HEADER_BASE_SIZE + MAX_DIFFICULTY_LEN;

/// Maximum finality signature blob accepted by the block decoder: 64 KiB
pub const MAX_FINALITY_SIGNATURE_SIZE: usize = 64 * 1024;

/// Minimum spacing between a block and its parent: 1 second
pub const DEFAULT_MIN_BLOCK_INTERVAL: i64 = 1;

/// Target time per block: 10 seconds
pub const DEFAULT_BLOCK_INTERVAL_TARGET: i64 = 10;

/// Number of parent intervals folded into the moving average
pub const DEFAULT_EMA_WINDOW: usize = 32;

/// Smoothing factor numerator (alpha = 1/8)
pub const DEFAULT_EMA_NUMERATOR: u64 = 1;

/// Smoothing factor denominator
pub const DEFAULT_EMA_DENOMINATOR: u64 = 8;

/// Per-block swing is at most 1/64 of the current target
pub const DEFAULT_ADJUSTMENT_INVERSE_BASE: u64 = 64;

/// Staked funds stay locked for one day after mining
pub const DEFAULT_STAKE_COOL_DOWN: i64 = 24 * 60 * 60;
