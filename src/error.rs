//! Error types for stake-weighted proof validation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Difficulty encoding is {0} bytes, maximum is 32")]
    InvalidDifficultyLength(usize),

    #[error("Difficulty value exceeds the minimum difficulty threshold")]
    DifficultyUnderflow,

    #[error("Stake must be non-zero")]
    ZeroStake,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Retargeted difficulty outside of 0..=MIN_DIFFICULTY")]
    DifficultyOutOfRange,

    #[error("Non-canonical encoding: {0}")]
    NonCanonicalEncoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Block time {time} is earlier than the minimum {min}")]
    TimestampTooEarly { time: i64, min: i64 },

    #[error("Retarget window is empty")]
    EmptyWindow,

    #[error("Block difficulty does not match the retargeted difficulty")]
    UnexpectedDifficulty,

    #[error("Stake {stake} is below the required {required}")]
    InsufficientStake { stake: u64, required: u64 },

    #[error("Unknown parent block")]
    UnknownParent,

    #[error("Block already known")]
    DuplicateBlock,

    #[error("Invalid consensus parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
