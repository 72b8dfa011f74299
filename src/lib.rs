//! # Stake-Proof
//!
//! Block-acceptance core for a hybrid proof-of-work / proof-of-stake chain.
//!
//! A candidate header is accepted when its hash, divided by the stake the
//! miner locks, does not exceed the target encoded by its difficulty:
//!
//! ```text
//! hash_to_int(header_hash(h)) / h.stake <= MIN_DIFFICULTY - big_endian(h.difficulty)
//! ```
//!
//! Difficulty drifts toward a target block interval through an exponential
//! moving average of recent block intervals.
//!
//! ## Architecture
//!
//! - Numeric primitives (hashes, addresses, difficulty ↔ target)
//! - Canonical header encoding and hashing
//! - Stake-weighted proof validator
//! - EMA difficulty retargeting and the next-block timestamp window
//! - Chain-head bookkeeping (block arena, tips, stake cool-down)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: validation and retargeting are deterministic and side-effect-free
//! 2. **Fixed-Width Arithmetic**: 256-bit values use `U256` with checked operations
//! 3. **Exact Version Pinning**: consensus-critical dependencies pinned to exact versions
//! 4. **No Panics on Input**: malformed headers are rejected with a `ConsensusError`
//!
//! ## Usage
//!
//! ```rust
//! use stake_proof::StakeProof;
//! use stake_proof::types::*;
//! use stake_proof::numeric::hash_to_address;
//!
//! let consensus = StakeProof::new();
//! let header = BlockHeader {
//!     parent: [0; 32],
//!     time: 1_600_000_000,
//!     provenance: [0; 32],
//!     difficulty: Difficulty::empty(),
//!     coinbase: hash_to_address(&[1; 32]),
//!     stake: 1,
//!     merkle_root: [0; 32],
//! };
//! let hash = consensus.header_hash(&header).unwrap();
//! assert_eq!(hash, consensus.header_hash(&header.clone()).unwrap());
//! ```

pub mod types;
pub mod constants;
pub mod numeric;
pub mod header;
pub mod pow;
pub mod params;
pub mod target;
pub mod retarget;
pub mod cooldown;
pub mod chain;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{ConsensusError, Result};
pub use params::ConsensusParameters;
pub use target::Target;
pub use chain::{Chain, NextBlock, SharedChain};
pub use primitive_types::U256;

/// Main stake-proof implementation
///
/// # Examples
///
/// ```
/// use stake_proof::StakeProof;
/// use stake_proof::types::*;
/// use stake_proof::numeric::hash_to_address;
///
/// let consensus = StakeProof::new();
///
/// let header = BlockHeader {
///     parent: [0; 32],
///     time: 1_600_000_000,
///     provenance: [0; 32],
///     difficulty: Difficulty::empty(),
///     coinbase: hash_to_address(&[1; 32]),
///     stake: 1,
///     merkle_root: [0; 32],
/// };
///
/// // An empty difficulty accepts almost any hash with a stake of 1
/// let valid = consensus.validate_stake(&header).unwrap();
/// let required = consensus.minimal_stake(&header).unwrap();
/// assert_eq!(valid, required <= 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StakeProof {
    params: ConsensusParameters,
}

impl StakeProof {
    /// Create a stake-proof instance with the default consensus parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use stake_proof::StakeProof;
    ///
    /// let consensus = StakeProof::new();
    /// assert!(consensus.params().validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stake-proof instance with explicit consensus parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use stake_proof::{ConsensusParameters, StakeProof};
    ///
    /// let params = ConsensusParameters {
    ///     block_interval_target: 30,
    ///     ..Default::default()
    /// };
    /// let consensus = StakeProof::with_params(params).unwrap();
    /// assert_eq!(consensus.params().block_interval_target, 30);
    /// ```
    pub fn with_params(params: ConsensusParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ConsensusParameters {
        &self.params
    }

    /// Hash of the canonical header encoding
    pub fn header_hash(&self, header: &BlockHeader) -> Result<Hash> {
        header::header_hash(header)
    }

    /// Smallest stake that makes the header's proof pass (0 if none is needed)
    pub fn minimal_stake(&self, header: &BlockHeader) -> Result<u64> {
        pow::minimal_stake(header)
    }

    /// Whether the header's claimed stake is sufficient
    pub fn validate_stake(&self, header: &BlockHeader) -> Result<bool> {
        pow::validate_stake(header)
    }

    /// Stake-weighted proof check with a reason on failure
    pub fn check_stake_proof(&self, header: &BlockHeader) -> Result<ValidationResult> {
        pow::check_stake_proof(header)
    }

    /// Target window for a child of `parent`
    ///
    /// # Examples
    ///
    /// ```
    /// use stake_proof::{StakeProof, Target};
    /// use stake_proof::types::*;
    /// use stake_proof::numeric::hash_to_address;
    ///
    /// let consensus = StakeProof::new();
    /// let parent = BlockHeader {
    ///     parent: [0; 32],
    ///     time: 1_000,
    ///     provenance: [0; 32],
    ///     difficulty: Difficulty::empty(),
    ///     coinbase: hash_to_address(&[0; 32]),
    ///     stake: 1,
    ///     merkle_root: [0; 32],
    /// };
    ///
    /// let target = consensus.next_target(&parent).unwrap();
    /// assert_eq!(target, Target { min: 1_001, target: 1_010 });
    /// ```
    pub fn next_target(&self, parent: &BlockHeader) -> Result<Target> {
        Target::after(parent, &self.params)
    }

    /// Difficulty required of the child of the newest header in `window`
    ///
    /// # Examples
    ///
    /// ```
    /// use stake_proof::StakeProof;
    /// use stake_proof::types::*;
    /// use stake_proof::numeric::hash_to_address;
    ///
    /// let consensus = StakeProof::new();
    /// let interval = consensus.params().block_interval_target;
    /// let window: Vec<BlockHeader> = (0..4)
    ///     .map(|i| BlockHeader {
    ///         parent: [0; 32],
    ///         time: 1_000 + i * interval,
    ///         provenance: [0; 32],
    ///         difficulty: Difficulty::new(vec![0x01, 0x00]),
    ///         coinbase: hash_to_address(&[0; 32]),
    ///         stake: 1,
    ///         merkle_root: [0; 32],
    ///     })
    ///     .collect();
    ///
    /// // Blocks exactly on schedule leave the difficulty unchanged
    /// let next = consensus.retarget(&window).unwrap();
    /// assert_eq!(next, Difficulty::new(vec![0x01, 0x00]));
    /// ```
    pub fn retarget(&self, window: &[BlockHeader]) -> Result<Difficulty> {
        retarget::retarget(window, &self.params)
    }

    /// Start chain-head tracking from a genesis block
    pub fn new_chain(&self, genesis: Block) -> Result<Chain> {
        Chain::new(self.params.clone(), genesis)
    }
}
