//! Stake-weighted proof of work
//!
//! A header is accepted when `hash / stake <= target`, with integer
//! division truncating toward zero. Difficulty alone sets the work bar;
//! locked stake lowers it linearly.

use primitive_types::U256;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ConsensusError, Result};
use crate::header::header_hash;
use crate::numeric::{difficulty_to_int, hash_to_int};
use crate::types::*;

/// Proof and target for a header: (hash_to_int(header_hash(h)), target(h.difficulty))
fn proof_and_target(header: &BlockHeader) -> Result<(U256, U256)> {
    let target = difficulty_to_int(&header.difficulty)?;
    let proof = hash_to_int(&header_hash(header)?);
    Ok((proof, target))
}

/// Smallest stake `s` with `proof / s <= target`, or 0 when `proof <= target`.
///
/// `proof / s <= target` holds exactly when `proof < s * (target + 1)`, so the
/// minimum is the ceiling of `(proof + 1) / (target + 1)`, computed as
/// `proof / (target + 1) + 1` to stay inside 256 bits.
pub fn required_stake(proof: U256, target: U256) -> Result<u64> {
    if proof <= target {
        return Ok(0);
    }

    let divisor = target
        .checked_add(U256::one())
        .ok_or(ConsensusError::ArithmeticOverflow)?;
    let stake = (proof / divisor)
        .checked_add(U256::one())
        .ok_or(ConsensusError::ArithmeticOverflow)?;

    if stake > U256::from(u64::MAX) {
        return Err(ConsensusError::ArithmeticOverflow);
    }
    Ok(stake.low_u64())
}

/// MinimalStake: ℋ → ℕ
///
/// The stake a miner should lock so that the header's proof passes.
/// Returns 0 if the proof already meets the target on its own.
pub fn minimal_stake(header: &BlockHeader) -> Result<u64> {
    let (proof, target) = proof_and_target(header)?;
    let stake = required_stake(proof, target)?;
    debug!(stake, claimed = header.stake, "computed minimal stake");
    Ok(stake)
}

/// Whether `proof / stake <= target`
pub fn stake_suffices(proof: U256, target: U256, stake: u64) -> Result<bool> {
    if stake == 0 {
        return Err(ConsensusError::ZeroStake);
    }
    Ok(proof / U256::from(stake) <= target)
}

/// ValidateStake: ℋ → {true, false}
///
/// Whether `hash / header.stake <= target`. The stake is committed in the
/// hash, so a miner fixes the stake before searching for a passing header.
pub fn validate_stake(header: &BlockHeader) -> Result<bool> {
    if header.stake == 0 {
        return Err(ConsensusError::ZeroStake);
    }

    let (proof, target) = proof_and_target(header)?;
    let accepted = stake_suffices(proof, target, header.stake)?;
    debug!(stake = header.stake, accepted, "validated stake-weighted proof");
    Ok(accepted)
}

/// CheckStakeProof: ℋ → {valid, invalid}
pub fn check_stake_proof(header: &BlockHeader) -> Result<ValidationResult> {
    if validate_stake(header)? {
        return Ok(ValidationResult::Valid);
    }

    let required = minimal_stake(header)?;
    Ok(ValidationResult::Invalid(format!(
        "stake {} is below the required {}",
        header.stake, required
    )))
}

/// CheckStakeProofs: ℋ* → {valid, invalid}*
///
/// Independent headers (for example the same height from several peers)
/// are checked in parallel; results keep the input order.
pub fn check_stake_proofs(headers: &[BlockHeader]) -> Vec<Result<ValidationResult>> {
    headers.par_iter().map(check_stake_proof).collect()
}
