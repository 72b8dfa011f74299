//! EMA difficulty retargeting
//!
//! The average block interval is tracked as an exponential moving average
//! over the last `ema_window` intervals, seeded at `block_interval_target`:
//!
//! ```text
//! ema' = (ema * (den - num) + interval * num) / den
//! ```
//!
//! The target of the newest block then moves toward the interval target.
//! Blocks faster than the target shrink the target (higher difficulty),
//! slower blocks grow it. The swing per block is at most
//! `target / adjustment_inverse_base`, reached when the average deviates
//! from the interval target by a full interval or more. The target never
//! grows past `MIN_DIFFICULTY`; a larger step stops there.

use primitive_types::U256;
use tracing::{debug, warn};

use crate::constants::MIN_DIFFICULTY;
use crate::error::{ConsensusError, Result};
use crate::numeric::{difficulty_to_int, int_to_difficulty};
use crate::params::ConsensusParameters;
use crate::types::*;

/// EmaStep: ℤ × ℤ → ℤ
///
/// Fold one block interval into the moving average.
pub fn ema_step(ema: i64, interval: i64, params: &ConsensusParameters) -> Result<i64> {
    let num = params.ema_numerator as i128;
    let den = params.ema_denominator as i128;
    if den == 0 || num > den {
        return Err(ConsensusError::InvalidParameters(
            "ema_numerator must be in 0..=ema_denominator".to_string(),
        ));
    }

    let weighted = (ema as i128)
        .checked_mul(den - num)
        .and_then(|old| (interval as i128).checked_mul(num).and_then(|new| old.checked_add(new)))
        .ok_or(ConsensusError::ArithmeticOverflow)?;

    i64::try_from(weighted / den).map_err(|_| ConsensusError::ArithmeticOverflow)
}

/// Moving average over the intervals of a chronological header window.
///
/// Only the last `ema_window` intervals are folded in. An interval shorter
/// than `min_block_interval` fails with `TimestampTooEarly`.
pub fn ema_interval(window: &[BlockHeader], params: &ConsensusParameters) -> Result<i64> {
    if window.is_empty() {
        return Err(ConsensusError::EmptyWindow);
    }

    let start = window.len().saturating_sub(params.ema_window.saturating_add(1));
    let mut ema = params.block_interval_target;
    for pair in window[start..].windows(2) {
        let (parent, child) = (&pair[0], &pair[1]);
        let min = parent
            .time
            .checked_add(params.min_block_interval)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
        if child.time < min {
            return Err(ConsensusError::TimestampTooEarly {
                time: child.time,
                min,
            });
        }
        let interval = child
            .time
            .checked_sub(parent.time)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
        ema = ema_step(ema, interval, params)?;
    }
    Ok(ema)
}

/// AdjustTarget: [0, MIN_DIFFICULTY] × ℤ → [0, MIN_DIFFICULTY]
///
/// Move `target` by `target / base * min(|ema - T|, T) / T` toward the
/// interval target `T`. A parent target above `MIN_DIFFICULTY` is
/// `DifficultyOutOfRange`. An upward step past `MIN_DIFFICULTY` is clamped
/// to it, so a slow block at the easiest difficulty never strands its tip.
pub fn adjust_target(target: U256, ema: i64, params: &ConsensusParameters) -> Result<U256> {
    if target > MIN_DIFFICULTY {
        return Err(ConsensusError::DifficultyOutOfRange);
    }
    let interval_target = params.block_interval_target;
    if interval_target <= 0 || params.adjustment_inverse_base == 0 {
        return Err(ConsensusError::InvalidParameters(
            "block_interval_target and adjustment_inverse_base must be positive".to_string(),
        ));
    }

    let deviation = (ema as i128 - interval_target as i128)
        .unsigned_abs()
        .min(interval_target as u128) as u64;
    if deviation == 0 {
        return Ok(target);
    }

    // step * deviation / T, split as quotient and remainder so the product
    // never leaves 256 bits: deviation <= T < 2^63.
    let step = target / U256::from(params.adjustment_inverse_base);
    let divisor = U256::from(interval_target as u64);
    let quotient = step / divisor;
    let remainder = step % divisor;
    let delta = quotient * U256::from(deviation) + remainder * U256::from(deviation) / divisor;

    if ema < interval_target {
        return target
            .checked_sub(delta)
            .ok_or(ConsensusError::DifficultyOutOfRange);
    }
    match target.checked_add(delta) {
        Some(adjusted) if adjusted <= MIN_DIFFICULTY => Ok(adjusted),
        _ => {
            warn!(ema, interval_target, "target clamped at minimum difficulty");
            Ok(MIN_DIFFICULTY)
        }
    }
}

/// NextDifficulty: 𝔻 × ℤ → 𝔻
pub fn next_difficulty(
    current: &Difficulty,
    ema: i64,
    params: &ConsensusParameters,
) -> Result<Difficulty> {
    let target = difficulty_to_int(current)?;
    let adjusted = adjust_target(target, ema, params)?;
    int_to_difficulty(adjusted)
}

/// Retarget: ℋ* → 𝔻
///
/// Difficulty required of the child of the newest header in `window`.
/// The window is ordered oldest first and should hold at least the last
/// `ema_window + 1` headers of the branch; earlier headers are ignored.
pub fn retarget(window: &[BlockHeader], params: &ConsensusParameters) -> Result<Difficulty> {
    let newest = window.last().ok_or(ConsensusError::EmptyWindow)?;
    let ema = ema_interval(window, params)?;
    let difficulty = next_difficulty(&newest.difficulty, ema, params)?;
    debug!(
        ema,
        interval_target = params.block_interval_target,
        current_len = newest.difficulty.len(),
        next_len = difficulty.len(),
        "retargeted difficulty"
    );
    Ok(difficulty)
}
