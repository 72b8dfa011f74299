//! Consensus parameters supplied once at chain genesis

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::{ConsensusError, Result};

/// Chain-epoch consensus parameters. Immutable once the chain starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsensusParameters {
    /// Minimum seconds between a block and its parent
    pub min_block_interval: i64,
    /// Interval the retargeting engine steers toward, in seconds
    pub block_interval_target: i64,
    /// Number of parent intervals folded into the moving average
    pub ema_window: usize,
    /// Smoothing weight given to the newest interval: numerator / denominator
    pub ema_numerator: u64,
    pub ema_denominator: u64,
    /// Maximum per-block target swing is `target / adjustment_inverse_base`
    pub adjustment_inverse_base: u64,
    /// Seconds staked funds stay locked after mining a block
    pub stake_cool_down: i64,
}

impl Default for ConsensusParameters {
    fn default() -> Self {
        Self {
            min_block_interval: DEFAULT_MIN_BLOCK_INTERVAL,
            block_interval_target: DEFAULT_BLOCK_INTERVAL_TARGET,
            ema_window: DEFAULT_EMA_WINDOW,
            ema_numerator: DEFAULT_EMA_NUMERATOR,
            ema_denominator: DEFAULT_EMA_DENOMINATOR,
            adjustment_inverse_base: DEFAULT_ADJUSTMENT_INVERSE_BASE,
            stake_cool_down: DEFAULT_STAKE_COOL_DOWN,
        }
    }
}

impl ConsensusParameters {
    /// Reject parameter sets the retargeting engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.min_block_interval < 0 {
            return Err(invalid("min_block_interval must not be negative"));
        }
        if self.block_interval_target <= 0 {
            return Err(invalid("block_interval_target must be positive"));
        }
        if self.block_interval_target < self.min_block_interval {
            return Err(invalid("block_interval_target is below min_block_interval"));
        }
        if self.ema_window == 0 {
            return Err(invalid("ema_window must be at least 1"));
        }
        if self.ema_denominator == 0 {
            return Err(invalid("ema_denominator must be positive"));
        }
        if self.ema_numerator == 0 || self.ema_numerator > self.ema_denominator {
            return Err(invalid("ema_numerator must be in 1..=ema_denominator"));
        }
        if self.adjustment_inverse_base == 0 {
            return Err(invalid("adjustment_inverse_base must be positive"));
        }
        if self.stake_cool_down < 0 {
            return Err(invalid("stake_cool_down must not be negative"));
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| ConsensusError::InvalidParameters(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading consensus parameters from {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("parsing consensus parameters from {}", path.display()))
    }
}

fn invalid(reason: &str) -> ConsensusError {
    ConsensusError::InvalidParameters(reason.to_string())
}
