//! Timestamp window for the next block

use serde::{Deserialize, Serialize};

use crate::error::{ConsensusError, Result};
use crate::params::ConsensusParameters;
use crate::types::*;

/// Minimum acceptable timestamp for the next block and the center point
/// the retargeting engine steers toward. Recomputed from the parent on
/// every accepted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub min: Timestamp,
    pub target: Timestamp,
}

impl Target {
    /// Target window for a child of `parent`:
    /// min = parent.time + min_block_interval,
    /// target = parent.time + block_interval_target
    pub fn after(parent: &BlockHeader, params: &ConsensusParameters) -> Result<Self> {
        let min = parent
            .time
            .checked_add(params.min_block_interval)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
        let target = parent
            .time
            .checked_add(params.block_interval_target)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
        Ok(Target { min, target })
    }

    /// Reject timestamps earlier than `min`
    pub fn check_time(&self, time: Timestamp) -> Result<()> {
        if time < self.min {
            return Err(ConsensusError::TimestampTooEarly {
                time,
                min: self.min,
            });
        }
        Ok(())
    }

    /// Signed distance of `time` from the center point
    pub fn displacement(&self, time: Timestamp) -> Result<i64> {
        time.checked_sub(self.target)
            .ok_or(ConsensusError::ArithmeticOverflow)
    }
}
