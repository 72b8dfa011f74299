//! Stake cool-down ledger
//!
//! Stake used to mine a block stays locked until `time + stake_cool_down`.
//! Only the lock arithmetic lives here; whether the coinbase account can
//! afford the stake is checked by the execution layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConsensusError, Result};
use crate::types::*;

/// Stake locked by one accepted block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLock {
    pub block: Hash,
    pub amount: u64,
    pub unlock_time: Timestamp,
}

impl StakeLock {
    /// Lock of `header.stake` until `header.time + cool_down`
    pub fn for_block(block: Hash, header: &BlockHeader, cool_down: i64) -> Result<Self> {
        let unlock_time = header
            .time
            .checked_add(cool_down)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
        Ok(Self {
            block,
            amount: header.stake,
            unlock_time,
        })
    }
}

/// Outstanding stake locks per coinbase address
#[derive(Debug, Clone, Default)]
pub struct CoolDownLedger {
    locks: HashMap<Address, Vec<StakeLock>>,
}

impl CoolDownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `header.stake` for `header.coinbase` until `header.time + cool_down`
    pub fn lock(&mut self, block: Hash, header: &BlockHeader, cool_down: i64) -> Result<StakeLock> {
        let lock = StakeLock::for_block(block, header, cool_down)?;
        self.insert(header.coinbase, lock.clone());
        Ok(lock)
    }

    /// Record a lock computed ahead of time
    pub fn insert(&mut self, coinbase: Address, lock: StakeLock) {
        self.locks.entry(coinbase).or_default().push(lock);
    }

    /// Drop the lock recorded for `block`, if any
    pub fn unlock_block(&mut self, coinbase: &Address, block: &Hash) {
        if let Some(locks) = self.locks.get_mut(coinbase) {
            locks.retain(|lock| &lock.block != block);
            if locks.is_empty() {
                self.locks.remove(coinbase);
            }
        }
    }

    /// Total stake of `address` still locked at `now`
    pub fn locked_stake(&self, address: &Address, now: Timestamp) -> u64 {
        self.locks
            .get(address)
            .map(|locks| {
                locks
                    .iter()
                    .filter(|lock| lock.unlock_time > now)
                    .fold(0u64, |total, lock| total.saturating_add(lock.amount))
            })
            .unwrap_or(0)
    }

    /// Forget every lock that has expired at `now`; returns how many were dropped
    pub fn release_expired(&mut self, now: Timestamp) -> usize {
        let mut released = 0;
        self.locks.retain(|_, locks| {
            let before = locks.len();
            locks.retain(|lock| lock.unlock_time > now);
            released += before - locks.len();
            !locks.is_empty()
        });
        released
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
