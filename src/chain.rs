//! Chain-head bookkeeping: an arena of accepted blocks indexed by hash
//!
//! Parent and child links are hashes into the arena, so pruning a branch
//! never leaves a dangling reference. Every accepted block records the
//! `Target` window and `Difficulty` its children must satisfy.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cooldown::{CoolDownLedger, StakeLock};
use crate::error::{ConsensusError, Result};
use crate::header::header_hash;
use crate::params::ConsensusParameters;
use crate::pow::{minimal_stake, validate_stake};
use crate::retarget::retarget;
use crate::target::Target;
use crate::types::*;

/// Requirements for the child of an accepted block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextBlock {
    pub target: Target,
    pub difficulty: Difficulty,
}

/// An accepted block and its position in the arena
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub hash: Hash,
    pub block: Block,
    pub parent: Option<Hash>,
    pub children: Vec<Hash>,
    pub height: u64,
    pub next: NextBlock,
}

/// A block that passed every check, with everything `commit` needs
struct Candidate {
    hash: Hash,
    height: u64,
    next: NextBlock,
    lock: StakeLock,
}

impl BlockNode {
    pub fn header(&self) -> &BlockHeader {
        &self.block.header
    }

    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }
}

/// Block tree rooted at genesis with the best tip and stake locks
#[derive(Debug)]
pub struct Chain {
    params: ConsensusParameters,
    genesis: Hash,
    best: Hash,
    nodes: HashMap<Hash, BlockNode>,
    cool_down: CoolDownLedger,
}

impl Chain {
    /// Start a chain from a trusted genesis block. Its proof is not checked.
    pub fn new(params: ConsensusParameters, genesis: Block) -> Result<Self> {
        params.validate()?;

        let hash = header_hash(&genesis.header)?;
        let next = NextBlock {
            target: Target::after(&genesis.header, &params)?,
            difficulty: retarget(std::slice::from_ref(&genesis.header), &params)?,
        };
        let node = BlockNode {
            hash,
            block: genesis,
            parent: None,
            children: Vec::new(),
            height: 0,
            next,
        };

        let mut nodes = HashMap::new();
        nodes.insert(hash, node);
        Ok(Chain {
            params,
            genesis: hash,
            best: hash,
            nodes,
            cool_down: CoolDownLedger::new(),
        })
    }

    pub fn params(&self) -> &ConsensusParameters {
        &self.params
    }

    pub fn genesis(&self) -> &BlockNode {
        &self.nodes[&self.genesis]
    }

    /// Highest accepted block; ties keep the block accepted first
    pub fn best_tip(&self) -> &BlockNode {
        &self.nodes[&self.best]
    }

    pub fn get(&self, hash: &Hash) -> Option<&BlockNode> {
        self.nodes.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hashes of all blocks without children
    pub fn tips(&self) -> Vec<Hash> {
        let mut tips: Vec<&BlockNode> = self.nodes.values().filter(|n| n.is_tip()).collect();
        tips.sort_by(|a, b| b.height.cmp(&a.height).then(a.hash.cmp(&b.hash)));
        tips.into_iter().map(|n| n.hash).collect()
    }

    /// Requirements for a child of `parent`
    pub fn next_block(&self, parent: &Hash) -> Option<&NextBlock> {
        self.nodes.get(parent).map(|n| &n.next)
    }

    /// Up to `len` headers ending at `hash`, oldest first
    pub fn window(&self, hash: &Hash, len: usize) -> Vec<BlockHeader> {
        let mut headers = Vec::with_capacity(len);
        let mut cursor = self.nodes.get(hash);
        while let Some(node) = cursor {
            if headers.len() == len {
                break;
            }
            headers.push(node.block.header.clone());
            cursor = node.parent.as_ref().and_then(|p| self.nodes.get(p));
        }
        headers.reverse();
        headers
    }

    /// Stake of `address` still locked at `now`
    pub fn locked_stake(&self, address: &Address, now: Timestamp) -> u64 {
        self.cool_down.locked_stake(address, now)
    }

    /// Forget stake locks that have expired at `now`
    pub fn release_expired(&mut self, now: Timestamp) -> usize {
        self.cool_down.release_expired(now)
    }

    /// Validate `block` against its parent and, if it passes, add it to
    /// the arena. Validation and commit happen under the same `&mut self`,
    /// so chain-head state advances exactly once per accepted block.
    #[tracing::instrument(skip(self, block), fields(time = block.header.time, stake = block.header.stake))]
    pub fn accept_block(&mut self, block: Block) -> Result<Hash> {
        match self.prepare(&block) {
            Ok(candidate) => Ok(self.commit(candidate, block)),
            Err(err) => {
                warn!(error = %err, "rejected block");
                Err(err)
            }
        }
    }

    /// All checks for a candidate; does not touch the arena
    fn prepare(&self, block: &Block) -> Result<Candidate> {
        let header = &block.header;
        let hash = header_hash(header)?;
        if self.nodes.contains_key(&hash) {
            return Err(ConsensusError::DuplicateBlock);
        }
        let parent = self
            .nodes
            .get(&header.parent)
            .ok_or(ConsensusError::UnknownParent)?;

        parent.next.target.check_time(header.time)?;
        if header.difficulty != parent.next.difficulty {
            return Err(ConsensusError::UnexpectedDifficulty);
        }
        if !validate_stake(header)? {
            return Err(ConsensusError::InsufficientStake {
                stake: header.stake,
                required: minimal_stake(header)?,
            });
        }

        let mut window = self.window(&parent.hash, self.params.ema_window);
        window.push(header.clone());
        let next = NextBlock {
            target: Target::after(header, &self.params)?,
            difficulty: retarget(&window, &self.params)?,
        };
        let lock = StakeLock::for_block(hash, header, self.params.stake_cool_down)?;

        Ok(Candidate {
            hash,
            height: parent.height + 1,
            next,
            lock,
        })
    }

    fn commit(&mut self, candidate: Candidate, block: Block) -> Hash {
        let Candidate {
            hash,
            height,
            next,
            lock,
        } = candidate;
        let parent_hash = block.header.parent;
        if let Some(parent) = self.nodes.get_mut(&parent_hash) {
            parent.children.push(hash);
        }

        info!(
            height,
            difficulty_len = next.difficulty.len(),
            locked = lock.amount,
            "accepted block"
        );
        self.cool_down.insert(block.header.coinbase, lock);
        self.nodes.insert(
            hash,
            BlockNode {
                hash,
                block,
                parent: Some(parent_hash),
                children: Vec::new(),
                height,
                next,
            },
        );

        if height > self.best_tip().height {
            self.best = hash;
        }
        hash
    }

    /// Whether `hash` is on the branch from genesis to the best tip
    pub fn is_on_best_chain(&self, hash: &Hash) -> bool {
        let Some(node) = self.nodes.get(hash) else {
            return false;
        };
        let mut cursor = Some(self.best_tip());
        while let Some(current) = cursor {
            if current.height == node.height {
                return current.hash == *hash;
            }
            if current.height < node.height {
                return false;
            }
            cursor = current.parent.as_ref().and_then(|p| self.nodes.get(p));
        }
        false
    }

    /// Remove side branches whose tip is below `min_height`. Blocks shared
    /// with a surviving branch stay. Returns the removed hashes.
    pub fn prune_below(&mut self, min_height: u64) -> Vec<Hash> {
        let stale: Vec<Hash> = self
            .nodes
            .values()
            .filter(|n| n.is_tip() && n.height < min_height && !self.is_on_best_chain(&n.hash))
            .map(|n| n.hash)
            .collect();

        let mut removed = Vec::new();
        for tip in stale {
            let mut cursor = Some(tip);
            while let Some(hash) = cursor {
                let removable = self
                    .nodes
                    .get(&hash)
                    .map(|n| n.is_tip() && n.parent.is_some())
                    .unwrap_or(false);
                if !removable {
                    break;
                }
                let Some(node) = self.nodes.remove(&hash) else {
                    break;
                };
                self.cool_down.unlock_block(&node.block.header.coinbase, &hash);
                if let Some(parent_hash) = node.parent {
                    if let Some(parent) = self.nodes.get_mut(&parent_hash) {
                        parent.children.retain(|c| c != &hash);
                    }
                }
                removed.push(hash);
                cursor = node.parent;
            }
        }
        removed
    }
}

/// A `Chain` behind a lock, for callers that validate on several threads
/// but must advance the head one block at a time.
#[derive(Debug, Clone)]
pub struct SharedChain {
    inner: Arc<Mutex<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        SharedChain {
            inner: Arc::new(Mutex::new(chain)),
        }
    }

    /// Read current state, validate and commit as one unit
    pub fn accept_block(&self, block: Block) -> Result<Hash> {
        self.inner.lock().accept_block(block)
    }

    pub fn best_tip(&self) -> (Hash, u64, NextBlock) {
        let chain = self.inner.lock();
        let tip = chain.best_tip();
        (tip.hash, tip.height, tip.next.clone())
    }

    /// Run `f` against a consistent view of the chain
    pub fn with<R>(&self, f: impl FnOnce(&Chain) -> R) -> R {
        f(&self.inner.lock())
    }
}
