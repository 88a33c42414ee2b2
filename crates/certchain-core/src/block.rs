//! Block: a sealed, immutable batch of records.
//!
//! Blocks are linked by `previous_hash` and gated by `proof`. The genesis
//! block has no predecessor and carries [`BlockHash::GENESIS`] instead.

use serde::{Deserialize, Serialize};

use crate::canonical::hash_block;
use crate::record::Record;
use crate::types::BlockHash;

/// Index of the genesis block.
pub const GENESIS_INDEX: u64 = 1;

/// A sealed block in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (1-indexed).
    pub index: u64,
    /// Wall-clock time of sealing (Unix milliseconds).
    pub timestamp: i64,
    /// Records in submission order. May be empty.
    pub records: Vec<Record>,
    /// Proof of work relative to the previous block's proof.
    pub proof: u64,
    /// Hash of the preceding block, or the genesis sentinel.
    pub previous_hash: BlockHash,
}

impl Block {
    /// Create the genesis block.
    pub fn genesis(timestamp: i64, proof: u64) -> Self {
        Self {
            index: GENESIS_INDEX,
            timestamp,
            records: Vec::new(),
            proof,
            previous_hash: BlockHash::GENESIS,
        }
    }

    /// Compute the content hash of this block.
    pub fn compute_hash(&self) -> BlockHash {
        hash_block(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX
    }

    /// Check that `self` directly follows `parent`.
    pub fn follows(&self, parent: &Block) -> bool {
        self.index == parent.index + 1 && self.previous_hash == parent.compute_hash()
    }
}

/// A consistent point-in-time copy of the sealed chain.
///
/// `length` is always `chain.len()`; a deserialized `length` is ignored and
/// recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawChainSnapshot")]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Deserialize)]
struct RawChainSnapshot {
    chain: Vec<Block>,
}

impl From<RawChainSnapshot> for ChainSnapshot {
    fn from(raw: RawChainSnapshot) -> Self {
        Self::new(raw.chain)
    }
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }

    pub fn latest(&self) -> Option<&Block> {
        self.chain.last()
    }
}
