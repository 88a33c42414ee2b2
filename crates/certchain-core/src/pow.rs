//! Admission gate: the proof-of-work puzzle that authorizes sealing a block.
//!
//! A proof `p` is valid relative to the previous block's proof `l` iff
//! `SHA-256(format!("{l}{p}"))`, rendered as lowercase hex, starts with
//! `difficulty` `'0'` characters.
//!
//! Digest algorithm, difficulty and genesis proof are consensus parameters.
//! Changing the difficulty is a hard cutover: proofs sealed under one value
//! do not validate under another, and there is no migration path.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::crypto::Sha256Hash;
use crate::error::CoreError;

/// Default number of leading zero hex characters.
pub const DEFAULT_DIFFICULTY: u8 = 4;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// How many candidates the cancellable search checks between flag polls.
const CANCEL_POLL_INTERVAL: u64 = 4096;

/// Required number of leading zero hex characters (1..=64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub fn new(zeros: u8) -> Result<Self, CoreError> {
        if zeros == 0 || zeros > 64 {
            return Err(CoreError::InvalidDifficulty(zeros));
        }
        Ok(Self(zeros))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = CoreError;

    fn try_from(zeros: u8) -> Result<Self, Self::Error> {
        Self::new(zeros)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

/// The proof-of-work gate. Stateless between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionGate {
    difficulty: Difficulty,
}

impl AdmissionGate {
    pub const fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Check whether `proof` is valid relative to `last_proof`.
    pub fn is_valid(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{}{}", last_proof, proof);
        let digest = Sha256Hash::hash(guess.as_bytes());
        digest.leading_zero_nibbles() >= u32::from(self.difficulty.get())
    }

    /// Find the smallest valid proof for `last_proof`.
    ///
    /// Scans candidates `0, 1, 2, ...` in order, so the result is
    /// reproducible. Unbounded: the caller owns any time limit.
    pub fn find_proof(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.is_valid(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    /// Like [`find_proof`](Self::find_proof), but gives up and returns `None`
    /// once `cancel` is raised. The flag is polled every few thousand
    /// candidates.
    pub fn find_proof_cancellable(&self, last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
        let mut proof = 0u64;
        loop {
            if proof % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            if self.is_valid(last_proof, proof) {
                return Some(proof);
            }
            proof += 1;
        }
    }
}
