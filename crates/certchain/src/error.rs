//! Error types for the Ledger.

use std::time::Duration;

use certchain_core::{ChainError, ValidationError};
use certchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Submitted record fields were missing or malformed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The sealed chain violates an invariant.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// The proof search exceeded the configured limit and was abandoned.
    #[error("proof search for last proof {last_proof} timed out after {timeout:?}")]
    ProofSearchTimeout { last_proof: u64, timeout: Duration },

    /// The blocking proof-search task did not complete.
    #[error("proof search failed: {0}")]
    ProofSearchFailed(String),

    /// The gate produced a proof that does not validate.
    #[error("proof {proof} is not valid for last proof {last_proof}")]
    InvalidProof { last_proof: u64, proof: u64 },
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
