//! Error types for the store module.

use certchain_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The chain has no genesis block. Indicates a construction bug.
    #[error("chain is empty: no genesis block")]
    EmptyChain,

    /// Record rejected at submission; it was not buffered.
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// A thread panicked while holding the ledger lock.
    #[error("ledger lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
