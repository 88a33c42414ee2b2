//! Error types for Certchain Core.

use thiserror::Error;

use crate::types::BlockHash;

/// Core errors from encoding, decoding and parameter construction.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed block: {0}")]
    MalformedBlock(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("difficulty must be between 1 and 64 hex characters, got {0}")]
    InvalidDifficulty(u8),
}

/// Validation errors for submitted record fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("field must be a string: {0}")]
    NotText(&'static str),

    #[error("certificate_id must be a non-negative integer, got {0:?}")]
    InvalidCertificateId(String),

    #[error("expiration_date must be a YYYY-MM-DD date, got {0:?}")]
    InvalidExpirationDate(String),
}

/// Chain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain is empty")]
    Empty,

    #[error("invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("index gap: expected {expected}, got {got}")]
    IndexGap { expected: u64, got: u64 },

    #[error("broken link at block {index}: expected previous hash {expected}, got {got}")]
    BrokenLink {
        index: u64,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("invalid proof {proof} at block {index} (previous proof {last_proof})")]
    InvalidProof {
        index: u64,
        last_proof: u64,
        proof: u64,
    },
}
