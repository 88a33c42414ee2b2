//! # Certchain Core
//!
//! Pure primitives for Certchain: records, blocks, canonical hashing and the
//! proof-of-work admission gate.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over the ledger's data structures.
//!
//! ## Key Types
//!
//! - [`Record`] - A certificate issuance
//! - [`RecordFields`] - Untyped submission form, validated into a [`Record`]
//! - [`Block`] - A sealed batch of records with proof and linkage
//! - [`BlockHash`] - SHA-256 of a block's canonical encoding
//! - [`AdmissionGate`] - Finds and checks proofs of work
//!
//! ## Canonicalization
//!
//! Blocks are hashed over deterministic CBOR. See [`canonical`] module.
//!
//! ## Consensus parameters
//!
//! SHA-256, [`DEFAULT_DIFFICULTY`] leading zero hex characters,
//! [`GENESIS_PROOF`] and the [`BlockHash::GENESIS`] sentinel.

pub mod block;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod pow;
pub mod record;
pub mod types;
pub mod validation;

pub use block::{Block, ChainSnapshot, GENESIS_INDEX};
pub use canonical::{canonical_block_bytes, canonical_record_bytes, decode_block, hash_block};
pub use crypto::Sha256Hash;
pub use error::{ChainError, CoreError, ValidationError};
pub use pow::{AdmissionGate, Difficulty, DEFAULT_DIFFICULTY, GENESIS_PROOF};
pub use record::{CertificateIdField, Record, RecordFields, TextField};
pub use types::{BlockHash, NodeId};
pub use validation::{validate_chain, validate_record};
