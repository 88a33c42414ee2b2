//! # Certchain
//!
//! An append-only, tamper-evident ledger of certificate issuances.
//!
//! ## Overview
//!
//! Certchain provides:
//!
//! - **Records**: Certificate issuances submitted into a pending buffer
//! - **Blocks**: Batches of records sealed behind a proof of work and linked
//!   by the hash of their predecessor
//! - **Verification**: Full-chain checks of linkage, indices and proofs
//!
//! Transports (HTTP, JSON parsing, process bootstrap) are not part of this
//! crate. They hold a [`Ledger`] and serialize what it returns.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certchain::{Ledger, LedgerConfig, RecordFields};
//! use certchain::store::MemoryStore;
//!
//! async fn example() {
//!     let ledger = Ledger::new(MemoryStore::new(), LedgerConfig::default());
//!
//!     // Submit a record; it lands in block 2
//!     let fields = RecordFields::new("A", "Alice Inc", "B", 1u64, "Cert1", "2030-01-01");
//!     let index = ledger.submit_record(fields).await.unwrap();
//!
//!     // Seal the pending buffer
//!     let sealed = ledger.trigger_seal().await.unwrap();
//!     assert_eq!(sealed.index, index);
//!
//!     // Read the full chain
//!     let chain = ledger.get_chain().await.unwrap();
//!     assert_eq!(chain.length, 2);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `certchain::core` - Core primitives (Record, Block, AdmissionGate, etc.)
//! - `certchain::store` - Ledger store abstraction and in-memory store

pub mod error;
pub mod ledger;

pub use certchain_core as core;
pub use certchain_store as store;

pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerConfig, SealedBlock};

pub use certchain_core::{
    AdmissionGate, Block, BlockHash, ChainSnapshot, Difficulty, NodeId, Record, RecordFields,
};
