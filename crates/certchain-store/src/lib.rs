//! # Certchain Store
//!
//! The ledger store: sole owner of the sealed chain and the pending record
//! buffer, and the only mutation path into either.
//!
//! ## Overview
//!
//! State lives behind the [`Store`] trait so the ledger facade is
//! storage-agnostic. [`MemoryStore`] is the in-memory implementation; the
//! ledger keeps no state across restarts.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all ledger-state operations
//! - [`MemoryStore`] - `RwLock`-guarded chain and pending buffer
//! - [`StoreExt`] - Helpers built on the trait
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certchain_store::{MemoryStore, Store, StoreExt};
//! use certchain_core::Record;
//!
//! async fn example(record: Record) {
//!     let store = MemoryStore::new();
//!
//!     // Buffer a record; it will land in block 2
//!     let index = store.submit(record).await.unwrap();
//!     assert_eq!(index, 2);
//!
//!     // Seal with a proof found by the admission gate
//!     let (last_proof, hash) = store.latest_link().await.unwrap();
//!     # let proof = last_proof;
//!     let block = store.seal(proof, hash).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic seals**: buffer hand-over and block append happen under one lock
//! - **Ordering**: records keep submission order
//! - **No proof checks**: the caller validates proofs before sealing

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{Clock, MemoryStore};
pub use traits::{Store, StoreExt};
