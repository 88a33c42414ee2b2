//! # Certchain Testkit
//!
//! Testing utilities for Certchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned proofs, canonical bytes and block hashes
//! - **Generators**: Proptest strategies for records and blocks
//! - **Fixtures**: Ready-made ledgers and sample submissions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use certchain_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use certchain_testkit::generators::block;
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(b in block()) {
//!         prop_assert_eq!(b.compute_hash(), b.clone().compute_hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use certchain_testkit::fixtures::{alice_fields, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     fixture.ledger.submit_record(alice_fields()).await.unwrap();
//!     let sealed = fixture.ledger.trigger_seal().await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{alice_fields, alice_record, sample_fields, TestFixture};
pub use generators::{block, record, record_fields};
pub use vectors::{all_vectors, proof_vectors, verify_all_vectors, GoldenVector, ProofVector};
