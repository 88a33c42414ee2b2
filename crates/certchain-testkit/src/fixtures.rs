//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::NaiveDate;

use certchain::{Ledger, LedgerConfig};
use certchain_core::{Block, Difficulty, Record, RecordFields, GENESIS_PROOF};
use certchain_store::MemoryStore;

/// Fixed genesis timestamp used by reproducible fixtures (2025-01-14T16:00:00Z).
pub const FIXED_GENESIS_TIMESTAMP: i64 = 1736870400000;

/// Block timestamps for reproducible fixtures: always one minute after genesis.
pub fn fixed_clock() -> i64 {
    FIXED_GENESIS_TIMESTAMP + 60_000
}

/// A ledger over an in-memory store with a low difficulty so tests seal fast.
pub struct TestFixture {
    pub ledger: Ledger<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture at difficulty 2.
    pub fn new() -> Self {
        Self::with_difficulty(2)
    }

    /// Create a fixture at the given difficulty.
    ///
    /// # Panics
    /// If `zeros` is outside `1..=64`.
    pub fn with_difficulty(zeros: u8) -> Self {
        let difficulty = Difficulty::new(zeros).expect("fixture difficulty must be 1..=64");
        Self {
            ledger: Ledger::new(
                MemoryStore::new(),
                LedgerConfig::default().with_difficulty(difficulty),
            ),
        }
    }

    /// Create a fixture whose genesis and block timestamps are fixed, so
    /// block hashes are reproducible.
    pub fn reproducible(zeros: u8) -> Self {
        let difficulty = Difficulty::new(zeros).expect("fixture difficulty must be 1..=64");
        let store = MemoryStore::from_genesis(
            Block::genesis(FIXED_GENESIS_TIMESTAMP, GENESIS_PROOF),
            fixed_clock,
        );
        Self {
            ledger: Ledger::new(store, LedgerConfig::default().with_difficulty(difficulty)),
        }
    }

    /// Submit `count` sample records and return their certificate ids.
    pub async fn submit_samples(&self, count: u64) -> Vec<u64> {
        let mut ids = Vec::with_capacity(count as usize);
        for id in 1..=count {
            self.ledger
                .submit_record(sample_fields(id))
                .await
                .expect("sample fields are valid");
            ids.push(id);
        }
        ids
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The reference submission: `{A, Alice Inc, B, 1, Cert1, 2030-01-01}`.
pub fn alice_fields() -> RecordFields {
    RecordFields::new("A", "Alice Inc", "B", 1u64, "Cert1", "2030-01-01")
}

/// The reference submission as a typed record.
pub fn alice_record() -> Record {
    Record::new(
        "A",
        "Alice Inc",
        "B",
        1,
        "Cert1",
        NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date"),
    )
}

/// Valid record fields with a distinct certificate id and recipient.
pub fn sample_fields(certificate_id: u64) -> RecordFields {
    RecordFields::new(
        "did:cert:acme",
        "Acme Certification",
        format!("did:holder:{}", certificate_id),
        certificate_id,
        format!("Certificate {}", certificate_id),
        "2030-12-31",
    )
}
