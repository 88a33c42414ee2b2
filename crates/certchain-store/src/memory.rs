//! In-memory implementation of the Store trait.
//!
//! Chain and pending buffer live behind one `RwLock`, so a seal is a single
//! write-locked step and readers always see either the state before it or
//! the state after it. Nothing survives the process.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use certchain_core::{validate_record, Block, BlockHash, ChainSnapshot, Record, GENESIS_PROOF};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// Source of block timestamps (Unix milliseconds).
pub type Clock = fn() -> i64;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
    clock: Clock,
}

struct MemoryStoreInner {
    /// Sealed blocks, genesis first. Never empty after construction.
    chain: Vec<Block>,

    /// Records waiting for the next seal, in submission order.
    pending: Vec<Record>,
}

impl MemoryStore {
    /// Create a store holding a fresh genesis block with the reference proof.
    pub fn new() -> Self {
        Self::with_genesis_proof(GENESIS_PROOF)
    }

    /// Create a store whose genesis block carries `proof`.
    pub fn with_genesis_proof(proof: u64) -> Self {
        Self::from_genesis(Block::genesis(now_millis(), proof), now_millis)
    }

    /// Create a store from an explicit genesis block and timestamp source.
    ///
    /// Useful for reproducible chains in tests and golden vectors.
    pub fn from_genesis(genesis: Block, clock: Clock) -> Self {
        info!(
            proof = genesis.proof,
            hash = %genesis.compute_hash(),
            "ledger store created"
        );
        Self {
            inner: RwLock::new(MemoryStoreInner {
                chain: vec![genesis],
                pending: Vec::new(),
            }),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn submit(&self, record: Record) -> Result<u64> {
        validate_record(&record)?;

        let mut inner = self.write()?;
        let block_index = inner.chain.len() as u64 + 1;

        debug!(
            certifier = %record.certifier,
            certificate_id = record.certificate_id,
            block_index,
            "record buffered"
        );
        inner.pending.push(record);

        Ok(block_index)
    }

    async fn seal(&self, proof: u64, previous_hash: BlockHash) -> Result<Block> {
        let mut inner = self.write()?;

        let block = Block {
            index: inner.chain.len() as u64 + 1,
            timestamp: (self.clock)(),
            records: std::mem::take(&mut inner.pending),
            proof,
            previous_hash,
        };
        inner.chain.push(block.clone());

        info!(
            index = block.index,
            records = block.records.len(),
            proof,
            "block sealed"
        );

        Ok(block)
    }

    async fn latest(&self) -> Result<Block> {
        let inner = self.read()?;
        inner.chain.last().cloned().ok_or(StoreError::EmptyChain)
    }

    async fn snapshot(&self) -> Result<ChainSnapshot> {
        let inner = self.read()?;
        Ok(ChainSnapshot::new(inner.chain.clone()))
    }

    async fn pending(&self) -> Result<Vec<Record>> {
        let inner = self.read()?;
        Ok(inner.pending.clone())
    }

    async fn height(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.chain.len() as u64)
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::{AdmissionGate, ValidationError};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::sync::Arc;

    use crate::traits::StoreExt;

    fn make_test_record(id: u64) -> Record {
        Record::new(
            "A",
            "Alice Inc",
            "B",
            id,
            format!("Cert{}", id),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
    }

    fn fixed_clock() -> i64 {
        1736870400000
    }

    #[tokio::test]
    async fn test_genesis_invariant() {
        let store = MemoryStore::new();

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.index, 1);
        assert_eq!(latest.proof, GENESIS_PROOF);
        assert_eq!(latest.previous_hash, BlockHash::GENESIS);
        assert!(latest.records.is_empty());

        assert_eq!(store.height().await.unwrap(), 1);
        assert!(store.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_returns_next_index() {
        let store = MemoryStore::new();
        assert_eq!(store.submit(make_test_record(1)).await.unwrap(), 2);
        assert_eq!(store.submit(make_test_record(2)).await.unwrap(), 2);

        store.seal(35293, BlockHash::GENESIS).await.unwrap();
        assert_eq!(store.submit(make_test_record(3)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_record() {
        let store = MemoryStore::new();
        let mut record = make_test_record(1);
        record.recipient = "  ".into();

        let result = store.submit(record).await;
        assert!(matches!(
            result,
            Err(StoreError::Validation(ValidationError::EmptyField("recipient")))
        ));
        assert!(store.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seal_moves_pending_in_order() {
        let store = MemoryStore::from_genesis(Block::genesis(fixed_clock(), 100), fixed_clock);
        for id in 1..=3 {
            store.submit(make_test_record(id)).await.unwrap();
        }

        let (_, hash) = store.latest_link().await.unwrap();
        let block = store.seal(35293, hash).await.unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.timestamp, fixed_clock());
        let ids: Vec<u64> = block.records.iter().map(|r| r.certificate_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(store.pending().await.unwrap().is_empty());
        assert_eq!(store.latest().await.unwrap(), block);
    }

    #[tokio::test]
    async fn test_seal_does_not_check_proof() {
        let store = MemoryStore::new();
        let (last_proof, hash) = store.latest_link().await.unwrap();
        let block = store.seal(1, hash).await.unwrap();

        assert!(!AdmissionGate::default().is_valid(last_proof, block.proof));
        assert_eq!(store.height().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_seals_increase_index() {
        let store = MemoryStore::new();
        let first = store.seal(1, BlockHash::GENESIS).await.unwrap();
        let second = store.seal(2, first.compute_hash()).await.unwrap();

        assert!(first.records.is_empty());
        assert!(second.records.is_empty());
        assert_eq!((first.index, second.index), (2, 3));
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let store = MemoryStore::new();
        let before = store.snapshot().await.unwrap();
        store.seal(1, BlockHash::GENESIS).await.unwrap();
        let after = store.snapshot().await.unwrap();

        assert_eq!(before.length, 1);
        assert_eq!(after.length, 2);
        assert_eq!(after.chain[0], before.chain[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submit_and_seal_lose_nothing() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for worker in 0..4u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..50u64 {
                    store.submit(make_test_record(worker * 1000 + i)).await.unwrap();
                    if i % 10 == 0 {
                        let (_, hash) = store.latest_link().await.unwrap();
                        store.seal(0, hash).await.unwrap();
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.snapshot().await.unwrap();
        let mut seen: Vec<u64> = snapshot
            .chain
            .iter()
            .flat_map(|b| b.records.iter().map(|r| r.certificate_id))
            .chain(store.pending().await.unwrap().iter().map(|r| r.certificate_id))
            .collect();
        seen.sort_unstable();

        let mut expected: Vec<u64> = (0..4u64)
            .flat_map(|w| (0..50u64).map(move |i| w * 1000 + i))
            .collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);

        let indices: Vec<u64> = snapshot.chain.iter().map(|b| b.index).collect();
        let contiguous: Vec<u64> = (1..=snapshot.length as u64).collect();
        assert_eq!(indices, contiguous);
    }

    proptest! {
        #[test]
        fn test_seal_preserves_submission_order(
            ids in prop::collection::vec(any::<u64>(), 0..40),
            split in any::<prop::sample::Index>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (sealed, pending) = runtime.block_on(async {
                let store = MemoryStore::new();
                let cut = split.index(ids.len() + 1);

                for &id in &ids[..cut] {
                    store.submit(make_test_record(id)).await.unwrap();
                }
                let (_, hash) = store.latest_link().await.unwrap();
                let block = store.seal(0, hash).await.unwrap();
                for &id in &ids[cut..] {
                    store.submit(make_test_record(id)).await.unwrap();
                }

                let pending = store.pending().await.unwrap();
                (block.records, pending)
            });

            let sealed_ids: Vec<u64> = sealed.iter().map(|r| r.certificate_id).collect();
            let pending_ids: Vec<u64> = pending.iter().map(|r| r.certificate_id).collect();
            let cut = sealed_ids.len();
            prop_assert_eq!(&sealed_ids[..], &ids[..cut]);
            prop_assert_eq!(&pending_ids[..], &ids[cut..]);
        }
    }
}
