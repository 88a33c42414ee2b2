//! The Ledger: the collaborator surface a transport layer calls into.
//!
//! The Ledger brings the store and the admission gate together: it validates
//! submissions, runs the proof search off the async runtime, and seals
//! blocks one at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use certchain_core::{
    validate_chain, AdmissionGate, Block, BlockHash, ChainSnapshot, Difficulty, NodeId, Record,
    RecordFields,
};
use certchain_store::Store;

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Leading zero hex characters a proof must produce. Consensus parameter.
    pub difficulty: Difficulty,
    /// Abandon a proof search after this long. `None` searches until found.
    pub proof_search_timeout: Option<Duration>,
    /// Re-read the tip after the search and seal onto it only if the proof
    /// still validates against its proof.
    pub verify_before_seal: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            proof_search_timeout: None,
            verify_before_seal: true,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_proof_search_timeout(mut self, timeout: Duration) -> Self {
        self.proof_search_timeout = Some(timeout);
        self
    }

    pub fn with_verify_before_seal(mut self, verify: bool) -> Self {
        self.verify_before_seal = verify;
        self
    }
}

/// Response of a successful seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlock {
    pub index: u64,
    pub records: Vec<Record>,
    pub proof: u64,
    pub previous_hash: BlockHash,
}

impl From<Block> for SealedBlock {
    fn from(block: Block) -> Self {
        Self {
            index: block.index,
            records: block.records,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Submitting certificate records
/// - Sealing the pending buffer behind a proof of work
/// - Reading and verifying the chain
///
/// At most one proof search and seal run at a time per ledger. Submissions
/// are never blocked by a running search.
pub struct Ledger<S: Store> {
    /// Identifier of this ledger instance.
    node_id: NodeId,
    /// The ledger state.
    store: Arc<S>,
    /// Proof-of-work gate built from the configured difficulty.
    gate: AdmissionGate,
    /// Configuration.
    config: LedgerConfig,
    /// Serializes find_proof/seal pairs.
    seal_guard: Mutex<()>,
}

impl<S: Store> Ledger<S> {
    /// Create a new ledger over `store`.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        let node_id = NodeId::random();
        info!(%node_id, difficulty = config.difficulty.get(), "ledger created");
        Self {
            node_id,
            store: Arc::new(store),
            gate: AdmissionGate::new(config.difficulty),
            config,
            seal_guard: Mutex::new(()),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and buffer a record.
    ///
    /// Returns the index of the block the record will be sealed into.
    pub async fn submit_record(&self, fields: RecordFields) -> Result<u64> {
        let record = Record::try_from(fields).map_err(|e| {
            warn!(error = %e, "record rejected");
            e
        })?;
        Ok(self.store.submit(record).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sealing
    // ─────────────────────────────────────────────────────────────────────────

    /// Find a proof for the latest block and seal the pending buffer.
    ///
    /// Records submitted while the search runs are included in this block.
    pub async fn trigger_seal(&self) -> Result<SealedBlock> {
        let _guard = self.seal_guard.lock().await;

        let latest = self.store.latest().await?;
        let last_proof = latest.proof;
        debug!(node_id = %self.node_id, index = latest.index, last_proof, "proof search started");

        let proof = self.search_proof(last_proof).await?;

        let parent = if self.config.verify_before_seal {
            self.checked_tip(proof).await?
        } else {
            latest
        };

        let previous_hash = parent.compute_hash();
        let block = self.store.seal(proof, previous_hash).await?;

        info!(node_id = %self.node_id, index = block.index, proof, "new block forged");
        Ok(block.into())
    }

    /// Re-read the tip after a search and check `proof` against it.
    ///
    /// The seal guard only orders seals issued through this ledger; a store
    /// shared with other writers can move its tip while the search runs.
    async fn checked_tip(&self, proof: u64) -> Result<Block> {
        let tip = self.store.latest().await?;
        if !self.gate.is_valid(tip.proof, proof) {
            warn!(index = tip.index, last_proof = tip.proof, proof, "proof stale against tip");
            return Err(LedgerError::InvalidProof {
                last_proof: tip.proof,
                proof,
            });
        }
        Ok(tip)
    }

    /// Run the gate's search on the blocking pool, honouring the timeout.
    async fn search_proof(&self, last_proof: u64) -> Result<u64> {
        let gate = self.gate;
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let task =
            tokio::task::spawn_blocking(move || gate.find_proof_cancellable(last_proof, &flag));

        let joined = match self.config.proof_search_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.store(true, Ordering::Relaxed);
                    warn!(last_proof, ?timeout, "proof search timed out");
                    return Err(LedgerError::ProofSearchTimeout {
                        last_proof,
                        timeout,
                    });
                }
            },
            None => task.await,
        };

        joined
            .map_err(|e| LedgerError::ProofSearchFailed(e.to_string()))?
            .ok_or_else(|| LedgerError::ProofSearchFailed("search cancelled".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Every sealed block plus the chain length.
    pub async fn get_chain(&self) -> Result<ChainSnapshot> {
        Ok(self.store.snapshot().await?)
    }

    /// The most recently sealed block.
    pub async fn latest_block(&self) -> Result<Block> {
        Ok(self.store.latest().await?)
    }

    /// Number of sealed blocks.
    pub async fn height(&self) -> Result<u64> {
        Ok(self.store.height().await?)
    }

    /// Records waiting for the next seal.
    pub async fn pending_records(&self) -> Result<Vec<Record>> {
        Ok(self.store.pending().await?)
    }

    /// Check linkage, index contiguity and proofs over the whole chain.
    pub async fn verify_chain(&self) -> Result<()> {
        let snapshot = self.store.snapshot().await?;
        validate_chain(&snapshot.chain, &self.gate)?;
        Ok(())
    }
}

impl<S: Store + 'static> Ledger<S> {
    /// Seal on a background task and hand back its result future.
    pub fn seal_in_background(self: &Arc<Self>) -> JoinHandle<Result<SealedBlock>> {
        let ledger = Arc::clone(self);
        tokio::spawn(async move { ledger.trigger_seal().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use certchain_core::{ChainError, ValidationError, GENESIS_PROOF};
    use certchain_store::{MemoryStore, StoreExt};

    /// A store shared with another writer, who seals a block with
    /// `intruder_proof` once this ledger's proof search has started.
    struct SharedStore {
        inner: MemoryStore,
        latest_calls: AtomicUsize,
        intruded: AtomicBool,
        intruder_proof: u64,
    }

    impl SharedStore {
        fn new(intruder_proof: u64) -> Self {
            Self {
                inner: MemoryStore::new(),
                latest_calls: AtomicUsize::new(0),
                intruded: AtomicBool::new(false),
                intruder_proof,
            }
        }

        async fn intrude_once(&self) -> certchain_store::Result<()> {
            if !self.intruded.swap(true, Ordering::SeqCst) {
                let (_, hash) = self.inner.latest_link().await?;
                self.inner.seal(self.intruder_proof, hash).await?;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Store for SharedStore {
        async fn submit(&self, record: Record) -> certchain_store::Result<u64> {
            self.inner.submit(record).await
        }

        async fn seal(
            &self,
            proof: u64,
            previous_hash: BlockHash,
        ) -> certchain_store::Result<Block> {
            self.intrude_once().await?;
            self.inner.seal(proof, previous_hash).await
        }

        async fn latest(&self) -> certchain_store::Result<Block> {
            // The first read starts the search; any later access sees the intruder's block.
            if self.latest_calls.fetch_add(1, Ordering::SeqCst) > 0 {
                self.intrude_once().await?;
            }
            self.inner.latest().await
        }

        async fn snapshot(&self) -> certchain_store::Result<ChainSnapshot> {
            self.inner.snapshot().await
        }

        async fn pending(&self) -> certchain_store::Result<Vec<Record>> {
            self.inner.pending().await
        }

        async fn height(&self) -> certchain_store::Result<u64> {
            self.inner.height().await
        }
    }

    fn alice_fields() -> RecordFields {
        RecordFields::new("A", "Alice Inc", "B", 1u64, "Cert1", "2030-01-01")
    }

    fn easy_config() -> LedgerConfig {
        LedgerConfig::default().with_difficulty(Difficulty::new(2).unwrap())
    }

    #[tokio::test]
    async fn test_config_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.difficulty.get(), 4);
        assert_eq!(config.proof_search_timeout, None);
        assert!(config.verify_before_seal);
    }

    #[tokio::test]
    async fn test_reference_scenario() {
        let ledger = Ledger::new(MemoryStore::new(), LedgerConfig::default());

        let index = ledger.submit_record(alice_fields()).await.unwrap();
        assert_eq!(index, 2);

        let genesis = ledger.latest_block().await.unwrap();
        let sealed = ledger.trigger_seal().await.unwrap();

        assert_eq!(sealed.index, 2);
        assert_eq!(
            sealed.records,
            vec![Record::try_from(alice_fields()).unwrap()]
        );
        assert_eq!(sealed.proof, 35293);
        assert!(ledger.gate().is_valid(GENESIS_PROOF, sealed.proof));
        assert_eq!(sealed.previous_hash, genesis.compute_hash());
        assert!(ledger.pending_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_record_is_not_buffered() {
        let ledger = Ledger::new(MemoryStore::new(), easy_config());
        let mut fields = alice_fields();
        fields.certificate_id = None;

        let result = ledger.submit_record(fields).await;
        assert!(matches!(
            result,
            Err(LedgerError::Validation(ValidationError::MissingField("certificate_id")))
        ));
        assert!(ledger.pending_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_empty_seals() {
        let ledger = Ledger::new(MemoryStore::new(), easy_config());
        let first = ledger.trigger_seal().await.unwrap();
        let second = ledger.trigger_seal().await.unwrap();

        assert!(first.records.is_empty());
        assert!(second.records.is_empty());
        assert!(second.index > first.index);
        ledger.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn test_proof_search_timeout() {
        let config = LedgerConfig::default()
            .with_difficulty(Difficulty::new(64).unwrap())
            .with_proof_search_timeout(Duration::from_millis(50));
        let ledger = Ledger::new(MemoryStore::new(), config);
        ledger.submit_record(alice_fields()).await.unwrap();

        let result = ledger.trigger_seal().await;
        assert!(matches!(
            result,
            Err(LedgerError::ProofSearchTimeout { last_proof: 100, .. })
        ));

        // Nothing was sealed and the buffer is untouched.
        assert_eq!(ledger.get_chain().await.unwrap().length, 1);
        assert_eq!(ledger.pending_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seal_in_background() {
        let ledger = Arc::new(Ledger::new(MemoryStore::new(), easy_config()));
        ledger.submit_record(alice_fields()).await.unwrap();

        let handle = ledger.seal_in_background();
        let sealed = handle.await.unwrap().unwrap();
        assert_eq!(sealed.index, 2);
        assert_eq!(sealed.records.len(), 1);
    }

    #[tokio::test]
    async fn test_sealed_block_json_uses_records() {
        let ledger = Ledger::new(MemoryStore::new(), easy_config());
        let sealed = ledger.trigger_seal().await.unwrap();
        let value = serde_json::to_value(&sealed).unwrap();

        assert!(value.get("records").is_some());
        assert!(value.get("transactions").is_none());
        assert_eq!(value["index"], 2);
    }

    #[tokio::test]
    async fn test_seal_rejects_proof_stale_against_moved_tip() {
        // 226 is the difficulty-2 proof after 100; it is not valid after 1.
        let ledger = Ledger::new(SharedStore::new(1), easy_config());
        ledger.submit_record(alice_fields()).await.unwrap();

        let result = ledger.trigger_seal().await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidProof {
                last_proof: 1,
                proof: 226
            })
        ));

        // Only the other writer's block landed.
        assert_eq!(ledger.height().await.unwrap(), 2);
        assert_eq!(ledger.latest_block().await.unwrap().proof, 1);
        ledger.verify_chain().await.unwrap_err();
    }

    #[tokio::test]
    async fn test_seal_without_verification_forks_on_moved_tip() {
        // 116270 is valid after 100, so the only fault is the stale link.
        let config = easy_config().with_verify_before_seal(false);
        let ledger = Ledger::new(SharedStore::new(116270), config);
        ledger.submit_record(alice_fields()).await.unwrap();

        let sealed = ledger.trigger_seal().await.unwrap();
        assert_eq!(sealed.index, 3);
        assert_eq!(sealed.proof, 226);

        assert!(matches!(
            ledger.verify_chain().await,
            Err(LedgerError::Chain(ChainError::BrokenLink { index: 3, .. }))
        ));
    }

    #[tokio::test]
    async fn test_seal_links_to_moved_tip_when_proof_still_holds() {
        // 116270 is valid after 100, and 226 is valid after 116270.
        let ledger = Ledger::new(SharedStore::new(116270), easy_config());

        let sealed = ledger.trigger_seal().await.unwrap();
        assert_eq!(sealed.index, 3);
        assert_eq!(sealed.proof, 226);
        ledger.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn test_height_tracks_seals() {
        let ledger = Ledger::new(MemoryStore::new(), easy_config());
        assert_eq!(ledger.height().await.unwrap(), 1);
        ledger.trigger_seal().await.unwrap();
        assert_eq!(ledger.height().await.unwrap(), 2);
    }
}
