//! Store trait: the abstract interface for ledger state.
//!
//! This trait keeps the ledger facade storage-agnostic. The in-memory store is
//! the only implementation; a durable backend would sit behind the same seam.

use async_trait::async_trait;
use certchain_core::{Block, BlockHash, ChainSnapshot, Record};

use crate::error::Result;

/// The Store trait: sole owner and sole mutator of the chain and the pending
/// record buffer.
///
/// # Design Notes
///
/// - **Atomic seal**: `seal` takes the buffer, builds the block and appends it
///   as one indivisible step. No reader observes a half-completed seal.
/// - **No proof checks**: `seal` trusts its caller to have run the admission
///   gate first.
/// - **Ordering**: records keep their submission order inside a block.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a record to the pending buffer.
    ///
    /// # Returns
    /// The index of the block that will hold the record (chain length + 1).
    ///
    /// # Errors
    /// `Validation` if a text field is empty; the record is not buffered.
    async fn submit(&self, record: Record) -> Result<u64>;

    /// Seal the pending buffer into a new block and append it.
    ///
    /// The buffer is empty afterwards. Returns the new block.
    async fn seal(&self, proof: u64, previous_hash: BlockHash) -> Result<Block>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The most recently sealed block.
    async fn latest(&self) -> Result<Block>;

    /// A consistent copy of every sealed block.
    async fn snapshot(&self) -> Result<ChainSnapshot>;

    /// A copy of the pending buffer, in submission order.
    async fn pending(&self) -> Result<Vec<Record>>;

    /// Number of sealed blocks (the index of the latest block).
    async fn height(&self) -> Result<u64>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// The proof and hash of the latest block: everything needed to seal
    /// the next one.
    fn latest_link(&self) -> impl std::future::Future<Output = Result<(u64, BlockHash)>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn latest_link(&self) -> Result<(u64, BlockHash)> {
        let latest = self.latest().await?;
        Ok((latest.proof, latest.compute_hash()))
    }
}
