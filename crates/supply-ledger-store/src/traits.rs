//! ChainStore trait: the abstract interface for chain persistence.
//!
//! This trait keeps the ledger storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supply_ledger_core::{BlockRecord, HashFormat};

use crate::error::Result;

/// A chain as persisted: its block records and the hash format they were
/// written under.
///
/// The format travels with the records because a block hash can only be
/// recomputed under the format that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChain {
    pub hash_format: HashFormat,
    pub blocks: Vec<BlockRecord>,
}

/// Async interface for chain persistence.
///
/// Each key holds one whole chain. Saving replaces whatever the key held
/// before; there is no partial update.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Store `records`, hashed under `format`, under `key`, replacing any
    /// previous chain.
    async fn save_chain(&self, key: &str, format: HashFormat, records: &[BlockRecord])
        -> Result<()>;

    /// Load the chain stored under `key`, blocks in index order.
    ///
    /// Returns `None` if nothing is stored under the key.
    async fn load_chain(&self, key: &str) -> Result<Option<StoredChain>>;

    /// Remove the chain stored under `key`. Returns whether it existed.
    async fn delete_chain(&self, key: &str) -> Result<bool>;

    /// All keys holding a chain, sorted.
    async fn list_keys(&self) -> Result<Vec<String>>;
}
