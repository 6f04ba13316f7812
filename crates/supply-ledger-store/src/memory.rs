//! In-memory implementation of the ChainStore trait.
//!
//! Chains are held as JSON text: a [`StoredChain`] envelope carrying the
//! hash format next to the records. A bare array of records, the shape
//! the browser ledger keeps in local storage, is also accepted and read
//! as [`HashFormat::Legacy`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supply_ledger_core::{BlockRecord, HashFormat};

use crate::error::{Result, StoreError};
use crate::traits::{ChainStore, StoredChain};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    hash_format: HashFormat,
    blocks: &'a [BlockRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Slot {
    Envelope(StoredChain),
    Bare(Vec<BlockRecord>),
}

impl From<Slot> for StoredChain {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Envelope(stored) => stored,
            Slot::Bare(blocks) => StoredChain {
                hash_format: HashFormat::Legacy,
                blocks,
            },
        }
    }
}

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    chains: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Store raw text under `key`, bypassing encoding.
    ///
    /// Lets tests simulate a corrupted slot.
    pub fn insert_raw(&self, key: impl Into<String>, text: impl Into<String>) -> Result<()> {
        self.chains
            .write()
            .map_err(poisoned)?
            .insert(key.into(), text.into());
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::Task(format!("lock poisoned: {}", e))
}

#[async_trait]
impl ChainStore for MemoryStore {
    async fn save_chain(
        &self,
        key: &str,
        format: HashFormat,
        records: &[BlockRecord],
    ) -> Result<()> {
        let text = serde_json::to_string(&EnvelopeRef {
            hash_format: format,
            blocks: records,
        })?;
        self.chains
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), text);
        tracing::debug!(key, %format, blocks = records.len(), "saved chain");
        Ok(())
    }

    async fn load_chain(&self, key: &str) -> Result<Option<StoredChain>> {
        let chains = self.chains.read().map_err(poisoned)?;
        let Some(text) = chains.get(key) else {
            return Ok(None);
        };
        let stored: StoredChain = serde_json::from_str::<Slot>(text)?.into();
        tracing::debug!(
            key,
            format = %stored.hash_format,
            blocks = stored.blocks.len(),
            "loaded chain"
        );
        Ok(Some(stored))
    }

    async fn delete_chain(&self, key: &str) -> Result<bool> {
        Ok(self.chains.write().map_err(poisoned)?.remove(key).is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.chains.read().map_err(poisoned)?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
