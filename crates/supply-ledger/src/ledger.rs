//! The Ledger: a chain bound to a storage slot.
//!
//! The ledger owns one in-memory [`Chain`] and mirrors it to a
//! [`ChainStore`] under a single key on demand. It adds logging and the
//! load-time validation policy; all chain semantics live in the core
//! crate.

use std::sync::Arc;

use supply_ledger_core::{
    now_millis, random_genesis_nonce, Block, Chain, HashFormat, StepPatch, StepRecord,
    TamperResult, ValidationResult,
};
use supply_ledger_store::ChainStore;

use crate::error::Result;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "supply-chain-blockchain";

/// Configuration for the Ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Key the chain is saved under.
    pub storage_key: String,
    /// Canonical encoding for chains started by this ledger. A loaded
    /// chain keeps the format it was stored with.
    pub hash_format: HashFormat,
    /// Give the standard origin genesis a random nonce instead of 0.
    /// Genesis blocks built from caller data always use nonce 0.
    pub randomize_genesis_nonce: bool,
    /// Validate the chain after every load.
    pub validate_on_load: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            hash_format: HashFormat::default(),
            randomize_genesis_nonce: true,
            validate_on_load: true,
        }
    }
}

/// Outcome of [`Ledger::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing is stored under the key; the in-memory chain is unchanged.
    Missing,
    /// The stored chain replaced the in-memory chain.
    Loaded {
        /// Validation of the loaded chain, when `validate_on_load` is set.
        report: Option<ValidationResult>,
    },
}

/// A supply-chain ledger backed by a store.
pub struct Ledger<S: ChainStore> {
    chain: Chain,
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: ChainStore> Ledger<S> {
    /// Create a ledger with an empty chain.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            chain: Chain::with_format(config.hash_format),
            store: Arc::new(store),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The in-memory chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chain Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the genesis block for `data`, with nonce 0.
    pub fn init_genesis(&mut self, data: StepRecord) -> Result<&Block> {
        self.create_genesis(data, 0)
    }

    /// Create the genesis block from the standard origin record.
    ///
    /// Uses a random nonce when `randomize_genesis_nonce` is set.
    pub fn init_default_genesis(&mut self) -> Result<&Block> {
        let nonce = if self.config.randomize_genesis_nonce {
            random_genesis_nonce()
        } else {
            0
        };
        self.create_genesis(StepRecord::origin(now_millis()), nonce)
    }

    fn create_genesis(&mut self, data: StepRecord, nonce: u64) -> Result<&Block> {
        let block = self.chain.create_genesis_block_with_nonce(data, nonce)?;
        tracing::info!(hash = %block.hash, nonce, "created genesis block");
        Ok(block)
    }

    /// Append a step.
    pub fn append(&mut self, data: StepRecord) -> Result<&Block> {
        let block = self.chain.add_block(data)?;
        tracing::info!(
            index = block.index,
            step = %block.data.step,
            hash = %block.hash,
            "appended block"
        );
        Ok(block)
    }

    /// Rewrite a recorded step and rehash its block, breaking the link
    /// from its successor. Returns `None` for an unknown index.
    pub fn modify(&mut self, index: usize, patch: StepPatch) -> Result<Option<&Block>> {
        let block = self.chain.modify_block(index, patch)?;
        if let Some(block) = block {
            tracing::warn!(index = block.index, "block content modified after recording");
        }
        Ok(block)
    }

    /// Rewrite a recorded step without rehashing its block.
    pub fn tamper(&mut self, index: usize, patch: StepPatch) -> Option<&Block> {
        let block = self.chain.tamper_block(index, patch);
        if let Some(block) = block {
            tracing::warn!(index = block.index, "block content altered without rehash");
        }
        block
    }

    /// Validate the in-memory chain.
    pub fn validate(&self) -> ValidationResult {
        let result = self.chain.validate_chain();
        if !result.is_valid {
            tracing::warn!(
                failures = result.invalid_blocks.len(),
                "chain validation failed"
            );
        }
        result
    }

    /// Run tamper detection on the in-memory chain.
    pub fn detect_tampering(&self) -> TamperResult {
        let result = self.chain.detect_tampering();
        if result.is_tampered {
            tracing::warn!(
                blocks = result.tampered_blocks.len(),
                "tampering detected"
            );
        }
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the chain to the store, replacing what the key held.
    pub async fn save(&self) -> Result<()> {
        let records = self.chain.export_chain();
        let format = self.chain.format();
        self.store
            .save_chain(&self.config.storage_key, format, &records)
            .await?;
        tracing::debug!(
            key = %self.config.storage_key,
            %format,
            blocks = records.len(),
            "saved ledger"
        );
        Ok(())
    }

    /// Replace the chain with the stored one.
    ///
    /// Stored chains are imported as-is; a chain that fails validation is
    /// still loaded so that it can be inspected. The chain takes the hash
    /// format it was stored with, whatever the configured one.
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        let Some(stored) = self.store.load_chain(&self.config.storage_key).await? else {
            tracing::info!(key = %self.config.storage_key, "no stored chain");
            return Ok(LoadOutcome::Missing);
        };

        if stored.hash_format != self.config.hash_format {
            tracing::warn!(
                key = %self.config.storage_key,
                stored = %stored.hash_format,
                configured = %self.config.hash_format,
                "stored chain uses a different hash format; keeping the stored one"
            );
        }

        self.chain = Chain::with_format(stored.hash_format);
        self.chain.import_chain(stored.blocks);
        tracing::info!(
            key = %self.config.storage_key,
            format = %stored.hash_format,
            blocks = self.chain.len(),
            "loaded chain"
        );

        let report = self.config.validate_on_load.then(|| self.validate());
        Ok(LoadOutcome::Loaded { report })
    }

    /// Remove the stored chain. The in-memory chain is kept.
    pub async fn clear_storage(&self) -> Result<bool> {
        Ok(self.store.delete_chain(&self.config.storage_key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supply_ledger_core::{Location, Product};
    use supply_ledger_store::MemoryStore;

    fn step(name: &str) -> StepRecord {
        StepRecord::new(
            name,
            "Test Co.",
            Location::new("Warehouse"),
            Product::new("Widget", 10.0, "BATCH-1"),
        )
    }

    fn fixed_config() -> LedgerConfig {
        LedgerConfig {
            randomize_genesis_nonce: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.storage_key, "supply-chain-blockchain");
        assert_eq!(config.hash_format, HashFormat::Sorted);
        assert!(config.randomize_genesis_nonce);
        assert!(config.validate_on_load);
    }

    #[test]
    fn test_genesis_nonce_policy() {
        let mut ledger = Ledger::new(MemoryStore::new(), fixed_config());
        assert_eq!(ledger.init_default_genesis().unwrap().nonce, 0);
    }

    #[test]
    fn test_caller_genesis_uses_zero_nonce_by_default() {
        let mut ledger = Ledger::new(MemoryStore::new(), LedgerConfig::default());
        assert!(ledger.config().randomize_genesis_nonce);
        assert_eq!(ledger.init_genesis(step("Origin")).unwrap().nonce, 0);
    }

    #[tokio::test]
    async fn test_load_adopts_stored_format() {
        let legacy = LedgerConfig {
            hash_format: HashFormat::Legacy,
            ..fixed_config()
        };
        let mut writer = Ledger::new(MemoryStore::new(), legacy);
        writer.init_genesis(step("Origin")).unwrap();
        writer.append(step("Mill")).unwrap();
        writer.save().await.unwrap();

        let stored = writer
            .store()
            .load_chain(DEFAULT_STORAGE_KEY)
            .await
            .unwrap()
            .unwrap();
        let store = MemoryStore::new();
        store
            .save_chain(DEFAULT_STORAGE_KEY, stored.hash_format, &stored.blocks)
            .await
            .unwrap();

        let mut reader = Ledger::new(store, LedgerConfig::default());
        match reader.load().await.unwrap() {
            LoadOutcome::Loaded { report: Some(report) } => assert!(report.is_valid),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(reader.chain().format(), HashFormat::Legacy);

        reader.append(step("Factory")).unwrap();
        assert!(reader.validate().is_valid);
    }

    #[test]
    fn test_append_requires_genesis() {
        let mut ledger = Ledger::new(MemoryStore::new(), fixed_config());
        assert!(ledger.append(step("Mill")).is_err());

        ledger.init_default_genesis().unwrap();
        ledger.append(step("Mill")).unwrap();
        assert_eq!(ledger.chain().len(), 2);
        assert!(ledger.validate().is_valid);
    }

    #[tokio::test]
    async fn test_load_missing_keeps_chain() {
        let mut ledger = Ledger::new(MemoryStore::new(), fixed_config());
        ledger.init_genesis(step("Origin")).unwrap();

        assert_eq!(ledger.load().await.unwrap(), LoadOutcome::Missing);
        assert_eq!(ledger.chain().len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let mut ledger = Ledger::new(MemoryStore::new(), fixed_config());
        ledger.init_genesis(step("Origin")).unwrap();
        ledger.append(step("Mill")).unwrap();
        ledger.save().await.unwrap();

        let exported = ledger.chain().export_chain();
        let outcome = ledger.load().await.unwrap();
        match outcome {
            LoadOutcome::Loaded { report: Some(report) } => assert!(report.is_valid),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(ledger.chain().export_chain(), exported);

        assert!(ledger.clear_storage().await.unwrap());
        assert_eq!(ledger.load().await.unwrap(), LoadOutcome::Missing);
    }
}
