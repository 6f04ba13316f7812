//! Chain: an ordered, append-only sequence of hash-linked blocks.
//!
//! A chain is either empty or rooted at a genesis block. Every block after
//! genesis links to its predecessor by `previous_hash` and sits at the
//! index equal to its position.

use rand::Rng;

use crate::block::{Block, BlockRecord, GENESIS_PREVIOUS_HASH};
use crate::canonical::HashFormat;
use crate::error::CoreError;
use crate::now_millis;
use crate::step::{StepPatch, StepRecord};
use crate::validation::{self, TamperResult, ValidationResult};

/// Upper bound (exclusive) of the random nonce given to a default genesis.
pub const GENESIS_NONCE_RANGE: u64 = 1_000_000;

/// Draw a nonce for a genesis block from `0..GENESIS_NONCE_RANGE`.
pub fn random_genesis_nonce() -> u64 {
    rand::thread_rng().gen_range(0..GENESIS_NONCE_RANGE)
}

/// Lifecycle state of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No genesis block yet.
    Empty,
    /// Rooted at a genesis block; appends are allowed.
    Active,
}

/// An in-memory chain of blocks.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    blocks: Vec<Block>,
    format: HashFormat,
}

impl Chain {
    /// Create an empty chain using the default hash format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty chain using `format` for every hash it computes.
    pub fn with_format(format: HashFormat) -> Self {
        Self {
            blocks: Vec::new(),
            format,
        }
    }

    pub fn format(&self) -> HashFormat {
        self.format
    }

    pub fn state(&self) -> ChainState {
        if self.blocks.is_empty() {
            ChainState::Empty
        } else {
            ChainState::Active
        }
    }

    /// Create the genesis block with nonce 0.
    pub fn create_genesis_block(&mut self, data: StepRecord) -> Result<&Block, CoreError> {
        self.create_genesis_block_with_nonce(data, 0)
    }

    /// Create the genesis block with a caller-chosen nonce.
    pub fn create_genesis_block_with_nonce(
        &mut self,
        data: StepRecord,
        nonce: u64,
    ) -> Result<&Block, CoreError> {
        self.create_genesis_block_at(data, now_millis(), nonce)
    }

    /// Create the genesis block with a caller-supplied timestamp and nonce.
    pub fn create_genesis_block_at(
        &mut self,
        data: StepRecord,
        timestamp: i64,
        nonce: u64,
    ) -> Result<&Block, CoreError> {
        if self.state() != ChainState::Empty {
            return Err(CoreError::GenesisExists);
        }

        let mut block = Block::with_timestamp(0, GENESIS_PREVIOUS_HASH, data, timestamp, nonce);
        block.compute_hash_with(self.format)?;
        Ok(self.push(block))
    }

    /// Create a genesis block carrying the standard origin record and a
    /// random nonce.
    pub fn create_default_genesis(&mut self) -> Result<&Block, CoreError> {
        self.create_genesis_block_with_nonce(StepRecord::origin(now_millis()), random_genesis_nonce())
    }

    /// Append a block for `data`, stamped with the current time.
    pub fn add_block(&mut self, data: StepRecord) -> Result<&Block, CoreError> {
        self.add_block_at(data, now_millis())
    }

    /// Append a block for `data` with a caller-supplied timestamp.
    ///
    /// Used when replaying recorded events.
    pub fn add_block_at(&mut self, data: StepRecord, timestamp: i64) -> Result<&Block, CoreError> {
        let previous = self.blocks.last().ok_or(CoreError::ChainNotInitialized)?;

        let mut block = Block::with_timestamp(
            self.blocks.len() as i64,
            previous.hash.clone(),
            data,
            timestamp,
            0,
        );
        block.compute_hash_with(self.format)?;
        Ok(self.push(block))
    }

    fn push(&mut self, block: Block) -> &Block {
        self.blocks.push(block);
        // Just pushed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn latest_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Run the full validation pass. See [`validation::validate_blocks`].
    pub fn validate_chain(&self) -> ValidationResult {
        validation::validate_blocks(&self.blocks, self.format)
    }

    /// Run the tamper detection pass. See [`validation::detect_tampering`].
    pub fn detect_tampering(&self) -> TamperResult {
        validation::detect_tampering(&self.blocks, self.format)
    }

    /// Merge `patch` into the block at `index` and recompute that block's
    /// hash. Successors are left untouched, so the link from `index + 1`
    /// breaks.
    ///
    /// Returns `Ok(None)` when `index` is out of range. If the patched
    /// content cannot be hashed the block is left unchanged.
    pub fn modify_block(
        &mut self,
        index: usize,
        patch: StepPatch,
    ) -> Result<Option<&Block>, CoreError> {
        let format = self.format;
        let Some(block) = self.blocks.get_mut(index) else {
            return Ok(None);
        };

        let mut patched = block.clone();
        patched.data.apply(patch);
        patched.compute_hash_with(format)?;
        *block = patched;
        Ok(Some(&*block))
    }

    /// Merge `patch` into the block at `index` without recomputing its
    /// hash, leaving the stored hash stale.
    pub fn tamper_block(&mut self, index: usize, patch: StepPatch) -> Option<&Block> {
        let block = self.blocks.get_mut(index)?;
        block.data.apply(patch);
        Some(&*block)
    }

    /// The chain as plain records, in index order.
    pub fn export_chain(&self) -> Vec<BlockRecord> {
        self.blocks.iter().map(Block::to_record).collect()
    }

    /// Replace the chain wholesale with `records`.
    ///
    /// Nothing is validated; call [`Chain::validate_chain`] afterwards.
    pub fn import_chain(&mut self, records: Vec<BlockRecord>) {
        self.blocks = records.into_iter().map(Block::from_record).collect();
    }

    /// The exported records as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.export_chain())
            .map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// Replace the chain with records parsed from a JSON array.
    ///
    /// On a parse error the chain is left unchanged.
    pub fn import_json(&mut self, json: &str) -> Result<(), CoreError> {
        let records: Vec<BlockRecord> =
            serde_json::from_str(json).map_err(|e| CoreError::Decoding(e.to_string()))?;
        self.import_chain(records);
        Ok(())
    }
}
