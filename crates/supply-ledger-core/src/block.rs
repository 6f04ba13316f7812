//! Block: one step record plus linkage and integrity metadata.
//!
//! Mutation and hashing are separate steps. Changing any field leaves
//! `hash` stale until [`Block::compute_hash`] is called again; that is
//! what makes tampering observable.

use serde::{Deserialize, Serialize};

use crate::canonical::HashFormat;
use crate::error::{CoreError, StructuralError};
use crate::hash::{block_hash, is_valid_hash_format};
use crate::now_millis;
use crate::step::StepRecord;

/// The `previous_hash` sentinel of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A block in the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Position in the chain (0 = genesis).
    pub index: i64,

    /// Hash of the preceding block, or `"0"` for genesis.
    pub previous_hash: String,

    /// Creation time (Unix milliseconds).
    pub timestamp: i64,

    /// The step record.
    pub data: StepRecord,

    /// Free hash input. No proof-of-work meaning.
    pub nonce: u64,

    /// Hex SHA-256 over the other fields. Empty until computed.
    pub hash: String,
}

/// The plain external representation of a block.
///
/// This is the exported/persisted shape, field for field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub index: i64,
    pub previous_hash: String,
    pub timestamp: i64,
    pub data: StepRecord,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Create a block stamped with the current time and nonce 0.
    ///
    /// No validation is performed and the hash is left empty.
    pub fn new(index: i64, previous_hash: impl Into<String>, data: StepRecord) -> Self {
        Self::with_timestamp(index, previous_hash, data, now_millis(), 0)
    }

    /// Create a block with a caller-supplied timestamp and nonce.
    pub fn with_timestamp(
        index: i64,
        previous_hash: impl Into<String>,
        data: StepRecord,
        timestamp: i64,
        nonce: u64,
    ) -> Self {
        Self {
            index,
            previous_hash: previous_hash.into(),
            timestamp,
            data,
            nonce,
            hash: String::new(),
        }
    }

    /// Whether this block claims the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Recompute the hash from the current fields without storing it.
    pub fn recompute_hash(&self, format: HashFormat) -> Result<String, CoreError> {
        block_hash(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.data,
            self.nonce,
            format,
        )
    }

    /// Compute, store and return the hash using the default format.
    pub fn compute_hash(&mut self) -> Result<&str, CoreError> {
        self.compute_hash_with(HashFormat::default())
    }

    /// Compute, store and return the hash using `format`.
    pub fn compute_hash_with(&mut self, format: HashFormat) -> Result<&str, CoreError> {
        self.hash = self.recompute_hash(format)?;
        Ok(&self.hash)
    }

    /// Structural checks, in order: index, hash format, genesis link,
    /// non-genesis link format.
    ///
    /// Does not check that `hash` matches the content; that comparison
    /// is part of chain validation.
    pub fn validate(&self) -> Result<(), StructuralError> {
        if self.index < 0 {
            return Err(StructuralError::NegativeIndex);
        }

        if !is_valid_hash_format(&self.hash) {
            return Err(StructuralError::InvalidHashFormat);
        }

        if self.index == 0 && self.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(StructuralError::InvalidGenesisPreviousHash);
        }

        if self.index > 0 && !is_valid_hash_format(&self.previous_hash) {
            return Err(StructuralError::InvalidPreviousHashFormat);
        }

        Ok(())
    }

    /// Convert to the plain external representation.
    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            index: self.index,
            previous_hash: self.previous_hash.clone(),
            timestamp: self.timestamp,
            data: self.data.clone(),
            hash: self.hash.clone(),
            nonce: self.nonce,
        }
    }

    /// Rebuild a block from its external representation.
    ///
    /// The supplied hash is trusted, not recomputed.
    pub fn from_record(record: BlockRecord) -> Self {
        Self {
            index: record.index,
            previous_hash: record.previous_hash,
            timestamp: record.timestamp,
            data: record.data,
            nonce: record.nonce,
            hash: record.hash,
        }
    }
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        Block::from_record(record)
    }
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        block.to_record()
    }
}
