//! # Supply Ledger Core
//!
//! Pure primitives for the supply ledger: step records, canonical
//! serialization, SHA-256 block hashing, blocks and chains.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`StepRecord`] - One supply-chain step supplied by the caller
//! - [`Block`] - A step record plus linkage and integrity metadata
//! - [`Chain`] - The ordered, append-only sequence of blocks
//! - [`ValidationResult`] / [`TamperResult`] - Exhaustive integrity reports
//!
//! ## Canonicalization
//!
//! Step records are hashed through sorted-key compact JSON. See the
//! [`canonical`] module and [`HashFormat`].

pub mod block;
pub mod canonical;
pub mod chain;
pub mod error;
pub mod hash;
pub mod step;
pub mod validation;

pub use block::{Block, BlockRecord, GENESIS_PREVIOUS_HASH};
pub use canonical::{canonical_step_bytes, HashFormat};
pub use chain::{random_genesis_nonce, Chain, ChainState, GENESIS_NONCE_RANGE};
pub use error::{CoreError, StructuralError};
pub use hash::{block_hash, digest, is_valid_hash_format};
pub use step::{
    AddedBy, Certification, Coordinates, DocumentRef, Location, Product, StepPatch, StepRecord,
    Transport,
};
pub use validation::{
    detect_tampering, validate_blocks, InvalidBlock, TamperKind, TamperResult, TamperedBlock,
    ValidationResult, EMPTY_CHAIN_REASON,
};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
