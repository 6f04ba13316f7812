//! Error types for the Supply Ledger Core.

use thiserror::Error;

/// Core errors that can occur during chain operations.
///
/// Integrity mismatches are never reported through this type; they are
/// collected as data in [`crate::ValidationResult`] and [`crate::TamperResult`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("genesis block must be created first")]
    ChainNotInitialized,

    #[error("genesis block already exists")]
    GenesisExists,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Block-local structural errors reported by [`crate::Block::validate`].
///
/// The display strings are part of the validation report format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Index must be non-negative")]
    NegativeIndex,

    #[error("Invalid hash format")]
    InvalidHashFormat,

    #[error("Genesis block must have previousHash of \"0\"")]
    InvalidGenesisPreviousHash,

    #[error("Invalid previousHash format")]
    InvalidPreviousHashFormat,
}
