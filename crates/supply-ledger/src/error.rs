//! Error types for the ledger.

use supply_ledger_core::CoreError;
use supply_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
///
/// Integrity problems are not errors; they come back as reports from
/// [`crate::Ledger::validate`] and [`crate::Ledger::detect_tampering`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Chain operation error.
    #[error("chain error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
