//! # Supply Ledger
//!
//! A tamper-evident ledger of supply-chain steps. Each step a product goes
//! through (harvest, processing, shipping, inspection) is recorded as a
//! block that carries the SHA-256 hash of its predecessor, so any later
//! edit to a recorded step is detectable.
//!
//! ## Overview
//!
//! - **Blocks** hold one step record plus index, timestamp, nonce and hash
//! - **Chains** are append-only; validation and tamper detection report
//!   every discrepancy rather than stopping at the first
//! - **Stores** persist the exported chain under a key
//!
//! There is no consensus, mining or signing: integrity here means
//! internal consistency of the hash links.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use supply_ledger::{Ledger, LedgerConfig, LoadOutcome};
//! use supply_ledger::core::{Location, Product, StepRecord};
//! use supply_ledger::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let mut ledger = Ledger::new(store, LedgerConfig::default());
//!
//!     if let LoadOutcome::Missing = ledger.load().await.unwrap() {
//!         ledger.init_default_genesis().unwrap();
//!     }
//!
//!     ledger
//!         .append(StepRecord::new(
//!             "Cotton Farm",
//!             "Organic Cotton Farm Co.",
//!             Location::at("Texas, USA", 31.9686, -99.9018),
//!             Product::new("Sweatshirt", 1000.0, "BATCH-2024-001"),
//!         ))
//!         .unwrap();
//!
//!     assert!(ledger.validate().is_valid);
//!     ledger.save().await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `supply_ledger::core` - Step records, blocks, chains, hashing
//! - `supply_ledger::store` - Storage abstraction and SQLite

pub mod error;
pub mod ledger;

pub use supply_ledger_core as core;
pub use supply_ledger_store as store;

pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerConfig, LoadOutcome, DEFAULT_STORAGE_KEY};

pub use supply_ledger_core::{
    Block, BlockRecord, Chain, HashFormat, StepPatch, StepRecord, TamperResult, ValidationResult,
};
