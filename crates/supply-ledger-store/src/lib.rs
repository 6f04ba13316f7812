//! # Supply Ledger Store
//!
//! Persistence for exported chains. A chain is saved as its list of block
//! records, together with the hash format they were written under, under a
//! string key and loaded back verbatim; nothing here validates or
//! recomputes hashes.
//!
//! ## Key Types
//!
//! - [`ChainStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use supply_ledger_core::Chain;
//! use supply_ledger_store::{ChainStore, SqliteStore};
//!
//! async fn example(chain: &Chain) {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     store
//!         .save_chain("supply-chain-blockchain", chain.format(), &chain.export_chain())
//!         .await
//!         .unwrap();
//!
//!     let stored = store.load_chain("supply-chain-blockchain").await.unwrap();
//!     assert_eq!(stored.map(|s| s.hash_format), Some(chain.format()));
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ChainStore, StoredChain};
