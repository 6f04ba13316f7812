//! # Supply Ledger Testkit
//!
//! Testing utilities for the supply ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed blocks with expected hashes for both hash formats
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Sample step records and deterministic chain builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use supply_ledger_core::HashFormat;
//! use supply_ledger_testkit::vectors::{all_vectors, block_from_vector};
//!
//! for vector in all_vectors() {
//!     let block = block_from_vector(&vector, HashFormat::Sorted);
//!     assert_eq!(block.hash, vector.expected_sorted_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use supply_ledger_testkit::generators::{honest_chain, step_records};
//!
//! proptest! {
//!     #[test]
//!     fn honest_chains_validate(records in step_records(8)) {
//!         let chain = honest_chain(&records, Default::default());
//!         prop_assert!(chain.validate_chain().is_valid);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use supply_ledger_testkit::fixtures::ChainBuilder;
//!
//! let chain = ChainBuilder::new().journey().build();
//! assert!(chain.validate_chain().is_valid);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{simple_step, sweatshirt_journey, ChainBuilder, TestFixture};
pub use generators::{honest_chain, step_record, step_records};
pub use vectors::{
    all_vectors, block_from_vector, verify_all_vectors, GoldenVector, BROWSER_EXPORT_JSON,
};
