//! Chain validation and tamper detection.
//!
//! Both passes are exhaustive: they never stop at the first problem and
//! never return an error. Every discrepancy is collected into the report.
//!
//! The two passes overlap but report differently. [`validate_blocks`]
//! runs the structural checks of [`Block::validate`] and produces
//! human-readable reasons; [`detect_tampering`] skips structural checks
//! and reports an expected/actual hash pair for every discrepancy.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::canonical::HashFormat;

/// Reason reported for an empty chain.
pub const EMPTY_CHAIN_REASON: &str = "Chain is empty";

/// A single failure found by [`validate_blocks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidBlock {
    /// Block position, or -1 for chain-level failures.
    pub index: i64,
    pub reason: String,
}

/// Result of validating a whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_blocks: Vec<InvalidBlock>,
}

impl ValidationResult {
    fn from_failures(invalid_blocks: Vec<InvalidBlock>) -> Self {
        Self {
            is_valid: invalid_blocks.is_empty(),
            invalid_blocks,
        }
    }

    /// Failures reported for the block at `index`.
    pub fn failures_at(&self, index: i64) -> impl Iterator<Item = &InvalidBlock> {
        self.invalid_blocks.iter().filter(move |b| b.index == index)
    }
}

/// The kind of discrepancy found by [`detect_tampering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TamperKind {
    /// Stored hash differs from the hash recomputed from content.
    DataModified,
    /// `previous_hash` differs from the preceding block's hash.
    BrokenLink,
}

impl TamperKind {
    pub fn reason(self) -> &'static str {
        match self {
            TamperKind::DataModified => "Block data has been modified",
            TamperKind::BrokenLink => "Previous hash link is broken",
        }
    }
}

/// A single discrepancy found by [`detect_tampering`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TamperedBlock {
    pub index: i64,
    pub reason: String,
    pub expected_hash: String,
    pub actual_hash: String,
}

impl TamperedBlock {
    fn new(index: i64, kind: TamperKind, expected_hash: String, actual_hash: String) -> Self {
        Self {
            index,
            reason: kind.reason().to_string(),
            expected_hash,
            actual_hash,
        }
    }

    /// Classify this entry by its reason string.
    pub fn kind(&self) -> Option<TamperKind> {
        [TamperKind::DataModified, TamperKind::BrokenLink]
            .into_iter()
            .find(|k| k.reason() == self.reason)
    }
}

/// Result of a tamper detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TamperResult {
    pub is_tampered: bool,
    pub tampered_blocks: Vec<TamperedBlock>,
}

/// Validate an ordered block sequence.
///
/// For the genesis block: structural checks, then an independent hash
/// recomputation. For every later block: structural checks (a failure
/// skips the block's remaining checks), the link to the preceding block,
/// then the hash recomputation.
pub fn validate_blocks(blocks: &[Block], format: HashFormat) -> ValidationResult {
    let Some(genesis) = blocks.first() else {
        return ValidationResult::from_failures(vec![InvalidBlock {
            index: -1,
            reason: EMPTY_CHAIN_REASON.to_string(),
        }]);
    };

    let mut failures = Vec::new();

    if let Err(e) = genesis.validate() {
        failures.push(InvalidBlock {
            index: 0,
            reason: e.to_string(),
        });
    }

    let recomputed = recompute_or_describe(genesis, format);
    if recomputed != genesis.hash {
        failures.push(InvalidBlock {
            index: 0,
            reason: format!(
                "Genesis block hash mismatch. Expected: {}, Got: {}",
                recomputed, genesis.hash
            ),
        });
    }

    for (i, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let index = (i + 1) as i64;

        if let Err(e) = current.validate() {
            failures.push(InvalidBlock {
                index,
                reason: e.to_string(),
            });
            continue;
        }

        if current.previous_hash != previous.hash {
            failures.push(InvalidBlock {
                index,
                reason: format!(
                    "Previous hash mismatch. Expected: {}, Got: {}",
                    previous.hash, current.previous_hash
                ),
            });
        }

        let recomputed = recompute_or_describe(current, format);
        if recomputed != current.hash {
            failures.push(InvalidBlock {
                index,
                reason: format!(
                    "Block hash mismatch. Expected: {}, Got: {}",
                    recomputed, current.hash
                ),
            });
        }
    }

    ValidationResult::from_failures(failures)
}

/// Recompute every block's hash and check every link.
///
/// An empty sequence is reported as untampered.
pub fn detect_tampering(blocks: &[Block], format: HashFormat) -> TamperResult {
    let mut tampered = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        let index = i as i64;

        let recomputed = recompute_or_describe(block, format);
        if recomputed != block.hash {
            tampered.push(TamperedBlock::new(
                index,
                TamperKind::DataModified,
                recomputed,
                block.hash.clone(),
            ));
        }

        if i > 0 {
            let previous = &blocks[i - 1];
            if block.previous_hash != previous.hash {
                tampered.push(TamperedBlock::new(
                    index,
                    TamperKind::BrokenLink,
                    previous.hash.clone(),
                    block.previous_hash.clone(),
                ));
            }
        }
    }

    TamperResult {
        is_tampered: !tampered.is_empty(),
        tampered_blocks: tampered,
    }
}

/// Recompute a block's hash for comparison.
///
/// A block whose content cannot be encoded can never match its stored
/// hash; the encoding error text takes the place of the expected hash so
/// the report still carries the cause.
fn recompute_or_describe(block: &Block, format: HashFormat) -> String {
    block
        .recompute_hash(format)
        .unwrap_or_else(|e| format!("<{}>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::GENESIS_PREVIOUS_HASH;
    use crate::step::{Location, Product, StepRecord};

    fn step(name: &str) -> StepRecord {
        StepRecord::new(
            name,
            "Co",
            Location::new("Somewhere"),
            Product::new("Widget", 10.0, "B-1"),
        )
    }

    fn honest_chain(len: usize) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for i in 0..len {
            let previous = blocks
                .last()
                .map(|b| b.hash.clone())
                .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string());
            let mut block =
                Block::with_timestamp(i as i64, previous, step(&format!("step-{}", i)), 1000 + i as i64, 0);
            block.compute_hash().unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn test_empty_chain() {
        let result = validate_blocks(&[], HashFormat::Sorted);
        assert!(!result.is_valid);
        assert_eq!(
            result.invalid_blocks,
            vec![InvalidBlock {
                index: -1,
                reason: "Chain is empty".into()
            }]
        );

        let tamper = detect_tampering(&[], HashFormat::Sorted);
        assert!(!tamper.is_tampered);
        assert!(tamper.tampered_blocks.is_empty());
    }

    #[test]
    fn test_honest_chain_is_valid() {
        let blocks = honest_chain(4);
        let result = validate_blocks(&blocks, HashFormat::Sorted);
        assert!(result.is_valid, "{:?}", result.invalid_blocks);
        assert!(!detect_tampering(&blocks, HashFormat::Sorted).is_tampered);
    }

    #[test]
    fn test_stale_hash_reported_by_both_passes() {
        let mut blocks = honest_chain(3);
        blocks[1].data.step = "forged".into();

        let result = validate_blocks(&blocks, HashFormat::Sorted);
        assert!(!result.is_valid);
        let at_one: Vec<_> = result.failures_at(1).collect();
        assert_eq!(at_one.len(), 1);
        assert!(at_one[0].reason.starts_with("Block hash mismatch. Expected: "));
        assert_eq!(result.failures_at(2).count(), 0);

        let tamper = detect_tampering(&blocks, HashFormat::Sorted);
        assert_eq!(tamper.tampered_blocks.len(), 1);
        let entry = &tamper.tampered_blocks[0];
        assert_eq!(entry.index, 1);
        assert_eq!(entry.kind(), Some(TamperKind::DataModified));
        assert_eq!(entry.actual_hash, blocks[1].hash);
        assert_eq!(entry.expected_hash, blocks[1].recompute_hash(HashFormat::Sorted).unwrap());
    }

    #[test]
    fn test_structural_failure_skips_remaining_checks() {
        let mut blocks = honest_chain(3);
        blocks[2].previous_hash = "xyz".into();

        let result = validate_blocks(&blocks, HashFormat::Sorted);
        let at_two: Vec<_> = result.failures_at(2).collect();
        assert_eq!(at_two.len(), 1);
        assert_eq!(at_two[0].reason, "Invalid previousHash format");

        // The tamper pass does not run structural checks.
        let tamper = detect_tampering(&blocks, HashFormat::Sorted);
        let kinds: Vec<_> = tamper.tampered_blocks.iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![Some(TamperKind::DataModified), Some(TamperKind::BrokenLink)]
        );
    }

    #[test]
    fn test_genesis_failures_accumulate() {
        let mut blocks = honest_chain(2);
        blocks[0].previous_hash = "a".repeat(64);

        let result = validate_blocks(&blocks, HashFormat::Sorted);
        let reasons: Vec<_> = result.failures_at(0).map(|f| f.reason.as_str()).collect();
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0], "Genesis block must have previousHash of \"0\"");
        assert!(reasons[1].starts_with("Genesis block hash mismatch. Expected: "));
    }

    #[test]
    fn test_report_serialization_shape() {
        let valid = validate_blocks(&honest_chain(1), HashFormat::Sorted);
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json, serde_json::json!({ "isValid": true }));

        let invalid = validate_blocks(&[], HashFormat::Sorted);
        let json = serde_json::to_value(&invalid).unwrap();
        assert_eq!(json["invalidBlocks"][0]["index"], -1);
    }
}
