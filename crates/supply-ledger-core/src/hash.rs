//! Hash engine: SHA-256 over raw bytes and over a block's fields.
//!
//! Block hash input is the plain concatenation, without separators, of:
//!
//! ```text
//! index || previous_hash || timestamp || canonical(data) || nonce
//! ```
//!
//! Numbers are rendered in decimal. The field order and the absence of
//! delimiters are frozen: exported chains are verified against them.

use sha2::{Digest, Sha256};

use crate::canonical::{canonical_step_bytes, HashFormat};
use crate::error::CoreError;
use crate::step::StepRecord;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// SHA-256 of `data` as 64 lowercase hex characters.
pub fn digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the hash of a block from its fields.
pub fn block_hash(
    index: i64,
    previous_hash: &str,
    timestamp: i64,
    data: &StepRecord,
    nonce: u64,
    format: HashFormat,
) -> Result<String, CoreError> {
    let data_bytes = canonical_step_bytes(data, format)?;

    let mut hasher = Sha256::new();
    hasher.update(index.to_string().as_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(&data_bytes);
    hasher.update(nonce.to_string().as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Whether `s` is exactly 64 hex characters (either case).
pub fn is_valid_hash_format(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Location, Product};

    fn record() -> StepRecord {
        StepRecord::new(
            "Cotton Farm",
            "Organic Cotton Farm Co.",
            Location::at("Texas, USA", 31.9686, -99.9018),
            Product::new("Sweatshirt", 1000.0, "BATCH-2024-001"),
        )
    }

    #[test]
    fn test_digest_known_vector() {
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_block_hash_is_digest_of_concatenation() {
        let data = record();
        let canonical = canonical_step_bytes(&data, HashFormat::Sorted).unwrap();

        let mut input = b"3".to_vec();
        input.extend_from_slice(b"0");
        input.extend_from_slice(b"1700000000000");
        input.extend_from_slice(&canonical);
        input.extend_from_slice(b"7");

        let hash = block_hash(3, "0", 1700000000000, &data, 7, HashFormat::Sorted).unwrap();
        assert_eq!(hash, digest(&input));
    }

    #[test]
    fn test_block_hash_sensitive_to_every_field() {
        let data = record();
        let base = block_hash(1, "0", 1000, &data, 0, HashFormat::Sorted).unwrap();

        assert_ne!(base, block_hash(2, "0", 1000, &data, 0, HashFormat::Sorted).unwrap());
        assert_ne!(base, block_hash(1, "1", 1000, &data, 0, HashFormat::Sorted).unwrap());
        assert_ne!(base, block_hash(1, "0", 1001, &data, 0, HashFormat::Sorted).unwrap());
        assert_ne!(base, block_hash(1, "0", 1000, &data, 1, HashFormat::Sorted).unwrap());

        let mut other = data.clone();
        other.product.quantity = 999.0;
        assert_ne!(base, block_hash(1, "0", 1000, &other, 0, HashFormat::Sorted).unwrap());
    }

    #[test]
    fn test_hash_format_check() {
        assert!(is_valid_hash_format(&"a".repeat(64)));
        assert!(is_valid_hash_format(&"ABCDEF0123456789".repeat(4)));
        assert!(!is_valid_hash_format(&"a".repeat(63)));
        assert!(!is_valid_hash_format(&"a".repeat(65)));
        assert!(!is_valid_hash_format(&"g".repeat(64)));
        assert!(!is_valid_hash_format(""));
        assert!(!is_valid_hash_format("0"));
    }
}
