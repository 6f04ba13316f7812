//! Golden test vectors for deterministic verification.
//!
//! Each vector fixes every hash input of a block. The expected hashes were
//! produced by an independent implementation of both canonical formats;
//! `Legacy` hashes match what the browser ledger writes for the same data.

use supply_ledger_core::{canonical_step_bytes, Block, HashFormat, StepRecord};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub index: i64,
    pub previous_hash: &'static str,
    pub timestamp: i64,
    pub nonce: u64,
    /// The step record as JSON.
    pub data_json: &'static str,
    /// Expected canonical bytes under [`HashFormat::Sorted`].
    pub expected_sorted_canonical: &'static str,
    /// Expected block hash under [`HashFormat::Sorted`].
    pub expected_sorted_hash: &'static str,
    /// Expected canonical bytes under [`HashFormat::Legacy`].
    pub expected_legacy_canonical: &'static str,
    /// Expected block hash under [`HashFormat::Legacy`].
    pub expected_legacy_hash: &'static str,
}

impl GoldenVector {
    /// Parse the vector's step record.
    ///
    /// # Panics
    ///
    /// Panics if `data_json` is not a valid step record.
    pub fn record(&self) -> StepRecord {
        serde_json::from_str(self.data_json).expect("golden vector data is a valid step record")
    }

    pub fn expected_hash(&self, format: HashFormat) -> &'static str {
        match format {
            HashFormat::Sorted => self.expected_sorted_hash,
            HashFormat::Legacy => self.expected_legacy_hash,
        }
    }

    pub fn expected_canonical(&self, format: HashFormat) -> &'static str {
        match format {
            HashFormat::Sorted => self.expected_sorted_canonical,
            HashFormat::Legacy => self.expected_legacy_canonical,
        }
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal genesis",
            index: 0,
            previous_hash: "0",
            timestamp: 1736870400000,
            nonce: 0,
            data_json: r#"{
                "step": "Cotton Farm",
                "company": "Organic Cotton Farm Co.",
                "location": { "name": "Texas, USA" },
                "product": { "name": "Sweatshirt", "quantity": 1000, "batchId": "BATCH-2024-001" }
            }"#,
            expected_sorted_canonical: r#"{"company":"Organic Cotton Farm Co.","location":{"name":"Texas, USA"},"product":{"batchId":"BATCH-2024-001","name":"Sweatshirt","quantity":1000},"step":"Cotton Farm"}"#,
            expected_sorted_hash: "c8fa48c6c65ec77c3ea8fd1d86734a011108f82734da89d92935abc29e12ff61",
            expected_legacy_canonical: r#"{"company":"Organic Cotton Farm Co.","location":{},"product":{},"step":"Cotton Farm"}"#,
            expected_legacy_hash: "fc24f74840603f5129d26483d22ff078bd3d52c2d97b6cdc4e42daca85ed0129",
        },
        GoldenVector {
            name: "shipping step with nested content",
            index: 1,
            previous_hash: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            timestamp: 1736956800000,
            nonce: 7,
            data_json: r#"{
                "step": "Transport to Factory",
                "company": "Green Logistics Ltd.",
                "location": {
                    "name": "Atlanta, Georgia",
                    "coordinates": { "lat": 33.749, "lng": -84.388 }
                },
                "product": {
                    "name": "Sweatshirt",
                    "quantity": 1000,
                    "batchId": "BATCH-2024-001",
                    "description": "Raw cotton bales"
                },
                "transport": {
                    "vehicleId": "TRUCK-GL-2024-15",
                    "route": "Texas → Georgia",
                    "carrier": "Green Logistics Ltd."
                },
                "certifications": [
                    { "type": "CO2_NEUTRAL", "issuer": "Carbon Trust", "certificateId": "CT-2024-789" }
                ]
            }"#,
            expected_sorted_canonical: r#"{"certifications":[{"certificateId":"CT-2024-789","issuer":"Carbon Trust","type":"CO2_NEUTRAL"}],"company":"Green Logistics Ltd.","location":{"coordinates":{"lat":33.749,"lng":-84.388},"name":"Atlanta, Georgia"},"product":{"batchId":"BATCH-2024-001","description":"Raw cotton bales","name":"Sweatshirt","quantity":1000},"step":"Transport to Factory","transport":{"carrier":"Green Logistics Ltd.","route":"Texas → Georgia","vehicleId":"TRUCK-GL-2024-15"}}"#,
            expected_sorted_hash: "7501ef36ffe83b70f4313911cb083ea184a262f473ecd5c5b9fac3730bddf8eb",
            expected_legacy_canonical: r#"{"certifications":[{}],"company":"Green Logistics Ltd.","location":{},"product":{},"step":"Transport to Factory","transport":{}}"#,
            expected_legacy_hash: "011b9e02dbb5d22ae3223a79149f1adaa1b882f815a99d4d7098c2a8058784ab",
        },
        GoldenVector {
            name: "fractional quantity and escaped quotes",
            index: 2,
            previous_hash: "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
            timestamp: 0,
            nonce: 999999,
            data_json: r#"{
                "step": "Quality Control",
                "company": "Inspect \"Q\" Inc.",
                "location": { "name": "Dhaka" },
                "product": { "name": "Yarn", "quantity": 12.5, "batchId": "Y-1" }
            }"#,
            expected_sorted_canonical: r#"{"company":"Inspect \"Q\" Inc.","location":{"name":"Dhaka"},"product":{"batchId":"Y-1","name":"Yarn","quantity":12.5},"step":"Quality Control"}"#,
            expected_sorted_hash: "3f7f9d8840ef9c612ebf94b1a7235ad63908bb1c5a67034967b3755aa3c12c2c",
            expected_legacy_canonical: r#"{"company":"Inspect \"Q\" Inc.","location":{},"product":{},"step":"Quality Control"}"#,
            expected_legacy_hash: "6a53d756b458d9dc52204a21688b19c4da05ba27855a8a5b032bd381d13becff",
        },
    ]
}

/// A three-block chain exported by the browser ledger.
///
/// Written with `Legacy` hashes. Block 1 was then edited the way the
/// browser's modify action does it: `{ quantity: 5 }` merged into its data
/// as a new top-level key, and the block rehashed in place. The export
/// also carries explicit `null` fields and keys with no typed field.
pub const BROWSER_EXPORT_JSON: &str = include_str!("../data/browser_export.json");

/// The only validation failure [`BROWSER_EXPORT_JSON`] holds under `Legacy`.
pub const BROWSER_EXPORT_FAILURE: (i64, &str) = (
    2,
    "Previous hash mismatch. Expected: d1397d5720578361d22bfa3608a9688f42ba3d341fb9721c59ebafdbeacf019f, \
     Got: 401c047e3c52ecbee536020ffc7d1a6bb1f3fd2876af89c6f9b93691a84b50e0",
);

/// Build the vector's block and hash it under `format`.
///
/// # Panics
///
/// Panics if the vector's record cannot be parsed or hashed.
pub fn block_from_vector(vector: &GoldenVector, format: HashFormat) -> Block {
    let mut block = Block::with_timestamp(
        vector.index,
        vector.previous_hash,
        vector.record(),
        vector.timestamp,
        vector.nonce,
    );
    block
        .compute_hash_with(format)
        .expect("golden vector record hashes");
    block
}

/// Check every vector under both formats.
///
/// Returns `(name, format, matches, computed_hash)` per vector and format.
pub fn verify_all_vectors() -> Vec<(String, HashFormat, bool, String)> {
    let mut results = Vec::new();
    for vector in all_vectors() {
        for format in [HashFormat::Sorted, HashFormat::Legacy] {
            let block = block_from_vector(&vector, format);
            let matches = block.hash == vector.expected_hash(format);
            results.push((vector.name.to_string(), format, matches, block.hash));
        }
    }
    results
}

/// Canonical bytes of the vector's record under `format`, as text.
pub fn canonical_text(vector: &GoldenVector, format: HashFormat) -> String {
    let bytes = canonical_step_bytes(&vector.record(), format).unwrap_or_default();
    String::from_utf8(bytes).unwrap_or_default()
}
