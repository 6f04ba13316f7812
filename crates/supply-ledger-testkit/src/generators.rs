//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use supply_ledger_core::{
    Certification, Chain, Coordinates, DocumentRef, HashFormat, Location, Product, StepRecord,
    Transport,
};

/// Free text, including non-ASCII and characters that need escaping.
pub fn text() -> impl Strategy<Value = String> {
    "\\PC{0,24}".prop_map(String::from)
}

/// An identifier-like string.
pub fn identifier() -> impl Strategy<Value = String> {
    "[A-Z]{2,6}-[0-9]{1,6}".prop_map(String::from)
}

/// A finite quantity; integral or fractional.
pub fn quantity() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u32..1_000_000).prop_map(f64::from),
        -1.0e9..1.0e9f64,
    ]
}

pub fn location() -> impl Strategy<Value = Location> {
    (text(), prop::option::of((-90.0..90.0f64, -180.0..180.0f64))).prop_map(|(name, coords)| {
        Location {
            name,
            coordinates: coords.map(|(lat, lng)| Coordinates::new(lat, lng)),
            extra: Map::new(),
        }
    })
}

pub fn product() -> impl Strategy<Value = Product> {
    (text(), quantity(), identifier(), prop::option::of(text())).prop_map(
        |(name, quantity, batch_id, description)| Product {
            name,
            quantity,
            batch_id,
            description,
            extra: Map::new(),
        },
    )
}

pub fn transport() -> impl Strategy<Value = Transport> {
    (
        prop::option::of(identifier()),
        prop::option::of(text()),
        prop::option::of(text()),
    )
        .prop_map(|(vehicle_id, route, carrier)| Transport {
            vehicle_id,
            route,
            carrier,
            extra: Map::new(),
        })
}

pub fn certification() -> impl Strategy<Value = Certification> {
    (
        prop::sample::select(vec!["ORGANIC", "FAIR_TRADE", "CO2_NEUTRAL", "BIO"]),
        text(),
        identifier(),
        prop::option::of(Just("2025-12-31".to_string())),
    )
        .prop_map(|(kind, issuer, certificate_id, valid_until)| Certification {
            kind: kind.to_string(),
            issuer,
            certificate_id,
            valid_until,
            extra: Map::new(),
        })
}

pub fn document() -> impl Strategy<Value = DocumentRef> {
    (
        prop::sample::select(vec!["INVOICE", "CERTIFICATE", "QUALITY_REPORT", "SHIPPING_MANIFEST"]),
        any::<[u8; 8]>(),
        identifier(),
    )
        .prop_map(|(kind, seed, document_id)| DocumentRef {
            kind: kind.to_string(),
            document_hash: supply_ledger_core::digest(&seed),
            document_id,
            url: None,
            extra: Map::new(),
        })
}

/// A small metadata map with scalar values.
pub fn metadata() -> impl Strategy<Value = Map<String, Value>> {
    let scalar = prop_oneof![
        text().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    prop::collection::btree_map("[a-zA-Z]{1,12}", scalar, 0..4)
        .prop_map(|m| m.into_iter().collect())
}

/// Generate an arbitrary step record.
pub fn step_record() -> impl Strategy<Value = StepRecord> {
    (
        (text(), text(), location(), product()),
        prop::option::of(transport()),
        prop::option::of(prop::collection::vec(certification(), 0..3)),
        prop::option::of(prop::collection::vec(document(), 0..3)),
        prop::option::of(metadata()),
    )
        .prop_map(
            |((step, company, location, product), transport, certifications, documents, metadata)| {
                StepRecord {
                    step,
                    company,
                    location,
                    product,
                    transport,
                    certifications,
                    documents,
                    added_by: None,
                    metadata,
                    extra: Map::new(),
                }
            },
        )
}

/// Generate between 1 and `max` step records.
pub fn step_records(max: usize) -> impl Strategy<Value = Vec<StepRecord>> {
    prop::collection::vec(step_record(), 1..=max.max(1))
}

pub fn hash_format() -> impl Strategy<Value = HashFormat> {
    prop_oneof![Just(HashFormat::Sorted), Just(HashFormat::Legacy)]
}

/// Build a chain whose first record is the genesis and the rest follow.
///
/// Timestamps are fixed so the result is reproducible.
///
/// # Panics
///
/// Panics on an empty slice.
pub fn honest_chain(records: &[StepRecord], format: HashFormat) -> Chain {
    let (first, rest) = records.split_first().expect("at least one record");
    let mut chain = Chain::with_format(format);
    chain
        .create_genesis_block_at(first.clone(), 1_000, 0)
        .expect("generated records are finite");
    for (i, record) in rest.iter().enumerate() {
        chain
            .add_block_at(record.clone(), 2_000 + i as i64)
            .expect("generated records are finite");
    }
    chain
}
