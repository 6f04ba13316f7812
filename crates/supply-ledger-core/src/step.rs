//! StepRecord: the caller-supplied payload of a block.
//!
//! A step record describes one event in a product's journey (harvest,
//! processing, shipping, ...). The chain never interprets it; it only
//! serializes and hashes it as a whole.
//!
//! Records decode losslessly: keys without a typed field land in the
//! `extra` map of the enclosing object, and an optional field written as
//! an explicit `null` is kept as `null` in `extra` rather than dropped.
//! Re-encoding a decoded record therefore yields the same JSON value and
//! the same hash.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// One supply-chain step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct StepRecord {
    /// Step name, e.g. "Cotton Farm" or "Quality Control".
    pub step: String,

    /// Company or entity performing the step.
    pub company: String,

    /// Where the step took place.
    pub location: Location,

    /// The product being tracked.
    pub product: Product,

    /// Transport details, for shipping steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,

    /// Document references (hashes, not the documents themselves).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentRef>>,

    /// Advisory audit metadata. Not an authenticated claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<AddedBy>,

    /// Free-form extension map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Top-level keys with no typed field, and explicit nulls.
    ///
    /// Must not repeat the key of a field that is set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(serialize_with = "js_number")]
    pub lat: f64,
    #[serde(serialize_with = "js_number")]
    pub lng: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Kept as a float so that records exported by other tooling decode
    /// losslessly. Integral values encode as plain integers.
    #[serde(serialize_with = "js_number")]
    pub quantity: f64,
    pub batch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Transport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Certification {
    /// e.g. `ORGANIC`, `FAIR_TRADE`, `CO2_NEUTRAL`.
    #[serde(rename = "type")]
    pub kind: String,
    pub issuer: String,
    pub certificate_id: String,
    /// ISO-8601 date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct DocumentRef {
    /// e.g. `INVOICE`, `SHIPPING_MANIFEST`, `QUALITY_REPORT`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Content hash of the referenced document.
    pub document_hash: String,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who submitted a step. Passed through as opaque payload content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedBy {
    pub employee_id: String,
    pub employee_name: String,
    pub employee_role: String,
    /// When the step was entered (Unix milliseconds).
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Serde impls for a type whose optional fields may arrive as `null`.
///
/// The derived code (generated as inherent functions by `remote = "Self"`)
/// does the field work; on the way in, explicit nulls of the listed keys
/// are moved into `extra` so they survive re-encoding.
macro_rules! keep_explicit_nulls {
    ($ty:ident, [$($key:literal),+ $(,)?]) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let (fields, nulls) = split_nulls(deserializer, &[$($key),+])?;
                let mut value =
                    $ty::deserialize(fields).map_err(<D::Error as de::Error>::custom)?;
                value.extra.extend(nulls);
                Ok(value)
            }
        }
    };
}

keep_explicit_nulls!(
    StepRecord,
    ["transport", "certifications", "documents", "addedBy", "metadata"]
);
keep_explicit_nulls!(Location, ["coordinates"]);
keep_explicit_nulls!(Product, ["description"]);
keep_explicit_nulls!(Transport, ["vehicleId", "route", "carrier"]);
keep_explicit_nulls!(Certification, ["validUntil"]);
keep_explicit_nulls!(DocumentRef, ["url"]);

/// Read an object, taking out the `optional` keys whose value is `null`.
fn split_nulls<'de, D>(
    deserializer: D,
    optional: &[&str],
) -> Result<(Value, Map<String, Value>), D::Error>
where
    D: Deserializer<'de>,
{
    let mut fields = Map::<String, Value>::deserialize(deserializer)?;
    let mut nulls = Map::new();
    for key in optional {
        if matches!(fields.get(*key), Some(Value::Null)) {
            fields.remove(*key);
            nulls.insert((*key).to_string(), Value::Null);
        }
    }
    Ok((Value::Object(fields), nulls))
}

/// Encode integral floats as integers, the way JavaScript prints them.
fn js_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A partial step record for [`StepRecord::apply`].
///
/// Every present field replaces the corresponding top-level field of the
/// target record wholesale; absent fields leave it untouched. Entries of
/// `extra` are merged as top-level keys of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<AddedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Additional top-level keys. Keys naming a typed field are ignored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepRecord {
    /// Create a record with the required fields only.
    pub fn new(
        step: impl Into<String>,
        company: impl Into<String>,
        location: Location,
        product: Product,
    ) -> Self {
        Self {
            step: step.into(),
            company: company.into(),
            location,
            product,
            transport: None,
            certifications: None,
            documents: None,
            added_by: None,
            metadata: None,
            extra: Map::new(),
        }
    }

    /// The standard origin record used to seed a chain.
    ///
    /// `created_at` is epoch milliseconds and is rendered into the
    /// `creationTimestamp` metadata entry as an ISO-8601 UTC string.
    pub fn origin(created_at: i64) -> Self {
        let creation_timestamp = DateTime::<Utc>::from_timestamp_millis(created_at)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();

        let mut metadata = Map::new();
        metadata.insert("blockchainVersion".into(), Value::from("1.0.0"));
        metadata.insert("creationTimestamp".into(), Value::from(creation_timestamp));
        metadata.insert("systemIntegrity".into(), Value::from("verified"));
        metadata.insert("trustAnchor".into(), Value::Bool(true));

        Self {
            step: "Supply Chain Origin".into(),
            company: "Blockchain Verification System".into(),
            location: Location {
                name: "Global".into(),
                coordinates: Some(Coordinates::new(0.0, 0.0)),
                extra: Map::new(),
            },
            product: Product {
                name: "Supply Chain Tracking".into(),
                quantity: 1.0,
                batch_id: "GENESIS-001".into(),
                description: Some(
                    "Genesis block establishing the supply chain verification system".into(),
                ),
                extra: Map::new(),
            },
            transport: None,
            certifications: Some(vec![Certification {
                kind: "SYSTEM_VERIFIED".into(),
                issuer: "Blockchain Protocol".into(),
                certificate_id: "GENESIS-CERT-001".into(),
                valid_until: Some("9999-12-31T23:59:59Z".into()),
                extra: Map::new(),
            }]),
            documents: Some(vec![DocumentRef {
                kind: "SYSTEM_INITIALIZATION".into(),
                document_hash: "genesis-system-hash-placeholder".into(),
                document_id: "GENESIS-DOC-001".into(),
                url: Some("system://genesis".into()),
                extra: Map::new(),
            }]),
            added_by: None,
            metadata: Some(metadata),
            extra: Map::new(),
        }
    }

    /// JSON keys of the typed top-level fields.
    pub const FIELDS: [&'static str; 9] = [
        "step",
        "company",
        "location",
        "product",
        "transport",
        "certifications",
        "documents",
        "addedBy",
        "metadata",
    ];

    /// Shallow-merge a patch into this record.
    pub fn apply(&mut self, patch: StepPatch) {
        if let Some(step) = patch.step {
            self.step = step;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(product) = patch.product {
            self.product = product;
        }
        // A set field replaces any explicit null kept for its key.
        if patch.transport.is_some() {
            self.transport = patch.transport;
            self.extra.remove("transport");
        }
        if patch.certifications.is_some() {
            self.certifications = patch.certifications;
            self.extra.remove("certifications");
        }
        if patch.documents.is_some() {
            self.documents = patch.documents;
            self.extra.remove("documents");
        }
        if patch.added_by.is_some() {
            self.added_by = patch.added_by;
            self.extra.remove("addedBy");
        }
        if patch.metadata.is_some() {
            self.metadata = patch.metadata;
            self.extra.remove("metadata");
        }
        for (key, value) in patch.extra {
            if !Self::FIELDS.contains(&key.as_str()) {
                self.extra.insert(key, value);
            }
        }
    }

    /// Name of the first typed float field that holds NaN or infinity.
    ///
    /// JSON has no representation for these values, so they cannot be
    /// hashed canonically.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !self.product.quantity.is_finite() {
            return Some("product.quantity");
        }
        if let Some(c) = &self.location.coordinates {
            if !c.lat.is_finite() {
                return Some("location.coordinates.lat");
            }
            if !c.lng.is_finite() {
                return Some("location.coordinates.lng");
            }
        }
        None
    }
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
            extra: Map::new(),
        }
    }

    pub fn at(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            coordinates: Some(Coordinates::new(lat, lng)),
            extra: Map::new(),
        }
    }
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            extra: Map::new(),
        }
    }
}

impl Product {
    pub fn new(name: impl Into<String>, quantity: f64, batch_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            batch_id: batch_id.into(),
            description: None,
            extra: Map::new(),
        }
    }
}
