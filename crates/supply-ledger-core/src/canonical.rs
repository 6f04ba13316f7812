//! Canonical JSON encoding for deterministic hashing of step records.
//!
//! A step record is rendered as compact JSON with these rules:
//! - Object keys sorted by UTF-16 code unit comparison
//! - No insignificant whitespace
//! - Integral floats inside the exact-integer range written as integers
//! - NaN and infinities rejected
//!
//! The canonical encoding feeds every block hash: changing it changes the
//! hash of every block ever written. New rules therefore go behind a new
//! [`HashFormat`] variant rather than into an existing one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::step::StepRecord;

/// Largest integer magnitude a double represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Version tag for the canonical step encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFormat {
    /// Keys sorted at every depth; all content is covered by the hash.
    #[default]
    Sorted,

    /// Byte-compatible with chains exported by the browser ledger.
    ///
    /// That encoder passed the sorted top-level key list to the JSON
    /// serializer as a key allow-list, which applies at every depth:
    /// nested objects keep only keys that also exist at the top level, in
    /// allow-list order. Nested content such as `product.quantity` is
    /// therefore NOT covered by the hash in this format.
    Legacy,
}

impl HashFormat {
    /// The lowercase name used in stored and exported metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashFormat::Sorted => "sorted",
            HashFormat::Legacy => "legacy",
        }
    }
}

impl fmt::Display for HashFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sorted" => Ok(HashFormat::Sorted),
            "legacy" => Ok(HashFormat::Legacy),
            other => Err(CoreError::Decoding(format!("unknown hash format: {}", other))),
        }
    }
}

/// Encode a step record to canonical bytes.
pub fn canonical_step_bytes(record: &StepRecord, format: HashFormat) -> Result<Vec<u8>, CoreError> {
    if let Some(field) = record.non_finite_field() {
        return Err(CoreError::Serialization(format!(
            "non-finite number in {}",
            field
        )));
    }

    let value =
        serde_json::to_value(record).map_err(|e| CoreError::Serialization(e.to_string()))?;
    canonical_value_bytes(&value, format)
}

/// Encode an arbitrary JSON value to canonical bytes.
pub fn canonical_value_bytes(value: &Value, format: HashFormat) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    match format {
        HashFormat::Sorted => encode_sorted(&mut buf, value)?,
        HashFormat::Legacy => {
            let allow_list = match value {
                Value::Object(map) => sorted_keys(map),
                _ => Vec::new(),
            };
            encode_legacy(&mut buf, value, &allow_list)?;
        }
    }
    Ok(buf)
}

/// Recursively encode with keys sorted at every depth.
fn encode_sorted(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_sorted(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            buf.push(b'{');
            for (i, key) in sorted_keys(map).into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_string(buf, key)?;
                buf.push(b':');
                encode_sorted(buf, &map[key])?;
            }
            buf.push(b'}');
        }
        scalar => encode_scalar(buf, scalar)?,
    }
    Ok(())
}

/// Recursively encode, keeping only allow-listed object keys.
///
/// Arrays are not filtered; objects nested inside them are.
fn encode_legacy(buf: &mut Vec<u8>, value: &Value, allow_list: &[&String]) -> Result<(), CoreError> {
    match value {
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_legacy(buf, item, allow_list)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            buf.push(b'{');
            let mut first = true;
            for key in allow_list {
                if let Some(v) = map.get(key.as_str()) {
                    if !first {
                        buf.push(b',');
                    }
                    first = false;
                    encode_string(buf, key)?;
                    buf.push(b':');
                    encode_legacy(buf, v, allow_list)?;
                }
            }
            buf.push(b'}');
        }
        scalar => encode_scalar(buf, scalar)?,
    }
    Ok(())
}

fn encode_scalar(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n)?,
        Value::String(s) => encode_string(buf, s)?,
        Value::Array(_) | Value::Object(_) => {
            return Err(CoreError::Serialization("expected scalar".into()));
        }
    }
    Ok(())
}

/// Encode a number the way a JavaScript engine prints it for the
/// common cases: integers without a fractional part, other floats in
/// shortest round-trip form.
fn encode_number(buf: &mut Vec<u8>, n: &Number) -> Result<(), CoreError> {
    if n.is_i64() || n.is_u64() {
        buf.extend_from_slice(n.to_string().as_bytes());
        return Ok(());
    }

    let f = n
        .as_f64()
        .ok_or_else(|| CoreError::Serialization(format!("unrepresentable number {}", n)))?;
    if !f.is_finite() {
        return Err(CoreError::Serialization("non-finite number".into()));
    }

    if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER {
        // Also folds -0 into 0.
        buf.extend_from_slice((f as i64).to_string().as_bytes());
    } else {
        buf.extend_from_slice(n.to_string().as_bytes());
    }
    Ok(())
}

fn encode_string(buf: &mut Vec<u8>, s: &str) -> Result<(), CoreError> {
    serde_json::to_writer(&mut *buf, s).map_err(|e| CoreError::Serialization(e.to_string()))
}

/// Object keys ordered by UTF-16 code units.
fn sorted_keys(map: &Map<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_by(|a, b| utf16_cmp(a, b));
    keys
}

fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
