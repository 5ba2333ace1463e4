//! Record identity derivation
//!
//! Identity is the first present of `id`, `externalId`, `code`. Items with
//! none of them are identified by a SHA-256 over their canonical JSON form,
//! so the same logical item maps to the same row regardless of key order.

use ledgersync_domain::ExternalRecord;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Stable identity of an upstream item.
pub fn derive_identity(record: &ExternalRecord) -> String {
    match (&record.id, &record.external_id, &record.code) {
        (Some(identity), _, _) | (None, Some(identity), _) | (None, None, Some(identity)) => {
            identity.to_string()
        }
        (None, None, None) => content_hash(&record.raw),
    }
}

/// Account code of an item, falling back to its identity.
pub fn derive_code(record: &ExternalRecord, identity: &str) -> String {
    record.code.as_ref().map_or_else(|| identity.to_owned(), ToString::to_string)
}

/// Lowercase hex SHA-256 of the canonical serialization of `raw`.
pub fn content_hash(raw: &Map<String, Value>) -> String {
    let canonical = Value::Object(sorted_map(raw)).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Compact JSON with object keys sorted at every depth.
///
/// Keys are re-inserted in sorted order, so the output is the same whether
/// serde_json's `Map` is its default `BTreeMap` or, with the
/// `preserve_order` feature enabled anywhere in the build, an `IndexMap`.
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sorted_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        scalar => scalar.clone(),
    }
}

fn sorted_map(map: &Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_unstable_by_key(|(key, _)| *key);
    entries.into_iter().map(|(key, item)| (key.clone(), sorted(item))).collect()
}
