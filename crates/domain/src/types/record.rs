//! Ledger record types
//!
//! `ExternalRecord` is the transient wire shape handed over by the upstream
//! ledger API; `StoredRecord` is the persisted row keyed by `external_id`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A non-null scalar (or structured) value usable as a record identity.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityValue {
    Text(String),
    Number(Number),
    Bool(bool),
    /// Arrays and objects; rendered as compact JSON.
    Structured(Value),
}

impl IdentityValue {
    /// Lift a JSON value; `null` is treated as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Number(number) => Some(Self::Number(number.clone())),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            other => Some(Self::Structured(other.clone())),
        }
    }
}

impl fmt::Display for IdentityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => match whole_float(number) {
                Some(whole) => write!(f, "{whole:.0}"),
                None => write!(f, "{number}"),
            },
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Structured(value) => write!(f, "{value}"),
        }
    }
}

/// Float-typed numbers with no fractional part, so `7.0` and `7` name the
/// same record. Magnitudes from 1e21 up keep the exponent form.
fn whole_float(number: &Number) -> Option<f64> {
    let value = number.as_f64().filter(|_| number.is_f64())?;
    if value.fract() != 0.0 || value.abs() >= 1e21 {
        return None;
    }
    Some(if value == 0.0 { 0.0 } else { value })
}

/// One ledger line as received from upstream.
///
/// The fields the reconciler cares about are lifted out with explicit
/// presence; everything else stays in `raw`, which is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRecord {
    pub id: Option<IdentityValue>,
    pub external_id: Option<IdentityValue>,
    pub code: Option<IdentityValue>,
    pub debt: Option<Value>,
    pub credit: Option<Value>,
    pub raw: Map<String, Value>,
}

impl ExternalRecord {
    /// Wire names of the lifted fields.
    pub const ID_FIELD: &'static str = "id";
    pub const EXTERNAL_ID_FIELD: &'static str = "externalId";
    pub const CODE_FIELD: &'static str = "code";
    pub const DEBT_FIELD: &'static str = "debt";
    pub const CREDIT_FIELD: &'static str = "credit";

    /// Build from a decoded JSON object.
    pub fn from_object(raw: Map<String, Value>) -> Self {
        let identity = |field: &str| raw.get(field).and_then(IdentityValue::from_json);
        let amount = |field: &str| raw.get(field).filter(|value| !value.is_null()).cloned();

        Self {
            id: identity(Self::ID_FIELD),
            external_id: identity(Self::EXTERNAL_ID_FIELD),
            code: identity(Self::CODE_FIELD),
            debt: amount(Self::DEBT_FIELD),
            credit: amount(Self::CREDIT_FIELD),
            raw,
        }
    }

    /// The original payload as a JSON value.
    pub fn raw_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

impl TryFrom<Value> for ExternalRecord {
    type Error = Value;

    /// Only JSON objects are ledger records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(other),
        }
    }
}

/// Mutable columns written by an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub code: String,
    pub debt: Decimal,
    pub credit: Decimal,
    pub raw_data: Value,
}

/// Persisted ledger row, unique on `external_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub external_id: String,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub debt: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
    pub raw_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> ExternalRecord {
        ExternalRecord::try_from(value).unwrap()
    }

    #[test]
    fn lifts_identity_fields_with_presence() {
        let rec = record(json!({"id": 7, "code": "123", "debt": "5.5"}));

        assert_eq!(rec.id.as_ref().map(ToString::to_string).as_deref(), Some("7"));
        assert!(rec.external_id.is_none());
        assert_eq!(rec.code.as_ref().map(ToString::to_string).as_deref(), Some("123"));
        assert_eq!(rec.debt, Some(json!("5.5")));
        assert!(rec.credit.is_none());
    }

    #[test]
    fn whole_floats_render_like_integers() {
        let render = |value: Value| IdentityValue::from_json(&value).unwrap().to_string();

        assert_eq!(render(json!(7.0)), render(json!(7)));
        assert_eq!(render(json!(7.0)), "7");
        assert_eq!(render(json!(-0.0)), "0");
        assert_eq!(render(json!(1e20)), "100000000000000000000");
        assert_eq!(render(json!(7.25)), "7.25");
        assert_eq!(render(json!(-12)), "-12");
    }

    #[test]
    fn null_fields_count_as_absent() {
        let rec = record(json!({"id": null, "externalId": "X-1", "debt": null}));

        assert!(rec.id.is_none());
        assert_eq!(rec.external_id, Some(IdentityValue::Text("X-1".into())));
        assert!(rec.debt.is_none());
        assert_eq!(rec.raw.len(), 3);
    }

    #[test]
    fn non_objects_are_rejected() {
        assert_eq!(ExternalRecord::try_from(json!([1, 2])), Err(json!([1, 2])));
        assert!(ExternalRecord::try_from(json!("text")).is_err());
    }

    #[test]
    fn stored_record_serializes_camel_case_numbers() {
        let stored = StoredRecord {
            external_id: "A1".into(),
            code: "10010001".into(),
            debt: Decimal::new(1550, 2),
            credit: Decimal::ZERO,
            raw_data: json!({"code": "10010001"}),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap(),
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["externalId"], json!("A1"));
        assert_eq!(value["debt"], json!(15.5));
        assert_eq!(value["rawData"]["code"], json!("10010001"));
    }
}
