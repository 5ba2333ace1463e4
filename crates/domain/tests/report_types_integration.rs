//! Integration tests for report and record types
//!
//! Covers the JSON shape served to report consumers and the bookkeeping of
//! report groups.

use chrono::DateTime;
use ledgersync_domain::{ExternalRecord, ReportGroup, StoredRecord, SyncOutcome};
use rust_decimal::Decimal;
use serde_json::{json, Value};

// ============================================================================
// ReportGroup
// ============================================================================

/// Groups keep exact decimal totals and a count that matches their items.
#[test]
fn test_report_group_accumulates_items() {
    let mut group = ReportGroup::new("100.10.001");
    group.push(stored("A", "10010001", Decimal::new(1005, 2), Decimal::ZERO)).unwrap();
    group.push(stored("B", "10010001", Decimal::new(495, 2), Decimal::new(1, 1))).unwrap();

    assert_eq!(group.count, 2);
    assert_eq!(group.count, group.items.len());
    assert_eq!(group.debt, Decimal::from(15));
    assert_eq!(group.credit, Decimal::new(1, 1));
}

/// A total that would overflow is refused and the group stays as it was.
#[test]
fn test_report_group_rejects_overflowing_total() {
    let mut group = ReportGroup::new("100.10.001");
    group.push(stored("A", "10010001", Decimal::MAX, Decimal::ZERO)).unwrap();

    let err = group.push(stored("B", "10010001", Decimal::MAX, Decimal::ZERO)).unwrap_err();

    assert_eq!(err.key, "100.10.001");
    assert_eq!(err.column, "debt");
    assert_eq!(group.count, 1);
    assert_eq!(group.debt, Decimal::MAX);
}

/// The served JSON uses plain numbers for amounts and camelCase item fields.
#[test]
fn test_report_group_json_shape() {
    let mut group = ReportGroup::new("200.20.002");
    group.push(stored("X", "20020002", Decimal::new(125, 1), Decimal::ZERO)).unwrap();

    let value = serde_json::to_value(&group).unwrap();

    assert_eq!(value["key"], json!("200.20.002"));
    assert_eq!(value["debt"], json!(12.5));
    assert_eq!(value["credit"], json!(0.0));
    assert_eq!(value["count"], json!(1));

    let item = &value["items"][0];
    for field in ["externalId", "code", "debt", "credit", "rawData", "createdAt", "updatedAt"] {
        assert!(item.get(field).is_some(), "missing {field}");
    }
}

// ============================================================================
// ExternalRecord / SyncOutcome
// ============================================================================

/// Unknown upstream fields survive untouched in `raw`.
#[test]
fn test_external_record_keeps_unknown_fields() {
    let payload = json!({"code": "300", "branch": {"id": 4}, "tags": ["a"]});
    let record = ExternalRecord::try_from(payload.clone()).unwrap();

    assert_eq!(record.raw_value(), payload);
}

#[test]
fn test_sync_outcome_serialization() {
    let completed =
        serde_json::to_value(SyncOutcome::Completed { fetched: 3, upserted: 2 }).unwrap();
    assert_eq!(completed, json!({"status": "completed", "fetched": 3, "upserted": 2}));

    let skipped: Value = serde_json::to_value(SyncOutcome::Skipped).unwrap();
    assert_eq!(skipped, json!({"status": "skipped"}));
    assert_eq!(SyncOutcome::Skipped.upserted(), 0);
}

fn stored(external_id: &str, code: &str, debt: Decimal, credit: Decimal) -> StoredRecord {
    let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    StoredRecord {
        external_id: external_id.into(),
        code: code.into(),
        debt,
        credit,
        raw_data: json!({"code": code}),
        created_at: at,
        updated_at: at,
    }
}
