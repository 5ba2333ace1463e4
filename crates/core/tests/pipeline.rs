//! Sync-then-report pipeline over in-memory ports.

mod support;

use std::sync::Arc;

use ledgersync_core::{RecordReconciler, ReportAggregator, SyncErrorCategory};
use ledgersync_domain::{LedgerSyncError, SyncOutcome};
use rust_decimal::Decimal;
use serde_json::json;
use support::repositories::{MemoryRecordStore, StaticLedgerSource};

fn pipeline(
    batch: Vec<serde_json::Value>,
) -> (Arc<StaticLedgerSource>, Arc<MemoryRecordStore>, RecordReconciler, ReportAggregator) {
    let source = Arc::new(StaticLedgerSource::new(batch));
    let store = Arc::new(MemoryRecordStore::new());
    let reconciler = RecordReconciler::new(source.clone(), store.clone());
    let aggregator = ReportAggregator::new(store.clone());
    (source, store, reconciler, aggregator)
}

#[tokio::test]
async fn repeated_sync_does_not_duplicate_rows() {
    let batch = vec![
        json!({"id": 1, "code": "10010001", "debt": 5}),
        json!({"id": 2, "code": "10010001", "debt": "10"}),
        json!({"code": "20010001", "credit": 3.25}),
        json!({"label": "no identity"}),
    ];
    let (source, store, reconciler, _) = pipeline(batch.clone());

    reconciler.sync().await.unwrap();
    let first = store.snapshot();

    source.set_batch(batch);
    reconciler.sync().await.unwrap();
    let second = store.snapshot();

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 4);
    for (before, after) in first.iter().zip(&second) {
        assert_eq!(before.external_id, after.external_id);
        assert_eq!(before.created_at, after.created_at);
        assert!(after.updated_at > before.updated_at);
    }
}

#[tokio::test]
async fn second_sync_values_win() {
    let (source, store, reconciler, _) =
        pipeline(vec![json!({"externalId": "E-1", "code": "100", "debt": 1})]);
    reconciler.sync().await.unwrap();

    source.set_batch(vec![json!({"externalId": "E-1", "code": "100", "debt": 8, "memo": "x"})]);
    reconciler.sync().await.unwrap();

    let rows = store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].debt, Decimal::from(8));
    assert_eq!(rows[0].raw_data["memo"], json!("x"));
}

#[tokio::test]
async fn report_reflects_synced_rows() {
    let (_, _, reconciler, aggregator) = pipeline(vec![
        json!({"id": "b", "code": "20010001", "debt": 1}),
        json!({"id": "a1", "code": "10010001", "debt": 5}),
        json!({"id": "a2", "code": "10010001", "debt": 10}),
    ]);

    let outcome = reconciler.sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { fetched: 3, upserted: 3 });

    let report = aggregator.build_report().await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].key, "100.10.001");
    assert_eq!(report[0].debt, Decimal::from(15));
    assert_eq!(report[0].credit, Decimal::ZERO);
    assert_eq!(report[0].count, 2);
    assert_eq!(report[1].key, "200.10.001");
}

#[tokio::test]
async fn failed_fetch_leaves_store_untouched() {
    let (source, store, reconciler, _) = pipeline(vec![json!({"id": 1, "debt": 2})]);
    reconciler.sync().await.unwrap();

    source.fail_with(LedgerSyncError::Network("connection refused".into()));
    let err = reconciler.sync().await.unwrap_err();

    assert_eq!(err.category(), SyncErrorCategory::Upstream);
    assert_eq!(store.snapshot().len(), 1);
    assert_eq!(store.snapshot()[0].debt, Decimal::from(2));
}

#[tokio::test]
async fn non_object_items_are_not_stored() {
    let (_, store, reconciler, _) =
        pipeline(vec![json!(42), json!("text"), json!({"id": "ok"}), json!(null)]);

    let outcome = reconciler.sync().await.unwrap();

    assert_eq!(outcome.upserted(), 1);
    assert_eq!(store.snapshot()[0].external_id, "ok");
}
