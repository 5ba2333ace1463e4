//! Report aggregation over the record store

use std::collections::BTreeMap;
use std::sync::Arc;

use ledgersync_domain::{ReportGroup, StoredRecord};
use tracing::{debug, instrument};

use super::errors::ReportError;
use super::key::record_key;
use crate::ports::RecordStore;

/// Builds the grouped ledger report from whatever the store holds now.
///
/// Nothing is cached; every call re-reads the store, so a report taken
/// during a sync may mix old and new rows.
pub struct ReportAggregator {
    store: Arc<dyn RecordStore>,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Read all stored records and group them.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Store`] if the store cannot be read and
    /// [`ReportError::Overflow`] if a group total is out of range.
    #[instrument(skip(self))]
    pub async fn build_report(&self) -> Result<Vec<ReportGroup>, ReportError> {
        let records = self.store.find_all().await?;
        let groups = aggregate(records)?;
        debug!(groups = groups.len(), "Report built");
        Ok(groups)
    }
}

/// Group records by key, preserving input order inside each group, and
/// return the groups sorted ascending by key.
///
/// # Errors
///
/// Returns [`ReportError::Overflow`] when a group's debt or credit sum
/// leaves the `Decimal` range.
pub fn aggregate(
    records: impl IntoIterator<Item = StoredRecord>,
) -> Result<Vec<ReportGroup>, ReportError> {
    let mut groups: BTreeMap<String, ReportGroup> = BTreeMap::new();
    for record in records {
        let key = record_key(&record);
        groups.entry(key).or_insert_with_key(|key| ReportGroup::new(key.clone())).push(record)?;
    }
    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use ledgersync_domain::{LedgerSyncError, RecordFields, Result as DomainResult, TotalOverflow};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn stored(external_id: &str, code: &str, debt: i64, credit: i64) -> StoredRecord {
        StoredRecord {
            external_id: external_id.into(),
            code: code.into(),
            debt: Decimal::from(debt),
            credit: Decimal::from(credit),
            raw_data: json!({"code": code}),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    struct FixedStore(DomainResult<Vec<StoredRecord>>);

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn upsert(&self, _: &str, _: &RecordFields) -> DomainResult<()> {
            Ok(())
        }

        async fn find_all(&self) -> DomainResult<Vec<StoredRecord>> {
            self.0.clone()
        }
    }

    #[test]
    fn same_key_records_are_summed() {
        let groups = aggregate(vec![
            stored("a", "10010001", 5, 0),
            stored("b", "10010001", 10, 0),
        ])
        .unwrap();

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.key, "100.10.001");
        assert_eq!(group.debt, Decimal::from(15));
        assert_eq!(group.credit, Decimal::ZERO);
        assert_eq!(group.count, 2);
        assert_eq!(group.items.len(), group.count);
        assert_eq!(group.items[0].external_id, "a");
        assert_eq!(group.items[1].external_id, "b");
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let groups = aggregate(vec![
            stored("z", "20010001", 1, 0),
            stored("y", "10010001", 2, 0),
            stored("x", "1001", 0, 3),
        ])
        .unwrap();

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["100.1", "100.10.001", "200.10.001"]);
    }

    #[test]
    fn empty_code_groups_by_external_id() {
        let groups = aggregate(vec![stored("EXT12345", "", 4, 1)]).unwrap();

        assert_eq!(groups[0].key, "EXT.12.345");
        assert_eq!(groups[0].credit, Decimal::ONE);
    }

    #[test]
    fn empty_store_gives_empty_report() {
        assert!(aggregate(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn overflowing_credit_total_is_an_error() {
        let mut first = stored("a", "10010001", 0, 0);
        first.credit = Decimal::MAX;
        let mut second = stored("b", "10010001", 0, 0);
        second.credit = Decimal::MAX;

        let err = aggregate(vec![first, second]).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Overflow(TotalOverflow { ref key, column: "credit" })
                if key == "100.10.001"
        ));
    }

    #[test]
    fn negative_totals_overflow_too() {
        let mut first = stored("a", "1001", 0, 0);
        first.debt = Decimal::MIN;
        let mut second = stored("b", "1001", 0, 0);
        second.debt = Decimal::MIN;

        assert!(matches!(aggregate(vec![first, second]), Err(ReportError::Overflow(_))));
    }

    #[tokio::test]
    async fn build_report_reads_store() {
        let aggregator = ReportAggregator::new(Arc::new(FixedStore(Ok(vec![
            stored("a", "20010001", 1, 0),
            stored("b", "10010001", 1, 0),
        ]))));

        let report = aggregator.build_report().await.unwrap();
        assert_eq!(report[0].key, "100.10.001");
        assert_eq!(report[1].key, "200.10.001");
    }

    #[tokio::test]
    async fn store_failure_becomes_report_error() {
        let aggregator = ReportAggregator::new(Arc::new(FixedStore(Err(
            LedgerSyncError::Database("locked".into()),
        ))));

        let err = aggregator.build_report().await.unwrap_err();
        assert!(matches!(err, ReportError::Store(msg) if msg.contains("locked")));
    }
}
