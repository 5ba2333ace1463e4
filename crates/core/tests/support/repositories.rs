//! In-memory port implementations for testing

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgersync_core::ports::{LedgerSource, RecordStore};
use ledgersync_domain::{
    ExternalRecord, LedgerSyncError, RecordFields, Result as DomainResult, StoredRecord,
};
use serde_json::Value;

/// Insertion-ordered in-memory store with upsert-by-identity semantics.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<StoredRecord>>,
    tick: Mutex<i64>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.rows.lock().unwrap().clone()
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut tick = self.tick.lock().unwrap();
        *tick += 1;
        DateTime::from_timestamp(*tick, 0).unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(&self, external_id: &str, fields: &RecordFields) -> DomainResult<()> {
        let now = self.next_timestamp();
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.external_id == external_id) {
            Some(row) => {
                row.code = fields.code.clone();
                row.debt = fields.debt;
                row.credit = fields.credit;
                row.raw_data = fields.raw_data.clone();
                row.updated_at = now;
            }
            None => rows.push(StoredRecord {
                external_id: external_id.to_string(),
                code: fields.code.clone(),
                debt: fields.debt,
                credit: fields.credit,
                raw_data: fields.raw_data.clone(),
                created_at: now,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<StoredRecord>> {
        Ok(self.snapshot())
    }
}

/// Serves a replaceable batch of upstream items, or a fixed error.
#[derive(Default)]
pub struct StaticLedgerSource {
    batch: Mutex<Vec<Value>>,
    failure: Mutex<Option<LedgerSyncError>>,
}

impl StaticLedgerSource {
    pub fn new(batch: Vec<Value>) -> Self {
        Self { batch: Mutex::new(batch), failure: Mutex::new(None) }
    }

    pub fn set_batch(&self, batch: Vec<Value>) {
        *self.batch.lock().unwrap() = batch;
    }

    pub fn fail_with(&self, err: LedgerSyncError) {
        *self.failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl LedgerSource for StaticLedgerSource {
    async fn fetch_records(&self) -> DomainResult<Vec<ExternalRecord>> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .batch
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .filter_map(|value| ExternalRecord::try_from(value).ok())
            .collect())
    }
}
