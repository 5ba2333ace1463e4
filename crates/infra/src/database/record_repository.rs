//! SQLite implementation of the ledger record store

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgersync_core::{Clock, RecordStore, SystemClock};
use ledgersync_domain::{LedgerSyncError, RecordFields, Result, StoredRecord};
use rust_decimal::Decimal;
use rusqlite::params;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};

const UPSERT_SQL: &str = "INSERT INTO ledger_records \
     (external_id, code, debt, credit, raw_data, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
     ON CONFLICT(external_id) DO UPDATE SET \
     code = excluded.code, debt = excluded.debt, credit = excluded.credit, \
     raw_data = excluded.raw_data, updated_at = excluded.updated_at";

const SELECT_ALL_SQL: &str = "SELECT external_id, code, debt, credit, raw_data, created_at, \
     updated_at FROM ledger_records ORDER BY rowid";

/// Ledger rows in insertion order, upserted by `external_id`.
pub struct SqliteRecordRepository {
    db: Arc<DbManager>,
    clock: Arc<dyn Clock>,
}

impl SqliteRecordRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db, clock: Arc::new(SystemClock) }
    }

    /// Replace the time source used for `created_at` / `updated_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<u64> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            conn.query_row("SELECT COUNT(*) FROM ledger_records", [], |row| row.get::<_, i64>(0))
                .map(|count| count.max(0) as u64)
                .map_err(map_sql_error)
        })
        .await
        .map_err(|e| LedgerSyncError::Internal(e.to_string()))?
    }
}

type RawRow = (String, String, String, String, String, i64, i64);

fn into_stored(row: RawRow) -> Result<StoredRecord> {
    let (external_id, code, debt, credit, raw_data, created_at, updated_at) = row;

    let decimal = |column: &str, text: &str| {
        Decimal::from_str(text).map_err(|e| {
            LedgerSyncError::Database(format!("invalid {column} for {external_id}: {e}"))
        })
    };
    let timestamp = |column: &str, millis: i64| {
        DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            LedgerSyncError::Database(format!("invalid {column} for {external_id}: {millis}"))
        })
    };

    Ok(StoredRecord {
        debt: decimal("debt", &debt)?,
        credit: decimal("credit", &credit)?,
        raw_data: serde_json::from_str(&raw_data).map_err(|e| {
            LedgerSyncError::Database(format!("invalid raw_data for {external_id}: {e}"))
        })?,
        created_at: timestamp("created_at", created_at)?,
        updated_at: timestamp("updated_at", updated_at)?,
        external_id,
        code,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordRepository {
    async fn upsert(&self, external_id: &str, fields: &RecordFields) -> Result<()> {
        let db = self.db.clone();
        let external_id = external_id.to_owned();
        let code = fields.code.clone();
        let debt = fields.debt.to_string();
        let credit = fields.credit.to_string();
        let raw_data = serde_json::to_string(&fields.raw_data)
            .map_err(|e| LedgerSyncError::Internal(e.to_string()))?;
        let now = self.clock.utc_now().timestamp_millis();

        tokio::task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            conn.execute(UPSERT_SQL, params![external_id, code, debt, credit, raw_data, now])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(|e| LedgerSyncError::Internal(e.to_string()))?
    }

    async fn find_all(&self) -> Result<Vec<StoredRecord>> {
        let db = self.db.clone();
        let rows: Vec<RawRow> = tokio::task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(SELECT_ALL_SQL).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<RawRow>>>()
                .map_err(map_sql_error)?;
            Ok::<_, LedgerSyncError>(rows)
        })
        .await
        .map_err(|e| LedgerSyncError::Internal(e.to_string()))??;

        debug!(rows = rows.len(), "Loaded ledger records");
        rows.into_iter().map(into_stored).collect()
    }
}
