//! Aggregated report types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::StoredRecord;

/// One hierarchical account group in the ledger report.
///
/// `count` always equals `items.len()`; `debt` and `credit` are the exact
/// sums over `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportGroup {
    pub key: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub debt: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
    pub count: usize,
    pub items: Vec<StoredRecord>,
}

impl ReportGroup {
    /// Empty group for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            debt: Decimal::ZERO,
            credit: Decimal::ZERO,
            count: 0,
            items: Vec::new(),
        }
    }

    /// Fold one record into the running totals.
    ///
    /// # Errors
    ///
    /// Returns [`TotalOverflow`] if either total would leave the `Decimal`
    /// range. The group is left unchanged in that case.
    pub fn push(&mut self, record: StoredRecord) -> Result<(), TotalOverflow> {
        let debt = self.debt.checked_add(record.debt).ok_or_else(|| self.overflow("debt"))?;
        let credit =
            self.credit.checked_add(record.credit).ok_or_else(|| self.overflow("credit"))?;
        self.debt = debt;
        self.credit = credit;
        self.count += 1;
        self.items.push(record);
        Ok(())
    }

    fn overflow(&self, column: &'static str) -> TotalOverflow {
        TotalOverflow { key: self.key.clone(), column }
    }
}

/// A group total exceeded what `Decimal` can represent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{column} total of group {key} is out of range")]
pub struct TotalOverflow {
    pub key: String,
    pub column: &'static str,
}
