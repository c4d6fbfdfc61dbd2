//! Persistence abstractions for banks, currencies, records and run logs

use crate::core::error::StoreError;
use crate::core::model::{
    AggregatorLog, Bank, Currency, EntityRef, Id, LogKind, LogStatus, NewBank, NewCurrency,
    NewRecord, Record, RecordKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub bank_id: Option<Id>,
    pub currency_id: Option<Id>,
    pub kind: Option<RecordKind>,
    pub include_deleted: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        self.bank_id.is_none_or(|id| record.bank_id == id)
            && self.currency_id.is_none_or(|id| record.currency_id == id)
            && self.kind.is_none_or(|kind| record.kind == kind)
            && (self.include_deleted || record.deleted_at.is_none())
    }
}

/// Reads skip soft-deleted rows unless stated otherwise.
#[async_trait]
pub trait RatesStore: Send + Sync {
    async fn create_bank(&self, bank: NewBank) -> StoreResult<Bank>;
    /// Replaces the presentation fields of a live bank.
    async fn update_bank(&self, id: Id, bank: NewBank) -> StoreResult<Bank>;
    async fn get_bank(&self, id: Id) -> StoreResult<Option<Bank>>;
    async fn find_bank_by_name(&self, name: &str) -> StoreResult<Option<Bank>>;
    async fn list_banks(&self) -> StoreResult<Vec<Bank>>;
    async fn touch_last_checked(&self, id: Id, at: DateTime<Utc>) -> StoreResult<()>;

    async fn create_currency(&self, currency: NewCurrency) -> StoreResult<Currency>;
    async fn get_currency(&self, id: Id) -> StoreResult<Option<Currency>>;
    /// Lowest id wins when several currencies share a code.
    async fn find_currency_by_code(&self, code: &str) -> StoreResult<Option<Currency>>;
    async fn list_currencies(&self) -> StoreResult<Vec<Currency>>;

    async fn create_record(&self, record: NewRecord) -> StoreResult<Record>;
    async fn get_record(&self, id: Id) -> StoreResult<Option<Record>>;
    async fn list_records(&self, filter: RecordFilter) -> StoreResult<Vec<Record>>;
    async fn latest_record(
        &self,
        bank_id: Id,
        currency_id: Id,
        kind: RecordKind,
    ) -> StoreResult<Option<Record>>;

    async fn create_log(
        &self,
        bank_id: Id,
        kind: LogKind,
        status: LogStatus,
    ) -> StoreResult<AggregatorLog>;
    async fn list_logs(&self, bank_id: Option<Id>) -> StoreResult<Vec<AggregatorLog>>;

    /// Marks the row deleted and returns the deletion timestamp.
    async fn remove(&self, entity: EntityRef) -> StoreResult<DateTime<Utc>>;
    async fn restore(&self, entity: EntityRef) -> StoreResult<()>;
}
