use crate::core::collection::KeyValueCollection;
use crate::core::error::StoreError;
use crate::core::model::{
    AggregatorLog, Bank, Currency, EntityRef, Id, LogKind, LogStatus, NewBank, NewCurrency,
    NewRecord, Record, RecordKind, SoftDelete, VALUE_MAX_DIGITS, VALUE_SCALE,
};
use crate::core::store::{RatesStore, RecordFilter, StoreResult};
use crate::store::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const SEQUENCES: &str = "sequences";

/// Typed view over a collection, keyed by big-endian ids so scans come back
/// in creation order.
struct Table<T> {
    name: &'static str,
    entity: &'static str,
    collection: Arc<dyn KeyValueCollection>,
    _marker: PhantomData<T>,
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn open(store: &KeyValueStore, name: &'static str, entity: &'static str) -> StoreResult<Self> {
        Ok(Self {
            name,
            entity,
            collection: store.collection(name)?,
            _marker: PhantomData,
        })
    }

    async fn get(&self, id: Id) -> StoreResult<Option<T>> {
        match self.collection.get(&id.to_be_bytes()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, id: Id, row: &T) -> StoreResult<()> {
        self.collection
            .put(&id.to_be_bytes(), &serde_json::to_vec(row)?)
            .await
    }

    async fn all(&self) -> StoreResult<Vec<T>> {
        self.collection
            .scan()
            .await?
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).map_err(StoreError::from))
            .collect()
    }
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned + SoftDelete + Send + Sync,
{
    async fn get_live(&self, id: Id) -> StoreResult<Option<T>> {
        Ok(self.get(id).await?.filter(|row| !row.is_deleted()))
    }

    async fn all_live(&self) -> StoreResult<Vec<T>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|row| !row.is_deleted())
            .collect())
    }

    async fn mark_deleted(&self, id: Id, deleted_at: Option<DateTime<Utc>>) -> StoreResult<()> {
        let mut row = self.get(id).await?.ok_or(StoreError::NotFound {
            entity: self.entity,
            id,
        })?;
        row.set_deleted_at(deleted_at, Utc::now());
        self.put(id, &row).await
    }
}

/// Rounds `value` to the stored precision and rejects values with too many digits.
pub fn quantize_value(value: Decimal) -> StoreResult<Decimal> {
    let mut quantized =
        value.round_dp_with_strategy(VALUE_SCALE, RoundingStrategy::MidpointNearestEven);
    quantized.rescale(VALUE_SCALE);

    let digits = quantized.mantissa().unsigned_abs().to_string().len();
    if digits > VALUE_MAX_DIGITS {
        return Err(StoreError::InvalidValue(format!(
            "{value} has more than {VALUE_MAX_DIGITS} digits"
        )));
    }
    Ok(quantized)
}

/// The rates tables on top of a [`KeyValueStore`].
pub struct RatesDb {
    banks: Table<Bank>,
    currencies: Table<Currency>,
    records: Table<Record>,
    logs: Table<AggregatorLog>,
    sequences: Arc<dyn KeyValueCollection>,
    id_lock: Mutex<()>,
}

impl RatesDb {
    pub fn new(store: &KeyValueStore) -> StoreResult<Self> {
        Ok(Self {
            banks: Table::open(store, "banks", "bank")?,
            currencies: Table::open(store, "currencies", "currency")?,
            records: Table::open(store, "records", "record")?,
            logs: Table::open(store, "aggregator_logs", "aggregator log")?,
            sequences: store.collection(SEQUENCES)?,
            id_lock: Mutex::new(()),
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::new(&KeyValueStore::in_memory())
    }

    async fn next_id(&self, table: &str) -> StoreResult<Id> {
        let _guard = self.id_lock.lock().await;
        let last = match self.sequences.get(table.as_bytes()).await? {
            Some(bytes) => serde_json::from_slice::<Id>(&bytes)?,
            None => 0,
        };
        let next = last + 1;
        self.sequences
            .put(table.as_bytes(), &serde_json::to_vec(&next)?)
            .await?;
        Ok(next)
    }

    async fn live_bank(&self, id: Id) -> StoreResult<Bank> {
        self.banks
            .get_live(id)
            .await?
            .ok_or(StoreError::MissingReference { entity: "bank", id })
    }
}

#[async_trait]
impl RatesStore for RatesDb {
    async fn create_bank(&self, bank: NewBank) -> StoreResult<Bank> {
        let now = Utc::now();
        let row = Bank {
            id: self.next_id(self.banks.name).await?,
            name: bank.name,
            logo: bank.logo,
            buy_link: bank.buy_link,
            sell_link: bank.sell_link,
            last_checked: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.banks.put(row.id, &row).await?;
        debug!(id = row.id, name = %row.name, "Created bank");
        Ok(row)
    }

    async fn update_bank(&self, id: Id, bank: NewBank) -> StoreResult<Bank> {
        let mut row = self
            .banks
            .get_live(id)
            .await?
            .ok_or(StoreError::NotFound { entity: "bank", id })?;
        row.name = bank.name;
        row.logo = bank.logo;
        row.buy_link = bank.buy_link;
        row.sell_link = bank.sell_link;
        row.updated_at = Utc::now();
        self.banks.put(id, &row).await?;
        Ok(row)
    }

    async fn get_bank(&self, id: Id) -> StoreResult<Option<Bank>> {
        self.banks.get_live(id).await
    }

    async fn find_bank_by_name(&self, name: &str) -> StoreResult<Option<Bank>> {
        Ok(self
            .banks
            .all_live()
            .await?
            .into_iter()
            .find(|bank| bank.name == name))
    }

    async fn list_banks(&self) -> StoreResult<Vec<Bank>> {
        self.banks.all_live().await
    }

    async fn touch_last_checked(&self, id: Id, at: DateTime<Utc>) -> StoreResult<()> {
        let mut row = self
            .banks
            .get(id)
            .await?
            .ok_or(StoreError::NotFound { entity: "bank", id })?;
        row.last_checked = Some(at);
        row.updated_at = at;
        self.banks.put(id, &row).await
    }

    async fn create_currency(&self, currency: NewCurrency) -> StoreResult<Currency> {
        let now = Utc::now();
        let row = Currency {
            id: self.next_id(self.currencies.name).await?,
            short_name: currency.short_name,
            name: currency.name,
            country: currency.country,
            country_flag: currency.country_flag,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.currencies.put(row.id, &row).await?;
        debug!(id = row.id, code = %row.short_name, "Created currency");
        Ok(row)
    }

    async fn get_currency(&self, id: Id) -> StoreResult<Option<Currency>> {
        self.currencies.get_live(id).await
    }

    async fn find_currency_by_code(&self, code: &str) -> StoreResult<Option<Currency>> {
        Ok(self
            .currencies
            .all_live()
            .await?
            .into_iter()
            .find(|currency| currency.short_name == code))
    }

    async fn list_currencies(&self) -> StoreResult<Vec<Currency>> {
        self.currencies.all_live().await
    }

    async fn create_record(&self, record: NewRecord) -> StoreResult<Record> {
        self.live_bank(record.bank_id).await?;
        self.currencies
            .get_live(record.currency_id)
            .await?
            .ok_or(StoreError::MissingReference {
                entity: "currency",
                id: record.currency_id,
            })?;
        let value = quantize_value(record.value)?;

        let now = Utc::now();
        let row = Record {
            id: self.next_id(self.records.name).await?,
            bank_id: record.bank_id,
            currency_id: record.currency_id,
            kind: record.kind,
            value,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.records.put(row.id, &row).await?;
        debug!(id = row.id, kind = %row.kind, value = %row.value, "Created record");
        Ok(row)
    }

    async fn get_record(&self, id: Id) -> StoreResult<Option<Record>> {
        self.records.get_live(id).await
    }

    async fn list_records(&self, filter: RecordFilter) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .all()
            .await?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn latest_record(
        &self,
        bank_id: Id,
        currency_id: Id,
        kind: RecordKind,
    ) -> StoreResult<Option<Record>> {
        let filter = RecordFilter {
            bank_id: Some(bank_id),
            currency_id: Some(currency_id),
            kind: Some(kind),
            include_deleted: false,
        };
        Ok(self.list_records(filter).await?.pop())
    }

    async fn create_log(
        &self,
        bank_id: Id,
        kind: LogKind,
        status: LogStatus,
    ) -> StoreResult<AggregatorLog> {
        self.live_bank(bank_id).await?;

        let now = Utc::now();
        let row = AggregatorLog {
            id: self.next_id(self.logs.name).await?,
            bank_id,
            kind,
            status,
            created_at: now,
            updated_at: now,
        };
        self.logs.put(row.id, &row).await?;
        debug!(id = row.id, bank_id, %status, "Created aggregator log");
        Ok(row)
    }

    async fn list_logs(&self, bank_id: Option<Id>) -> StoreResult<Vec<AggregatorLog>> {
        Ok(self
            .logs
            .all()
            .await?
            .into_iter()
            .filter(|log| bank_id.is_none_or(|id| log.bank_id == id))
            .collect())
    }

    async fn remove(&self, entity: EntityRef) -> StoreResult<DateTime<Utc>> {
        let now = Utc::now();
        match entity {
            EntityRef::Bank(id) => self.banks.mark_deleted(id, Some(now)).await?,
            EntityRef::Currency(id) => self.currencies.mark_deleted(id, Some(now)).await?,
            EntityRef::Record(id) => self.records.mark_deleted(id, Some(now)).await?,
        }
        debug!(%entity, "Soft-deleted");
        Ok(now)
    }

    async fn restore(&self, entity: EntityRef) -> StoreResult<()> {
        match entity {
            EntityRef::Bank(id) => self.banks.mark_deleted(id, None).await?,
            EntityRef::Currency(id) => self.currencies.mark_deleted(id, None).await?,
            EntityRef::Record(id) => self.records.mark_deleted(id, None).await?,
        }
        debug!(%entity, "Restored");
        Ok(())
    }
}
