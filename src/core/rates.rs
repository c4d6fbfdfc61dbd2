//! Latest buy/sell rates per bank, shaped for the read API

use crate::core::model::{Id, RecordKind};
use crate::core::store::{RatesStore, RecordFilter, StoreResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRef {
    pub id: Id,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRates {
    pub id: Id,
    pub name: String,
    pub short_name: String,
    pub country_flag: Option<String>,
    pub buy: Option<RateRef>,
    pub sell: Option<RateRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankRates {
    pub id: Id,
    pub name: String,
    pub logo: Option<String>,
    pub currencies: Vec<CurrencyRates>,
}

/// Lists every bank with the currencies it has records for, each carrying the
/// most recent buy and sell record. Currencies are ordered by id.
pub async fn bank_currency_rates(store: &dyn RatesStore) -> StoreResult<Vec<BankRates>> {
    let mut result = Vec::new();

    for bank in store.list_banks().await? {
        let filter = RecordFilter {
            bank_id: Some(bank.id),
            ..Default::default()
        };
        let currency_ids: BTreeSet<Id> = store
            .list_records(filter)
            .await?
            .iter()
            .map(|record| record.currency_id)
            .collect();

        let mut currencies = Vec::new();
        for currency_id in currency_ids {
            let Some(currency) = store.get_currency(currency_id).await? else {
                continue;
            };
            let buy = store
                .latest_record(bank.id, currency.id, RecordKind::Buy)
                .await?;
            let sell = store
                .latest_record(bank.id, currency.id, RecordKind::Sell)
                .await?;

            currencies.push(CurrencyRates {
                id: currency.id,
                name: currency.name,
                short_name: currency.short_name,
                country_flag: currency.country_flag,
                buy: buy.map(|r| RateRef {
                    id: r.id,
                    value: r.value,
                }),
                sell: sell.map(|r| RateRef {
                    id: r.id,
                    value: r.value,
                }),
            });
        }

        result.push(BankRates {
            id: bank.id,
            name: bank.name,
            logo: bank.logo,
            currencies,
        });
    }

    Ok(result)
}
