//! Reference banks and currencies, and the upsert that loads them

use crate::core::model::{NewBank, NewCurrency};
use crate::core::store::{RatesStore, StoreResult};
use tracing::{debug, info};

pub fn default_banks() -> Vec<NewBank> {
    vec![NewBank {
        name: "NCBA".to_string(),
        logo: Some("https://x.com/NCBABankKenya/photo".to_string()),
        buy_link: Some("https://ke.ncbagroup.com/forex-rates/".to_string()),
        sell_link: Some("https://ke.ncbagroup.com/forex-rates/".to_string()),
    }]
}

pub fn default_currencies() -> Vec<NewCurrency> {
    [
        ("United States", "United States Dollar", "USD"),
        ("European Union", "Euro", "EUR"),
        ("United Kingdom", "Pound Sterling", "GBP"),
        ("Switzerland", "Swiss Franc", "CHF"),
        ("Japan", "Japanese Yen", "JPY"),
        ("South Africa", "South African Rand", "ZAR"),
        ("Norway", "Norwegian Krone", "NOK"),
        ("Denmark", "Danish Krone", "DKK"),
        ("Sweden", "Swedish Krona", "SEK"),
        ("Canada", "Canadian Dollar", "CAD"),
        ("Australia", "Australian Dollar", "AUD"),
        ("Uganda", "Ugandan Shilling", "UGX"),
        ("Tanzania", "Tanzanian Shilling", "TZS"),
        ("Hong Kong", "Hong Kong Dollar", "HKD"),
        ("Thailand", "Thai Baht", "THB"),
        ("United Arab Emirates", "UAE Dirham", "AED"),
        ("India", "Indian Rupee", "INR"),
        ("Rwanda", "Rwandan Franc", "RWF"),
        ("Burundi", "Burundian Franc", "BIF"),
        ("South Sudan", "South Sudanese Pound", "SSP"),
    ]
    .into_iter()
    .map(|(country, name, code)| NewCurrency {
        short_name: code.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        country_flag: None,
    })
    .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub banks_created: usize,
    pub banks_updated: usize,
    pub banks_unchanged: usize,
    pub currencies_created: usize,
    pub currencies_existing: usize,
}

/// Creates missing banks and currencies. Banks are matched by name and get
/// their logo and links refreshed; currencies are matched on code, name and
/// country and are never modified.
pub async fn seed(
    store: &dyn RatesStore,
    banks: &[NewBank],
    currencies: &[NewCurrency],
) -> StoreResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for bank in banks {
        match store.find_bank_by_name(&bank.name).await? {
            Some(existing)
                if existing.logo != bank.logo
                    || existing.buy_link != bank.buy_link
                    || existing.sell_link != bank.sell_link =>
            {
                store.update_bank(existing.id, bank.clone()).await?;
                info!("Updated bank: {}", bank.name);
                summary.banks_updated += 1;
            }
            Some(_) => {
                debug!("No changes for bank: {}", bank.name);
                summary.banks_unchanged += 1;
            }
            None => {
                store.create_bank(bank.clone()).await?;
                info!("Created new bank: {}", bank.name);
                summary.banks_created += 1;
            }
        }
    }

    let mut existing = store.list_currencies().await?;
    for currency in currencies {
        let found = existing.iter().any(|c| {
            c.short_name == currency.short_name
                && c.name == currency.name
                && c.country == currency.country
        });
        if found {
            debug!("Currency already present: {}", currency.short_name);
            summary.currencies_existing += 1;
        } else {
            let created = store.create_currency(currency.clone()).await?;
            info!(
                "Created currency: {} ({}) for {}",
                currency.name, currency.short_name, currency.country
            );
            existing.push(created);
            summary.currencies_created += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RatesDb;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = RatesDb::in_memory().unwrap();

        let first = seed(&db, &default_banks(), &default_currencies())
            .await
            .unwrap();
        assert_eq!(first.banks_created, 1);
        assert_eq!(first.currencies_created, 20);

        let second = seed(&db, &default_banks(), &default_currencies())
            .await
            .unwrap();
        assert_eq!(
            second,
            SeedSummary {
                banks_unchanged: 1,
                currencies_existing: 20,
                ..Default::default()
            }
        );
        assert_eq!(db.list_banks().await.unwrap().len(), 1);
        assert_eq!(db.list_currencies().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_seed_updates_changed_bank() {
        let db = RatesDb::in_memory().unwrap();
        seed(&db, &default_banks(), &[]).await.unwrap();

        let mut banks = default_banks();
        banks[0].logo = Some("https://example.com/new-logo.png".to_string());
        let summary = seed(&db, &banks, &[]).await.unwrap();
        assert_eq!(summary.banks_updated, 1);

        let bank = db.find_bank_by_name("NCBA").await.unwrap().unwrap();
        assert_eq!(bank.id, 1);
        assert_eq!(bank.logo.as_deref(), Some("https://example.com/new-logo.png"));
    }

    #[tokio::test]
    async fn test_seed_skips_repeated_currency_in_one_run() {
        let db = RatesDb::in_memory().unwrap();
        let usd = default_currencies().remove(0);

        let summary = seed(&db, &[], &[usd.clone(), usd]).await.unwrap();
        assert_eq!(summary.currencies_created, 1);
        assert_eq!(summary.currencies_existing, 1);
        assert_eq!(db.list_currencies().await.unwrap().len(), 1);
    }

    #[test]
    fn test_default_currency_codes_are_unique() {
        let mut codes: Vec<String> = default_currencies()
            .into_iter()
            .map(|c| c.short_name)
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 20);
        assert!(codes.iter().all(|c| c.len() == 3));
    }
}
