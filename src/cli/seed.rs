use crate::core::config::AppConfig;
use crate::core::store::RatesStore;
use anyhow::Result;

/// Loads the configured banks and currencies and prints what changed.
pub async fn seed(store: &dyn RatesStore, config: &AppConfig) -> Result<()> {
    let summary = crate::seed::seed(store, &config.banks, &config.currencies).await?;
    println!(
        "Banks: {} created, {} updated, {} unchanged",
        summary.banks_created, summary.banks_updated, summary.banks_unchanged
    );
    println!(
        "Currencies: {} created, {} already present",
        summary.currencies_created, summary.currencies_existing
    );
    Ok(())
}
