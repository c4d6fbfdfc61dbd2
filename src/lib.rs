pub mod cli;
pub mod core;
pub mod pipeline;
pub mod scrapers;
pub mod seed;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::model::EntityRef;
use crate::scrapers::ScraperRegistry;
use crate::store::{KeyValueStore, RatesDb};
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    Seed,
    Scrape { bank: String },
    Rates { json: bool },
    Logs { bank: Option<String> },
    Remove(EntityRef),
    Restore(EntityRef),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxrates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Open the database
    let data_path = config.default_data_path()?;
    std::fs::create_dir_all(&data_path)
        .with_context(|| format!("Failed to create data directory: {}", data_path.display()))?;
    let kv_store = KeyValueStore::open(&data_path)
        .with_context(|| format!("Failed to open database in {}", data_path.display()))?;
    let db = RatesDb::new(&kv_store)?;

    let result = match command {
        AppCommand::Seed => cli::seed::seed(&db, &config).await,
        AppCommand::Scrape { bank } => {
            let registry = ScraperRegistry::from_config(&config)?;
            cli::scrape::scrape(&db, &registry, &bank).await
        }
        AppCommand::Rates { json } => cli::rates::rates(&db, json).await,
        AppCommand::Logs { bank } => cli::logs::logs(&db, bank.as_deref()).await,
        AppCommand::Remove(entity) => cli::admin::remove(&db, entity).await,
        AppCommand::Restore(entity) => cli::admin::restore(&db, entity).await,
    };

    // Flush even when the command failed; earlier writes are kept
    kv_store.persist()?;
    result
}
