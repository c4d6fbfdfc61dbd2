pub mod ncba;
pub mod table;

use crate::core::config::AppConfig;
use crate::core::error::ScrapeFailure;
use crate::core::scraper::RateScraper;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use table::TableScraper;
use tracing::{debug, warn};

/// Maps bank names to the scraper that understands their rates page.
#[derive(Default)]
pub struct ScraperRegistry {
    scrapers: HashMap<String, Arc<dyn RateScraper>>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup key for a bank name: trimmed and lower-cased.
    pub fn lookup_key(bank_name: &str) -> String {
        bank_name.trim().to_lowercase()
    }

    /// Registers `scraper` for `bank_name`, replacing any earlier registration.
    pub fn register(&mut self, bank_name: &str, scraper: Arc<dyn RateScraper>) {
        let key = Self::lookup_key(bank_name);
        if self.scrapers.insert(key.clone(), scraper).is_some() {
            warn!("Scraper for '{}' registered twice, keeping the last one", key);
        } else {
            debug!("Registered scraper for '{}'", key);
        }
    }

    pub fn resolve(&self, bank_name: &str) -> Result<Arc<dyn RateScraper>, ScrapeFailure> {
        self.scrapers
            .get(&Self::lookup_key(bank_name))
            .cloned()
            .ok_or_else(|| ScrapeFailure::ScraperNotFound(bank_name.to_string()))
    }

    pub fn bank_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.scrapers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Builds the startup registry: the built-in scrapers first, then the ones
    /// declared in the config, which may replace a built-in one.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let mut registry = Self::new();
        registry.register(
            ncba::BANK_NAME,
            Arc::new(ncba::table_scraper(ncba::NCBA_URL, client.clone())?),
        );

        for entry in &config.scrapers {
            let scraper = TableScraper::new(&entry.url, entry.layout.clone(), client.clone())
                .with_context(|| format!("Invalid scraper config for bank '{}'", entry.bank))?;
            registry.register(&entry.bank, Arc::new(scraper));
        }

        Ok(registry)
    }
}
