//! Bank page extraction abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One table row as published on a bank's rates page.
///
/// Cells are kept as the raw text; `None` means the cell was missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub currency: Option<String>,
    pub buy: Option<String>,
    pub sell: Option<String>,
}

impl RawRow {
    pub fn new(currency: &str, buy: &str, sell: &str) -> Self {
        Self {
            currency: Some(currency.to_string()),
            buy: Some(buy.to_string()),
            sell: Some(sell.to_string()),
        }
    }
}

#[async_trait]
pub trait RateScraper: Send + Sync {
    /// Fetches the rates page and returns its rows. An empty page is not an error.
    async fn scrape(&self) -> Result<Vec<RawRow>>;
}

/// Where the rates live in an HTML page: one row per currency, columns are
/// 1-based like CSS `nth-child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub row_selector: String,
    pub currency_column: usize,
    pub buy_column: usize,
    pub sell_column: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            row_selector: "table tbody tr".to_string(),
            currency_column: 1,
            buy_column: 2,
            sell_column: 3,
        }
    }
}
