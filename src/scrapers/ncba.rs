//! NCBA Bank Kenya publishes its rates in a bordered table: the second
//! column holds the currency code, the third and fourth the buy and sell rates.

use super::table::TableScraper;
use crate::core::scraper::TableLayout;
use anyhow::Result;

pub const BANK_NAME: &str = "NCBA";
pub const NCBA_URL: &str = "https://ke.ncbagroup.com/forex-rates/";

pub fn layout() -> TableLayout {
    TableLayout {
        row_selector: "table.table-bordered tbody tr".to_string(),
        currency_column: 2,
        buy_column: 3,
        sell_column: 4,
    }
}

pub fn table_scraper(url: &str, client: reqwest::Client) -> Result<TableScraper> {
    TableScraper::new(url, layout(), client)
}
