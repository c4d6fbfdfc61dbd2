use crate::core::scraper::{RateScraper, RawRow, TableLayout};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{selector}': {e}"))
}

fn cell_selector(column: usize) -> Result<Selector> {
    if column == 0 {
        return Err(anyhow!("Table columns are 1-based, got 0"));
    }
    parse_selector(&format!("td:nth-child({column})"))
}

fn cell_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

impl TableLayout {
    /// Checks that every selector of the layout compiles.
    pub fn validate(&self) -> Result<()> {
        parse_selector(&self.row_selector)?;
        cell_selector(self.currency_column)?;
        cell_selector(self.buy_column)?;
        cell_selector(self.sell_column)?;
        Ok(())
    }

    /// Extracts one [`RawRow`] per element matched by `row_selector`.
    pub fn parse_rows(&self, html: &str) -> Result<Vec<RawRow>> {
        let rows = parse_selector(&self.row_selector)?;
        let currency = cell_selector(self.currency_column)?;
        let buy = cell_selector(self.buy_column)?;
        let sell = cell_selector(self.sell_column)?;

        let document = Html::parse_document(html);
        Ok(document
            .select(&rows)
            .map(|row| RawRow {
                currency: cell_text(&row, &currency),
                buy: cell_text(&row, &buy),
                sell: cell_text(&row, &sell),
            })
            .collect())
    }
}

/// Scrapes rates from an HTML table on a single page.
pub struct TableScraper {
    url: String,
    layout: TableLayout,
    client: reqwest::Client,
}

impl TableScraper {
    pub fn new(url: &str, layout: TableLayout, client: reqwest::Client) -> Result<Self> {
        layout
            .validate()
            .with_context(|| format!("Invalid table layout for {url}"))?;
        Ok(Self {
            url: url.to_string(),
            layout,
            client,
        })
    }
}

#[async_trait]
impl RateScraper for TableScraper {
    async fn scrape(&self) -> Result<Vec<RawRow>> {
        debug!("Requesting rates page {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Can't download rates page {}: {}", self.url, status);
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text from {}", self.url))?;

        let rows = self.layout.parse_rows(&html)?;
        debug!("Extracted {} rows from {}", rows.len(), self.url);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>Code</th><th>Buy</th><th>Sell</th></tr></thead>
          <tbody>
            <tr><td> USD </td><td>128.50</td><td>132.00</td></tr>
            <tr><td>EUR</td><td><span>139.10</span></td><td></td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    async fn create_mock_server(status_code: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_parse_rows() {
        let rows = TableLayout::default().parse_rows(PAGE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRow::new("USD", "128.50", "132.00"));
        assert_eq!(rows[1].currency.as_deref(), Some("EUR"));
        assert_eq!(rows[1].buy.as_deref(), Some("139.10"));
        assert!(rows[1].sell.is_none());
    }

    #[test]
    fn test_parse_rows_without_table() {
        let rows = TableLayout::default()
            .parse_rows("<html><body><p>Maintenance</p></body></html>")
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let layout = TableLayout {
            row_selector: "tr[".to_string(),
            ..Default::default()
        };
        assert!(layout.validate().is_err());

        let layout = TableLayout {
            buy_column: 0,
            ..Default::default()
        };
        assert!(layout.validate().is_err());
    }

    #[tokio::test]
    async fn test_scrape_fetches_and_parses() {
        let mock_server = create_mock_server(200, PAGE).await;
        let url = format!("{}/rates", mock_server.uri());
        let scraper =
            TableScraper::new(&url, TableLayout::default(), reqwest::Client::new()).unwrap();

        let rows = scraper.scrape().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].currency.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn test_scrape_http_error() {
        let mock_server = create_mock_server(503, "down").await;
        let url = format!("{}/rates", mock_server.uri());
        let scraper =
            TableScraper::new(&url, TableLayout::default(), reqwest::Client::new()).unwrap();

        let err = scraper.scrape().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_scrape_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let url = format!("{}/rates", mock_server.uri());
        let scraper = TableScraper::new(&url, TableLayout::default(), client).unwrap();

        assert!(scraper.scrape().await.is_err());
    }
}
