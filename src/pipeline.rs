//! The scrape-and-persist run for a single bank.
//!
//! A run resolves the bank, scrapes its page, stores a buy and a sell record
//! per row, writes exactly one aggregator log entry and stamps the bank's
//! `last_checked`. Row failures are collected and never stop the run. A run
//! whose scrape fails is logged as a failure and leaves `last_checked` alone.

use crate::core::error::{PipelineError, RowError, ScrapeFailure};
use crate::core::model::{Bank, Id, LogKind, LogStatus, NewRecord, RecordKind};
use crate::core::scraper::RawRow;
use crate::core::store::RatesStore;
use crate::scrapers::ScraperRegistry;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{error, info, instrument, warn};

#[derive(Debug)]
pub struct RowFailure {
    /// Position of the row in the scraped page, starting at 0.
    pub index: usize,
    pub currency: Option<String>,
    pub error: RowError,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Every row was attempted.
    Completed {
        rows: usize,
        records_created: usize,
        failures: Vec<RowFailure>,
    },
    /// The scrape failed before any row was processed.
    Aborted(ScrapeFailure),
}

#[derive(Debug)]
pub struct RunReport {
    pub bank_id: Id,
    pub bank_name: String,
    pub started_at: DateTime<Utc>,
    /// Status written to the aggregator log.
    pub status: LogStatus,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn records_created(&self) -> usize {
        match &self.outcome {
            RunOutcome::Completed {
                records_created, ..
            } => *records_created,
            RunOutcome::Aborted(_) => 0,
        }
    }
}

fn normalize_code(text: Option<&str>) -> Option<String> {
    text.map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
}

fn parse_value(field: &'static str, text: Option<&str>) -> Result<Decimal, RowError> {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(RowError::MissingField(field))?;
    Decimal::from_str(text).map_err(|_| RowError::InvalidValue {
        field,
        text: text.to_string(),
    })
}

pub struct IngestionPipeline<'a> {
    store: &'a dyn RatesStore,
    registry: &'a ScraperRegistry,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(store: &'a dyn RatesStore, registry: &'a ScraperRegistry) -> Self {
        Self { store, registry }
    }

    /// Runs one scrape for `bank_name`.
    ///
    /// Only an unknown bank or a failure to write the run's log entry (or its
    /// `last_checked`) is returned as an error. Scrape failures come back as an
    /// [`RunOutcome::Aborted`] report.
    #[instrument(skip(self))]
    pub async fn run(&self, bank_name: &str) -> Result<RunReport, PipelineError> {
        let started_at = Utc::now();

        let bank = match self.store.find_bank_by_name(bank_name).await? {
            Some(bank) => bank,
            None => {
                error!("Bank with name '{}' does not exist", bank_name);
                return Err(PipelineError::BankNotFound(bank_name.to_string()));
            }
        };

        // A failed scrape still gets its log entry
        let rows = match self.scrape(&bank).await {
            Ok(rows) => rows,
            Err(failure) => {
                warn!(error = %failure, "Scraping failed for bank: {}", bank.name);
                self.store
                    .create_log(bank.id, LogKind::Scrape, LogStatus::Failure)
                    .await?;
                return Ok(RunReport {
                    bank_id: bank.id,
                    bank_name: bank.name,
                    started_at,
                    status: LogStatus::Failure,
                    outcome: RunOutcome::Aborted(failure),
                });
            }
        };

        let row_count = rows.len();
        let mut records_created = 0;
        let mut failures = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            if let Err(error) = self.save_row(&bank, &row, &mut records_created).await {
                warn!(index, currency = ?row.currency, %error, "Skipping row");
                failures.push(RowFailure {
                    index,
                    currency: row.currency,
                    error,
                });
            }
        }

        // One log entry per run, failed if any row was skipped
        let status = if failures.is_empty() {
            LogStatus::Success
        } else {
            LogStatus::Failure
        };
        self.store
            .create_log(bank.id, LogKind::Scrape, status)
            .await?;
        self.store.touch_last_checked(bank.id, Utc::now()).await?;

        info!(
            rows = row_count,
            records_created,
            failed_rows = failures.len(),
            %status,
            "Finished scrape for bank: {}",
            bank.name
        );

        Ok(RunReport {
            bank_id: bank.id,
            bank_name: bank.name,
            started_at,
            status,
            outcome: RunOutcome::Completed {
                rows: row_count,
                records_created,
                failures,
            },
        })
    }

    async fn scrape(&self, bank: &Bank) -> Result<Vec<RawRow>, ScrapeFailure> {
        let scraper = self.registry.resolve(&bank.name)?;
        let rows = scraper.scrape().await.map_err(ScrapeFailure::Extractor)?;
        if rows.is_empty() {
            return Err(ScrapeFailure::EmptyResult);
        }
        Ok(rows)
    }

    /// Stores the buy and sell records of one row. Both values are parsed
    /// before anything is written.
    async fn save_row(
        &self,
        bank: &Bank,
        row: &RawRow,
        records_created: &mut usize,
    ) -> Result<(), RowError> {
        let code =
            normalize_code(row.currency.as_deref()).ok_or(RowError::MissingField("currency"))?;
        let currency = self
            .store
            .find_currency_by_code(&code)
            .await?
            .ok_or(RowError::CurrencyNotFound(code))?;

        let buy = parse_value("buy", row.buy.as_deref())?;
        let sell = parse_value("sell", row.sell.as_deref())?;

        for (kind, value) in [(RecordKind::Buy, buy), (RecordKind::Sell, sell)] {
            self.store
                .create_record(NewRecord {
                    bank_id: bank.id,
                    currency_id: currency.id,
                    kind,
                    value,
                })
                .await?;
            *records_created += 1;
        }
        Ok(())
    }
}
