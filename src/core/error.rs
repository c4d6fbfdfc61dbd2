//! Error types for storage, scraping and ingestion runs

use crate::core::model::Id;
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: Id },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Storage backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a run stops before any row is processed.
#[derive(Error, Debug)]
pub enum ScrapeFailure {
    #[error("No scraper registered for bank: {0}")]
    ScraperNotFound(String),

    #[error("Scraper failed: {0:#}")]
    Extractor(anyhow::Error),

    #[error("Scraper returned no rows")]
    EmptyResult,
}

/// Failure of a single scraped row. The run carries on with the next row.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("Row has no {0} value")]
    MissingField(&'static str),

    #[error("Currency '{0}' does not exist")]
    CurrencyNotFound(String),

    #[error("Invalid {field} value '{text}'")]
    InvalidValue { field: &'static str, text: String },

    #[error("Failed to save record: {0}")]
    Store(#[from] StoreError),
}

/// Errors that end a run without an outcome being logged.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Bank with name '{0}' does not exist")]
    BankNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
