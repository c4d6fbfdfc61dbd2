//! Core domain types and abstractions

pub mod collection;
pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod rates;
pub mod scraper;
pub mod store;

// Re-export main types for cleaner imports
pub use self::collection::KeyValueCollection;
pub use self::error::{PipelineError, RowError, ScrapeFailure, StoreError};
pub use self::scraper::{RateScraper, RawRow, TableLayout};
pub use self::store::{RatesStore, RecordFilter};
