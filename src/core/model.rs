//! Persisted entities and the payloads used to create them

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub type Id = u64;

/// Number of fractional digits kept for a record value.
pub const VALUE_SCALE: u32 = 2;
/// Maximum number of digits (integer and fractional) of a record value.
pub const VALUE_MAX_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: Id,
    pub name: String,
    pub logo: Option<String>,
    pub buy_link: Option<String>,
    pub sell_link: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBank {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub buy_link: Option<String>,
    #[serde(default)]
    pub sell_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: Id,
    pub short_name: String,
    pub name: String,
    pub country: String,
    pub country_flag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCurrency {
    #[serde(alias = "code")]
    pub short_name: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub country_flag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Buy,
    Sell,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordKind::Buy => "buy",
                RecordKind::Sell => "sell",
            }
        )
    }
}

impl FromStr for RecordKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(RecordKind::Buy),
            "sell" => Ok(RecordKind::Sell),
            _ => Err(anyhow!("Invalid record type: {}", s)),
        }
    }
}

/// One observed quote. Never updated except for its deletion mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Id,
    pub bank_id: Id,
    pub currency_id: Id,
    pub kind: RecordKind,
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub bank_id: Id,
    pub currency_id: Id,
    pub kind: RecordKind,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Scrape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Failure,
}

impl Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogKind::Scrape => write!(f, "scrape"),
        }
    }
}

impl Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStatus::Success => write!(f, "success"),
            LogStatus::Failure => write!(f, "failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorLog {
    pub id: Id,
    pub bank_id: Id,
    pub kind: LogKind,
    pub status: LogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entities that are hidden instead of removed.
pub trait SoftDelete {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>, now: DateTime<Utc>);

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

macro_rules! impl_soft_delete {
    ($($ty:ty),*) => {
        $(
            impl SoftDelete for $ty {
                fn deleted_at(&self) -> Option<DateTime<Utc>> {
                    self.deleted_at
                }

                fn set_deleted_at(
                    &mut self,
                    deleted_at: Option<DateTime<Utc>>,
                    now: DateTime<Utc>,
                ) {
                    self.deleted_at = deleted_at;
                    self.updated_at = now;
                }
            }
        )*
    };
}

impl_soft_delete!(Bank, Currency, Record);

/// Reference to a row that supports soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Bank(Id),
    Currency(Id),
    Record(Id),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Bank(id) => write!(f, "bank {id}"),
            EntityRef::Currency(id) => write!(f, "currency {id}"),
            EntityRef::Record(id) => write!(f, "record {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_from_str() {
        assert_eq!("buy".parse::<RecordKind>().unwrap(), RecordKind::Buy);
        assert_eq!("SELL".parse::<RecordKind>().unwrap(), RecordKind::Sell);
        assert!("hold".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&RecordKind::Sell).unwrap(), "\"sell\"");
        assert_eq!(serde_json::to_string(&LogStatus::Failure).unwrap(), "\"failure\"");
        assert_eq!(LogKind::Scrape.to_string(), "scrape");
    }

    #[test]
    fn test_soft_delete_marks_and_clears() {
        let created = Utc::now();
        let mut currency = Currency {
            id: 1,
            short_name: "USD".to_string(),
            name: "United States Dollar".to_string(),
            country: "United States".to_string(),
            country_flag: None,
            created_at: created,
            updated_at: created,
            deleted_at: None,
        };
        assert!(!currency.is_deleted());

        let now = Utc::now();
        currency.set_deleted_at(Some(now), now);
        assert!(currency.is_deleted());
        assert_eq!(currency.updated_at, now);

        currency.set_deleted_at(None, now);
        assert!(!currency.is_deleted());
    }

    #[test]
    fn test_new_currency_accepts_code_alias() {
        let yaml = r#"
country: "Japan"
name: "Japanese Yen"
code: "JPY"
"#;
        let currency: NewCurrency = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(currency.short_name, "JPY");
        assert!(currency.country_flag.is_none());
    }
}
