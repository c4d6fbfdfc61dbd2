use crate::core::model::{NewBank, NewCurrency};
use crate::core::scraper::TableLayout;
use crate::seed::{default_banks, default_currencies};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 30,
            user_agent: concat!("fxrates/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A bank scraped with the generic HTML table scraper.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScraperConfig {
    pub bank: String,
    pub url: String,
    #[serde(flatten)]
    pub layout: TableLayout,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub data_path: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub scrapers: Vec<ScraperConfig>,
    #[serde(default = "default_banks")]
    pub banks: Vec<NewBank>,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<NewCurrency>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: None,
            http: HttpConfig::default(),
            scrapers: Vec::new(),
            banks: default_banks(),
            currencies: default_currencies(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults when
    /// no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxrates", "fxrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "fxrates", "fxrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "/tmp/fxrates"
http:
  timeout_secs: 5
scrapers:
  - bank: "Equity"
    url: "https://equity.example.com/rates"
    row_selector: "table#fx tbody tr"
    currency_column: 1
    buy_column: 3
    sell_column: 4
  - bank: "Absa"
    url: "https://absa.example.com/fx"
banks:
  - name: "Equity"
    logo: "https://equity.example.com/logo.png"
currencies:
  - short_name: "USD"
    name: "United States Dollar"
    country: "United States"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/fxrates"));
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert!(config.http.user_agent.starts_with("fxrates/"));

        assert_eq!(config.scrapers.len(), 2);
        assert_eq!(config.scrapers[0].bank, "Equity");
        assert_eq!(config.scrapers[0].layout.row_selector, "table#fx tbody tr");
        assert_eq!(config.scrapers[0].layout.buy_column, 3);
        assert_eq!(config.scrapers[0].layout.sell_column, 4);
        assert_eq!(config.scrapers[1].layout, TableLayout::default());

        assert_eq!(config.banks.len(), 1);
        assert_eq!(config.banks[0].name, "Equity");
        assert!(config.banks[0].buy_link.is_none());
        assert_eq!(config.currencies.len(), 1);
        assert_eq!(config.currencies[0].short_name, "USD");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~").unwrap();
        assert!(config.data_path.is_none());
        assert_eq!(config.http, HttpConfig::default());
        assert!(config.scrapers.is_empty());
        assert_eq!(config.banks, default_banks());
        assert_eq!(config.currencies.len(), 20);
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "data_path: \"/var/lib/fxrates\"\n").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/var/lib/fxrates")
        );
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
