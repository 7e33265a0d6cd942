use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const ALPHA_VANTAGE_KEY_ENV: &str = "QUOTEWATCH_ALPHA_VANTAGE_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_history_days() -> u32 {
    7
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        CoinGeckoConfig {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: default_vs_currency(),
            per_page: default_per_page(),
            history_days: default_history_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "demo".to_string()
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        AlphaVantageConfig {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: default_api_key(),
        }
    }
}

impl AlphaVantageConfig {
    /// The configured key, unless overridden through the environment.
    pub fn resolved_api_key(&self) -> String {
        std::env::var(ALPHA_VANTAGE_KEY_ENV).unwrap_or_else(|_| self.api_key.clone())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoConfig>,
    pub alpha_vantage: Option<AlphaVantageConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoConfig::default()),
            alpha_vantage: Some(AlphaVantageConfig::default()),
        }
    }
}

/// What the aggregator does when one of several providers fails.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Any provider failure fails the whole result.
    #[default]
    Fail,
    /// Keep results from providers that answered and report the others.
    Partial,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub market_limit: usize,
    pub symbol_limit: usize,
    pub debounce_ms: u64,
    pub on_provider_error: FailurePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            market_limit: 10,
            symbol_limit: 5,
            debounce_ms: 500,
            on_provider_error: FailurePolicy::Fail,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StockAsset {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ForexAsset {
    pub from: String,
    pub to: String,
}

/// Non-crypto asset quoted alongside the trending list.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WatchedAsset {
    Stock(StockAsset),
    Forex(ForexAsset),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AlertsConfig {
    pub check_interval_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        AlertsConfig {
            check_interval_secs: 15 * 60,
        }
    }
}

impl AlertsConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub watchlist: Vec<WatchedAsset>,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "quotewatch", "quotewatch")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
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
