use crate::core::aggregator::{AggregatorSettings, QuoteAggregator};
use crate::core::alerts::{AlertEvaluator, Notifier};
use crate::core::config::AppConfig;
use crate::core::provider::{MarketDataProvider, SymbolProvider};
use crate::providers::alpha_vantage::AlphaVantageProvider;
use crate::providers::coingecko::CoinGeckoProvider;
use crate::providers::util::build_client;
use crate::store::{AlertStore, Database, FavoritesStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Every long-lived service, wired from the config.
pub struct App {
    pub config: AppConfig,
    pub market: Arc<dyn MarketDataProvider>,
    pub symbols: Option<Arc<dyn SymbolProvider>>,
    pub favorites: Arc<FavoritesStore>,
    pub alerts: Arc<AlertStore>,
    pub aggregator: Arc<QuoteAggregator>,
}

impl App {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let database = Database::open(&data_path)
            .with_context(|| format!("Failed to open data store at {}", data_path.display()))?;
        Self::with_database(config, database)
    }

    pub fn with_database(config: AppConfig, database: Database) -> Result<Self> {
        let client = build_client(&config.http)?;

        let gecko_config = config.providers.coingecko.clone().unwrap_or_default();
        debug!("Using CoinGecko at {}", gecko_config.base_url);
        let market: Arc<dyn MarketDataProvider> =
            Arc::new(CoinGeckoProvider::new(client.clone(), gecko_config));

        let symbols = config
            .providers
            .alpha_vantage
            .as_ref()
            .map(|alpha| -> Arc<dyn SymbolProvider> {
                debug!("Using Alpha Vantage at {}", alpha.base_url);
                Arc::new(AlphaVantageProvider::new(client.clone(), alpha))
            });

        let favorites = Arc::new(database.favorites);
        let alerts = Arc::new(database.alerts);

        let aggregator = Arc::new(QuoteAggregator::new(
            Arc::clone(&market),
            symbols.clone(),
            Arc::clone(&favorites),
            AggregatorSettings::new(&config.search, &config.watchlist),
        ));

        Ok(Self {
            config,
            market,
            symbols,
            favorites,
            alerts,
            aggregator,
        })
    }

    pub fn evaluator(&self, notifier: Arc<dyn Notifier>) -> AlertEvaluator {
        AlertEvaluator::new(Arc::clone(&self.market), Arc::clone(&self.alerts), notifier)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.search.debounce_ms)
    }
}
