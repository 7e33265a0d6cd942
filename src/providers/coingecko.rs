use crate::core::config::CoinGeckoConfig;
use crate::core::error::QuoteError;
use crate::core::provider::MarketDataProvider;
use crate::core::quotation::{PriceHistoryPoint, Quotation};
use crate::providers::normalize::{
    COINGECKO, CoinSearchResponse, MarketChart, MarketCoin, ProviderQuote,
};
use crate::providers::util::{build_url, get_json};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Largest page the markets endpoint serves.
const MAX_PER_PAGE: usize = 250;

pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoProvider {
    pub fn new(client: Client, config: CoinGeckoConfig) -> Self {
        CoinGeckoProvider { client, config }
    }

    async fn markets(
        &self,
        ids: Option<&str>,
        per_page: usize,
    ) -> Result<Vec<MarketCoin>, QuoteError> {
        let per_page = per_page.to_string();
        let mut params = vec![
            ("vs_currency", self.config.vs_currency.as_str()),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
        ];
        if let Some(ids) = ids {
            params.push(("ids", ids));
        }
        let url = build_url(COINGECKO, &self.config.base_url, "coins/markets", &params)?;
        get_json(&self.client, COINGECKO, url).await
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        COINGECKO
    }

    #[instrument(name = "CoinGeckoTrending", skip(self))]
    async fn trending(&self) -> Result<Vec<Quotation>, QuoteError> {
        let coins = self.markets(None, self.config.per_page as usize).await?;
        debug!("Received {} market coins", coins.len());
        coins
            .into_iter()
            .map(|coin| ProviderQuote::Market(coin).normalize())
            .collect()
    }

    #[instrument(name = "CoinGeckoSearch", skip(self), fields(term = %term))]
    async fn search(&self, term: &str) -> Result<Vec<Quotation>, QuoteError> {
        let url = build_url(
            COINGECKO,
            &self.config.base_url,
            "search",
            &[("query", term)],
        )?;
        let response: CoinSearchResponse = get_json(&self.client, COINGECKO, url).await?;
        response
            .coins
            .into_iter()
            .map(|coin| ProviderQuote::CoinSearch(coin).normalize())
            .collect()
    }

    #[instrument(name = "CoinGeckoHistory", skip(self), fields(id = %id))]
    async fn price_history(&self, id: &str) -> Result<Vec<PriceHistoryPoint>, QuoteError> {
        let days = self.config.history_days.to_string();
        let url = build_url(
            COINGECKO,
            &self.config.base_url,
            &format!("coins/{id}/market_chart"),
            &[
                ("vs_currency", self.config.vs_currency.as_str()),
                ("days", days.as_str()),
            ],
        )?;
        let chart: MarketChart = get_json(&self.client, COINGECKO, url).await?;
        Ok(chart.into_points())
    }

    #[instrument(name = "CoinGeckoPrices", skip(self), fields(count = ids.len()))]
    async fn current_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, QuoteError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut prices = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(MAX_PER_PAGE) {
            let coins = self.markets(Some(&batch.join(",")), batch.len()).await?;
            prices.extend(
                coins
                    .into_iter()
                    .filter_map(|coin| coin.current_price.map(|price| (coin.id, price))),
            );
        }
        if prices.len() < ids.len() {
            debug!("{} of {} ids returned no price", ids.len() - prices.len(), ids.len());
        }
        Ok(prices)
    }
}
