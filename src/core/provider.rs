//! Provider abstractions

use crate::core::error::QuoteError;
use crate::core::quotation::{PriceHistoryPoint, Quotation};
use async_trait::async_trait;
use std::collections::HashMap;

/// Primary market-data source: trending lists, crypto search, charts and spot prices.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn trending(&self) -> Result<Vec<Quotation>, QuoteError>;

    async fn search(&self, term: &str) -> Result<Vec<Quotation>, QuoteError>;

    async fn price_history(&self, id: &str) -> Result<Vec<PriceHistoryPoint>, QuoteError>;

    /// Current prices keyed by quotation id. Unknown ids are absent from the map.
    async fn current_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, QuoteError>;
}

/// Symbol/quote source for stocks and forex pairs.
#[async_trait]
pub trait SymbolProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search_symbols(&self, term: &str) -> Result<Vec<Quotation>, QuoteError>;

    async fn stock_quote(&self, symbol: &str, name: &str) -> Result<Quotation, QuoteError>;

    async fn forex_quote(&self, from: &str, to: &str) -> Result<Quotation, QuoteError>;

    async fn daily_history(&self, symbol: &str) -> Result<Vec<PriceHistoryPoint>, QuoteError>;
}
