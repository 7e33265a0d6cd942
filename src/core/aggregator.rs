//! Quote aggregation across the configured providers

use crate::core::config::{FailurePolicy, SearchConfig, WatchedAsset};
use crate::core::error::QuoteError;
use crate::core::provider::{MarketDataProvider, SymbolProvider};
use crate::core::quotation::{AssetKind, HistorySummary, Quotation};
use crate::core::resource::Resource;
use crate::store::FavoritesStore;
use anyhow::Result;
use futures::future::{join, join_all};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A provider that failed while others succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteList {
    pub quotations: Vec<Quotation>,
    pub failures: Vec<ProviderFailure>,
}

#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub market_limit: usize,
    pub symbol_limit: usize,
    pub policy: FailurePolicy,
    pub watchlist: Vec<WatchedAsset>,
}

impl AggregatorSettings {
    pub fn new(search: &SearchConfig, watchlist: &[WatchedAsset]) -> Self {
        Self {
            market_limit: search.market_limit,
            symbol_limit: search.symbol_limit,
            policy: search.on_provider_error,
            watchlist: watchlist.to_vec(),
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::new(&SearchConfig::default(), &[])
    }
}

/// The quotation id a watchlist entry is published under.
fn watched_id(asset: &WatchedAsset) -> String {
    match asset {
        WatchedAsset::Stock(s) => s.symbol.clone(),
        WatchedAsset::Forex(fx) => format!("{}/{}", fx.from, fx.to),
    }
}

/// One provider call's outcome, labelled with where it came from.
struct SourceResult {
    provider: String,
    result: Result<Vec<Quotation>, QuoteError>,
}

pub struct QuoteAggregator {
    market: Arc<dyn MarketDataProvider>,
    symbols: Option<Arc<dyn SymbolProvider>>,
    favorites: Arc<FavoritesStore>,
    settings: AggregatorSettings,
}

impl QuoteAggregator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        symbols: Option<Arc<dyn SymbolProvider>>,
        favorites: Arc<FavoritesStore>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            market,
            symbols,
            favorites,
            settings,
        }
    }

    /// `Loading`, then exactly one terminal `Success` or `Error`.
    pub fn quotations(&self, term: &str) -> BoxStream<'_, Resource<QuoteList>> {
        let term = term.to_string();
        stream::once(async { Resource::loading() })
            .chain(stream::once(async move { self.fetch(&term).await }))
            .boxed()
    }

    /// Blank terms list trending quotes; anything else searches every provider.
    #[instrument(name = "Aggregate", skip(self))]
    pub async fn fetch(&self, term: &str) -> Resource<QuoteList> {
        let term = term.trim();
        if !term.is_empty() {
            return self.merge(self.search_sources(term).await);
        }

        // Watchlist quotes are extras: a failed one is skipped and reported, never fatal
        let (trending, watched) = self.trending_sources().await;
        self.merge(vec![trending]).map(|mut list| {
            for source in watched {
                match source.result {
                    Ok(quotes) => list.quotations.extend(quotes),
                    Err(err) => {
                        warn!("Skipping watchlist quote from {}: {}", source.provider, err);
                        list.failures.push(ProviderFailure {
                            provider: source.provider,
                            message: err.user_message(),
                        });
                    }
                }
            }
            list
        })
    }

    async fn trending_sources(&self) -> (SourceResult, Vec<SourceResult>) {
        let trending = async {
            SourceResult {
                provider: self.market.name().to_string(),
                result: self.market.trending().await,
            }
        };

        let watched = async {
            let Some(symbols) = &self.symbols else {
                return Vec::new();
            };
            let quotes = self.settings.watchlist.iter().map(|asset| async move {
                let result = match asset {
                    WatchedAsset::Stock(s) => symbols.stock_quote(&s.symbol, &s.name).await,
                    WatchedAsset::Forex(fx) => symbols.forex_quote(&fx.from, &fx.to).await,
                };
                SourceResult {
                    provider: symbols.name().to_string(),
                    result: result.map(|q| vec![q]),
                }
            });
            join_all(quotes).await
        };

        join(trending, watched).await
    }

    async fn search_sources(&self, term: &str) -> Vec<SourceResult> {
        let market = async {
            SourceResult {
                provider: self.market.name().to_string(),
                result: self.market.search(term).await.map(|mut quotes| {
                    quotes.truncate(self.settings.market_limit);
                    quotes
                }),
            }
        };

        let symbols = async {
            let symbols = self.symbols.as_ref()?;
            Some(SourceResult {
                provider: symbols.name().to_string(),
                result: symbols.search_symbols(term).await.map(|mut quotes| {
                    quotes.truncate(self.settings.symbol_limit);
                    quotes
                }),
            })
        };

        let (market, symbols) = join(market, symbols).await;
        std::iter::once(market).chain(symbols).collect()
    }

    fn merge(&self, sources: Vec<SourceResult>) -> Resource<QuoteList> {
        let total = sources.len();
        let mut list = QuoteList::default();
        for source in sources {
            match source.result {
                Ok(quotes) => {
                    debug!("{} returned {} quotations", source.provider, quotes.len());
                    list.quotations.extend(quotes);
                }
                Err(err) => {
                    warn!("{} failed: {}", source.provider, err);
                    if self.settings.policy == FailurePolicy::Fail {
                        return Resource::error(err.user_message());
                    }
                    list.failures.push(ProviderFailure {
                        provider: source.provider,
                        message: err.user_message(),
                    });
                }
            }
        }

        if total > 0 && list.failures.len() == total {
            let message = list
                .failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Resource::error(message);
        }
        Resource::Success(list)
    }

    /// Price history for the detail view, routed by asset kind.
    #[instrument(name = "History", skip(self))]
    pub async fn history(&self, id: &str, kind: AssetKind) -> Resource<HistorySummary> {
        let result = match kind {
            AssetKind::Crypto => self.market.price_history(id).await,
            AssetKind::Stock => match &self.symbols {
                Some(symbols) => symbols.daily_history(id).await,
                None => return Resource::error("No stock data provider is configured"),
            },
            AssetKind::Forex => {
                return Resource::error(format!("Price history is not available for forex pair {id}"));
            }
        };
        match result {
            Ok(points) => Resource::Success(HistorySummary::new(points)),
            Err(err) => Resource::error(err.user_message()),
        }
    }

    /// Resolves a quotation by exact id: watchlist assets first, then search.
    pub async fn find(&self, id: &str) -> Result<Option<Quotation>> {
        if let Some(symbols) = &self.symbols {
            let watched = self
                .settings
                .watchlist
                .iter()
                .find(|asset| watched_id(asset).eq_ignore_ascii_case(id.trim()));
            if let Some(asset) = watched {
                let quote = match asset {
                    WatchedAsset::Stock(s) => symbols.stock_quote(&s.symbol, &s.name).await,
                    WatchedAsset::Forex(fx) => symbols.forex_quote(&fx.from, &fx.to).await,
                };
                return quote
                    .map(Some)
                    .map_err(|e| anyhow::anyhow!(e.user_message()));
            }
        }

        match self.fetch(id).await {
            Resource::Success(list) => Ok(list
                .quotations
                .into_iter()
                .find(|q| q.id == id || (q.kind != AssetKind::Crypto && q.id.eq_ignore_ascii_case(id)))),
            Resource::Error { message, .. } => Err(anyhow::anyhow!(message)),
            Resource::Loading { .. } => Ok(None),
        }
    }

    pub fn add_favorite(&self, quotation: &Quotation) -> Result<()> {
        self.favorites.add(quotation)
    }

    pub fn remove_favorite(&self, id: &str) -> Result<()> {
        self.favorites.remove(id)
    }

    /// Flips the favorite state of `quotation`, returning the new state.
    pub fn toggle_favorite(&self, quotation: &Quotation) -> Result<bool> {
        if self.favorites.is_favorite(&quotation.id)? {
            self.favorites.remove(&quotation.id)?;
            Ok(false)
        } else {
            self.favorites.add(quotation)?;
            Ok(true)
        }
    }

    pub fn is_favorite(&self, id: &str) -> Result<bool> {
        self.favorites.is_favorite(id)
    }

    pub fn watch_is_favorite(&self, id: &str) -> BoxStream<'static, bool> {
        self.favorites.watch_is_favorite(id).boxed()
    }

    pub fn favorites(&self) -> Result<Vec<Quotation>> {
        self.favorites.all()
    }

    pub fn watch_favorites(&self) -> BoxStream<'static, Vec<Quotation>> {
        self.favorites.watch_all().boxed()
    }
}
