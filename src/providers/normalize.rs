//! Wire shapes of both providers and their mapping into [`Quotation`]

use crate::core::error::QuoteError;
use crate::core::quotation::{AssetKind, PriceHistoryPoint, Quotation};
use serde::{Deserialize, Deserializer, de::Error as _};
use std::collections::BTreeMap;

pub const COINGECKO: &str = "coingecko";
pub const ALPHA_VANTAGE: &str = "alphavantage";

/// Accepts a number, a numeric string or null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid number '{raw}': {e}"))),
    }
}

/// Unknown or nonsensical prices read as not yet known.
fn known_price(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0)
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().trim_end_matches('%').parse::<f64>().ok())
}

// CoinGecko

#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percentage_24h: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinSearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub large: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<(f64, f64)>,
}

impl MarketChart {
    pub fn into_points(self) -> Vec<PriceHistoryPoint> {
        self.prices
            .into_iter()
            .map(|(timestamp, price)| PriceHistoryPoint {
                timestamp_ms: timestamp as i64,
                price,
            })
            .collect()
    }
}

// Alpha Vantage

#[derive(Debug, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Vec<SymbolMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name")]
    pub name: String,
    #[serde(rename = "3. type", default)]
    pub asset_type: String,
    #[serde(rename = "4. region", default)]
    pub region: String,
}

#[derive(Debug, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    pub global_quote: Option<GlobalQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    pub exchange_rate: Option<ExchangeRate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    pub rate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    pub series: Option<BTreeMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "4. close")]
    pub close: String,
}

/// A provider response item before normalization.
#[derive(Debug, Clone)]
pub enum ProviderQuote {
    Market(MarketCoin),
    CoinSearch(SearchCoin),
    SymbolMatch(SymbolMatch),
    Stock {
        symbol: String,
        name: String,
        quote: GlobalQuote,
    },
    Forex {
        from: String,
        to: String,
        rate: ExchangeRate,
    },
}

impl ProviderQuote {
    pub fn normalize(self) -> Result<Quotation, QuoteError> {
        match self {
            ProviderQuote::Market(coin) => Ok(Quotation {
                id: coin.id,
                name: coin.name,
                symbol: coin.symbol.to_uppercase(),
                current_price: known_price(coin.current_price),
                change_24h: coin
                    .price_change_percentage_24h
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0),
                image_url: coin.image,
                kind: AssetKind::Crypto,
            }),
            ProviderQuote::CoinSearch(coin) => Ok(Quotation {
                id: coin.id,
                name: coin.name,
                symbol: coin.symbol.to_uppercase(),
                current_price: 0.0,
                change_24h: 0.0,
                image_url: coin.large,
                kind: AssetKind::Crypto,
            }),
            ProviderQuote::SymbolMatch(m) => Ok(Quotation {
                id: m.symbol.clone(),
                name: m.name,
                symbol: m.symbol,
                current_price: 0.0,
                change_24h: 0.0,
                image_url: None,
                kind: AssetKind::Stock,
            }),
            ProviderQuote::Stock {
                symbol,
                name,
                quote,
            } => {
                let price = parse_number(quote.price.as_deref()).ok_or_else(|| {
                    QuoteError::malformed(
                        ALPHA_VANTAGE,
                        format!("incomplete stock quote for {symbol}"),
                    )
                })?;
                Ok(Quotation {
                    id: symbol.clone(),
                    name,
                    symbol,
                    current_price: known_price(Some(price)),
                    change_24h: parse_number(quote.change_percent.as_deref()).unwrap_or(0.0),
                    image_url: None,
                    kind: AssetKind::Stock,
                })
            }
            ProviderQuote::Forex { from, to, rate } => {
                let pair = format!("{from}/{to}");
                let price = parse_number(rate.rate.as_deref()).ok_or_else(|| {
                    QuoteError::malformed(
                        ALPHA_VANTAGE,
                        format!("incomplete forex quote for {pair}"),
                    )
                })?;
                Ok(Quotation {
                    id: pair.clone(),
                    name: pair.clone(),
                    symbol: pair,
                    current_price: known_price(Some(price)),
                    change_24h: 0.0,
                    image_url: None,
                    kind: AssetKind::Forex,
                })
            }
        }
    }
}
