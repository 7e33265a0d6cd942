use crate::core::config::AlphaVantageConfig;
use crate::core::error::QuoteError;
use crate::core::provider::SymbolProvider;
use crate::core::quotation::{PriceHistoryPoint, Quotation};
use crate::providers::normalize::{
    ALPHA_VANTAGE, DailySeriesResponse, ExchangeRateResponse, GlobalQuoteResponse,
    ProviderQuote, SymbolSearchResponse,
};
use crate::providers::util::{build_url, get_json};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

/// Keys Alpha Vantage uses to report throttling or bad requests inside a 200 body.
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(client: Client, config: &AlphaVantageConfig) -> Self {
        AlphaVantageProvider {
            client,
            base_url: config.base_url.clone(),
            api_key: config.resolved_api_key(),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[(&str, &str)],
    ) -> Result<T, QuoteError> {
        let mut all_params = vec![("function", function)];
        all_params.extend_from_slice(params);
        all_params.push(("apikey", self.api_key.as_str()));

        let url = build_url(ALPHA_VANTAGE, &self.base_url, "query", &all_params)?;
        let body: Value = get_json(&self.client, ALPHA_VANTAGE, url).await?;

        if let Some(message) = NOTICE_KEYS
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
        {
            return Err(QuoteError::Api {
                provider: ALPHA_VANTAGE.to_string(),
                message: message.to_string(),
            });
        }

        serde_json::from_value(body)
            .map_err(|e| QuoteError::malformed(ALPHA_VANTAGE, format!("{function}: {e}")))
    }
}

#[async_trait]
impl SymbolProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        ALPHA_VANTAGE
    }

    #[instrument(name = "AlphaVantageSearch", skip(self), fields(term = %term))]
    async fn search_symbols(&self, term: &str) -> Result<Vec<Quotation>, QuoteError> {
        let response: SymbolSearchResponse =
            self.query("SYMBOL_SEARCH", &[("keywords", term)]).await?;
        response
            .best_matches
            .into_iter()
            .map(|m| ProviderQuote::SymbolMatch(m).normalize())
            .collect()
    }

    #[instrument(name = "AlphaVantageQuote", skip(self, name), fields(symbol = %symbol))]
    async fn stock_quote(&self, symbol: &str, name: &str) -> Result<Quotation, QuoteError> {
        let response: GlobalQuoteResponse =
            self.query("GLOBAL_QUOTE", &[("symbol", symbol)]).await?;
        ProviderQuote::Stock {
            symbol: symbol.to_string(),
            name: name.to_string(),
            quote: response.global_quote.unwrap_or_default(),
        }
        .normalize()
    }

    #[instrument(name = "AlphaVantageForex", skip(self))]
    async fn forex_quote(&self, from: &str, to: &str) -> Result<Quotation, QuoteError> {
        let response: ExchangeRateResponse = self
            .query(
                "CURRENCY_EXCHANGE_RATE",
                &[("from_currency", from), ("to_currency", to)],
            )
            .await?;
        ProviderQuote::Forex {
            from: from.to_string(),
            to: to.to_string(),
            rate: response.exchange_rate.unwrap_or_default(),
        }
        .normalize()
    }

    #[instrument(name = "AlphaVantageDaily", skip(self), fields(symbol = %symbol))]
    async fn daily_history(&self, symbol: &str) -> Result<Vec<PriceHistoryPoint>, QuoteError> {
        let response: DailySeriesResponse = self
            .query(
                "TIME_SERIES_DAILY",
                &[("symbol", symbol), ("outputsize", "compact")],
            )
            .await?;
        let series = response.series.ok_or_else(|| {
            QuoteError::malformed(ALPHA_VANTAGE, format!("no daily series for {symbol}"))
        })?;

        // Keys are ISO dates, so map order is chronological.
        Ok(series
            .into_iter()
            .filter_map(|(date, bar)| {
                let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
                let price = bar.close.trim().parse::<f64>().ok();
                if price.is_none() {
                    debug!("Skipping unparsable close '{}' on {}", bar.close, date);
                }
                Some(PriceHistoryPoint {
                    timestamp_ms: day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis(),
                    price: price?,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::HttpConfig;
    use crate::core::quotation::AssetKind;
    use crate::providers::util::build_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_function(server: &MockServer, function: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", function))
            .and(query_param("apikey", "TESTKEY"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn provider(server: &MockServer) -> AlphaVantageProvider {
        AlphaVantageProvider {
            client: build_client(&HttpConfig::default()).unwrap(),
            base_url: server.uri(),
            api_key: "TESTKEY".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_symbols() {
        let server = MockServer::start().await;
        mock_function(
            &server,
            "SYMBOL_SEARCH",
            r#"{"bestMatches": [
                {"1. symbol": "TSLA", "2. name": "Tesla Inc", "3. type": "Equity", "4. region": "United States"},
                {"1. symbol": "TL0.DEX", "2. name": "Tesla", "3. type": "Equity", "4. region": "XETRA"}
            ]}"#,
        )
        .await;

        let quotes = provider(&server).search_symbols("tesla").await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].id, "TSLA");
        assert_eq!(quotes[0].kind, AssetKind::Stock);
    }

    #[tokio::test]
    async fn test_stock_quote() {
        let server = MockServer::start().await;
        mock_function(
            &server,
            "GLOBAL_QUOTE",
            r#"{"Global Quote": {"01. symbol": "AAPL", "05. price": "189.8400",
                "09. change": "-1.0000", "10. change percent": "-0.5238%"}}"#,
        )
        .await;

        let quote = provider(&server)
            .stock_quote("AAPL", "Apple Inc.")
            .await
            .unwrap();
        assert_eq!(quote.id, "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.current_price, 189.84);
        assert_eq!(quote.change_24h, -0.5238);
    }

    #[tokio::test]
    async fn test_unknown_stock_is_malformed() {
        let server = MockServer::start().await;
        mock_function(&server, "GLOBAL_QUOTE", r#"{"Global Quote": {}}"#).await;

        let err = provider(&server)
            .stock_quote("NOPE", "Nope")
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_forex_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
            .and(query_param("from_currency", "EUR"))
            .and(query_param("to_currency", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Realtime Currency Exchange Rate": {"1. From_Currency Code": "EUR",
                    "5. Exchange Rate": "1.08450000"}}"#,
            ))
            .mount(&server)
            .await;

        let quote = provider(&server).forex_quote("EUR", "USD").await.unwrap();
        assert_eq!(quote.id, "EUR/USD");
        assert_eq!(quote.kind, AssetKind::Forex);
        assert_eq!(quote.current_price, 1.0845);
    }

    #[tokio::test]
    async fn test_rate_limit_note_is_api_error() {
        let server = MockServer::start().await;
        mock_function(
            &server,
            "SYMBOL_SEARCH",
            r#"{"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#,
        )
        .await;

        let err = provider(&server).search_symbols("ibm").await.unwrap_err();
        match err {
            QuoteError::Api { provider, message } => {
                assert_eq!(provider, ALPHA_VANTAGE);
                assert!(message.contains("rate limit"));
            }
            other => panic!("Expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_daily_history_is_chronological() {
        let server = MockServer::start().await;
        mock_function(
            &server,
            "TIME_SERIES_DAILY",
            r#"{"Meta Data": {}, "Time Series (Daily)": {
                "2024-03-02": {"1. open": "1", "4. close": "110.0"},
                "2024-03-01": {"1. open": "1", "4. close": "100.0"}
            }}"#,
        )
        .await;

        let points = provider(&server).daily_history("IBM").await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 100.0);
        assert_eq!(points[1].price, 110.0);
        assert!(points[0].timestamp_ms < points[1].timestamp_ms);
        assert_eq!(points[0].timestamp_ms, 1_709_251_200_000);
    }
}
