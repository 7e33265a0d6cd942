use quotewatch::app::App;
use quotewatch::core::config::{
    AlphaVantageConfig, AppConfig, CoinGeckoConfig, FailurePolicy, ForexAsset, ProvidersConfig,
    SearchConfig, StockAsset, WatchedAsset,
};
use quotewatch::core::quotation::AssetKind;
use quotewatch::store::Database;
use quotewatch::{AlertsCommand, AppCommand, FavoritesCommand, run_command, run_with_app};
use std::fs;
use tracing::info;
use wiremock::MockServer;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const MARKETS: &str = r#"[
        {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.0,
         "price_change_percentage_24h": 2.5, "image": "https://img/btc.png"},
        {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3100.25,
         "price_change_percentage_24h": -0.75}
    ]"#;

    pub async fn mock_markets(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mock_coin_search(server: &MockServer, term: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", term))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mock_alpha(server: &MockServer, function: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", function))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }
}

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        providers: ProvidersConfig {
            coingecko: Some(CoinGeckoConfig {
                base_url: server.uri(),
                ..CoinGeckoConfig::default()
            }),
            alpha_vantage: Some(AlphaVantageConfig {
                base_url: server.uri(),
                api_key: "test".to_string(),
            }),
        },
        ..AppConfig::default()
    }
}

fn in_memory_app(config: AppConfig) -> App {
    App::with_database(config, Database::in_memory().unwrap()).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_explore_trending_from_config_file() {
    let server = MockServer::start().await;
    test_utils::mock_markets(&server, test_utils::MARKETS).await;
    test_utils::mock_alpha(
        &server,
        "GLOBAL_QUOTE",
        200,
        r#"{"Global Quote": {"05. price": "189.5000", "10. change percent": "1.2500%"}}"#,
    )
    .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("data");
    let config_path = temp_dir.path().join("config.yaml");
    let config_content = format!(
        r#"
providers:
  coingecko:
    base_url: "{uri}"
  alpha_vantage:
    base_url: "{uri}"
    api_key: "test"
watchlist:
  - symbol: "AAPL"
    name: "Apple Inc."
data_path: "{data}"
"#,
        uri = server.uri(),
        data = data_dir.display()
    );
    fs::write(&config_path, config_content).unwrap();

    let result = run_command(
        AppCommand::Explore {
            query: None,
            interactive: false,
        },
        config_path.to_str(),
    )
    .await;

    assert!(result.is_ok(), "Explore failed: {result:?}");
    assert!(data_dir.join("db").exists());
}

#[test_log::test(tokio::test)]
async fn test_trending_includes_watchlist_quotes() {
    let server = MockServer::start().await;
    test_utils::mock_markets(&server, test_utils::MARKETS).await;
    test_utils::mock_alpha(
        &server,
        "GLOBAL_QUOTE",
        200,
        r#"{"Global Quote": {"05. price": "189.5000", "10. change percent": "1.2500%"}}"#,
    )
    .await;

    let mut config = config_for(&server);
    config.watchlist = vec![WatchedAsset::Stock(StockAsset {
        symbol: "AAPL".to_string(),
        name: "Apple Inc.".to_string(),
    })];
    let app = in_memory_app(config);

    let list = app.aggregator.fetch("").await.data().cloned().unwrap();
    let ids: Vec<&str> = list.quotations.iter().map(|q| q.id.as_str()).collect();
    info!(?ids, "Trending quotations");
    assert_eq!(ids, vec!["bitcoin", "ethereum", "AAPL"]);
    assert_eq!(list.quotations[2].kind, AssetKind::Stock);
    assert_eq!(list.quotations[2].current_price, 189.5);
}

#[test_log::test(tokio::test)]
async fn test_favorites_flow() {
    let server = MockServer::start().await;
    test_utils::mock_coin_search(
        &server,
        "solana",
        r#"{"coins": [{"id": "solana", "name": "Solana", "symbol": "SOL", "large": null}]}"#,
    )
    .await;
    test_utils::mock_alpha(&server, "SYMBOL_SEARCH", 200, r#"{"bestMatches": []}"#).await;

    let app = in_memory_app(config_for(&server));

    run_with_app(
        &app,
        AppCommand::Favorites(FavoritesCommand::Add {
            id: "solana".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(app.aggregator.is_favorite("solana").unwrap());
    let favorites = app.aggregator.favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].symbol, "SOL");

    run_with_app(&app, AppCommand::Favorites(FavoritesCommand::List))
        .await
        .unwrap();

    run_with_app(
        &app,
        AppCommand::Favorites(FavoritesCommand::Remove {
            id: "solana".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!app.aggregator.is_favorite("solana").unwrap());
}

#[test_log::test(tokio::test)]
async fn test_favorite_add_unknown_id_fails() {
    let server = MockServer::start().await;
    test_utils::mock_coin_search(&server, "nope", r#"{"coins": []}"#).await;
    test_utils::mock_alpha(&server, "SYMBOL_SEARCH", 200, r#"{"bestMatches": []}"#).await;

    let app = in_memory_app(config_for(&server));
    let result = run_with_app(
        &app,
        AppCommand::Favorites(FavoritesCommand::Add {
            id: "nope".to_string(),
        }),
    )
    .await;

    assert!(result.is_err());
    assert!(app.aggregator.favorites().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_alerts_check_fires_and_deactivates() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("ids", "bitcoin,ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::MARKETS))
        .expect(1)
        .mount(&server)
        .await;

    test_utils::mock_coin_search(
        &server,
        "bitcoin",
        r#"{"coins": [{"id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "large": null}]}"#,
    )
    .await;
    test_utils::mock_coin_search(
        &server,
        "ethereum",
        r#"{"coins": [{"id": "ethereum", "name": "Ethereum", "symbol": "eth", "large": null}]}"#,
    )
    .await;
    test_utils::mock_alpha(&server, "SYMBOL_SEARCH", 200, r#"{"bestMatches": []}"#).await;

    let app = in_memory_app(config_for(&server));

    for (id, target, below) in [("bitcoin", 60000.0, false), ("ethereum", 1000.0, true)] {
        run_with_app(
            &app,
            AppCommand::Alerts(AlertsCommand::Add {
                quotation_id: id.to_string(),
                target_price: target,
                below,
                symbol: None,
            }),
        )
        .await
        .unwrap();
    }

    run_with_app(&app, AppCommand::Alerts(AlertsCommand::Check))
        .await
        .unwrap();

    let alerts = app.alerts.all().unwrap();
    assert_eq!(alerts.len(), 2);
    let bitcoin = alerts.iter().find(|a| a.quotation_id == "bitcoin").unwrap();
    let ethereum = alerts.iter().find(|a| a.quotation_id == "ethereum").unwrap();
    assert_eq!(bitcoin.symbol, "BTC");
    assert!(!bitcoin.active);
    assert!(ethereum.active);

    run_with_app(
        &app,
        AppCommand::Alerts(AlertsCommand::Remove { id: bitcoin.id }),
    )
    .await
    .unwrap();
    assert_eq!(app.alerts.all().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_alert_on_stock_is_rejected() {
    let server = MockServer::start().await;
    test_utils::mock_coin_search(&server, "AAPL", r#"{"coins": []}"#).await;
    test_utils::mock_alpha(
        &server,
        "SYMBOL_SEARCH",
        200,
        r#"{"bestMatches": [{"1. symbol": "AAPL", "2. name": "Apple Inc.",
            "3. type": "Equity", "4. region": "United States"}]}"#,
    )
    .await;

    let app = in_memory_app(config_for(&server));
    let result = run_with_app(
        &app,
        AppCommand::Alerts(AlertsCommand::Add {
            quotation_id: "AAPL".to_string(),
            target_price: 200.0,
            below: false,
            symbol: None,
        }),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("only checked for crypto"));
    assert!(app.alerts.all().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_watchlist_quota_notice_keeps_trending() {
    let server = MockServer::start().await;
    test_utils::mock_markets(&server, test_utils::MARKETS).await;
    test_utils::mock_alpha(
        &server,
        "GLOBAL_QUOTE",
        200,
        r#"{"Information": "The **demo** API key is for demo purposes only."}"#,
    )
    .await;

    let mut config = config_for(&server);
    config.watchlist = vec![WatchedAsset::Stock(StockAsset {
        symbol: "AAPL".to_string(),
        name: "Apple Inc.".to_string(),
    })];
    let app = in_memory_app(config);

    let list = app.aggregator.fetch("").await.data().cloned().unwrap();
    let ids: Vec<&str> = list.quotations.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin", "ethereum"]);
    assert_eq!(list.failures.len(), 1);
    assert!(list.failures[0].message.contains("demo"));

    run_with_app(
        &app,
        AppCommand::Explore {
            query: None,
            interactive: false,
        },
    )
    .await
    .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_favorite_watchlist_forex_pair() {
    let server = MockServer::start().await;
    test_utils::mock_alpha(
        &server,
        "CURRENCY_EXCHANGE_RATE",
        200,
        r#"{"Realtime Currency Exchange Rate": {"5. Exchange Rate": "1.08450000"}}"#,
    )
    .await;

    let mut config = config_for(&server);
    config.watchlist = vec![WatchedAsset::Forex(ForexAsset {
        from: "EUR".to_string(),
        to: "USD".to_string(),
    })];
    let app = in_memory_app(config);

    run_with_app(
        &app,
        AppCommand::Favorites(FavoritesCommand::Add {
            id: "EUR/USD".to_string(),
        }),
    )
    .await
    .unwrap();
    let favorites = app.aggregator.favorites().unwrap();
    assert_eq!(favorites[0].id, "EUR/USD");
    assert_eq!(favorites[0].kind, AssetKind::Forex);
}

#[test_log::test(tokio::test)]
async fn test_search_failure_policy() {
    let server = MockServer::start().await;
    test_utils::mock_coin_search(
        &server,
        "sol",
        r#"{"coins": [{"id": "solana", "name": "Solana", "symbol": "SOL", "large": null}]}"#,
    )
    .await;
    test_utils::mock_alpha(&server, "SYMBOL_SEARCH", 400, "bad request").await;

    let strict = in_memory_app(config_for(&server));
    let result = run_with_app(
        &strict,
        AppCommand::Explore {
            query: Some("sol".to_string()),
            interactive: false,
        },
    )
    .await;
    assert!(result.is_err());

    let mut config = config_for(&server);
    config.search = SearchConfig {
        on_provider_error: FailurePolicy::Partial,
        ..SearchConfig::default()
    };
    let lenient = in_memory_app(config);
    let list = lenient.aggregator.fetch("sol").await.data().cloned().unwrap();
    assert_eq!(list.quotations.len(), 1);
    assert_eq!(list.failures.len(), 1);
    assert_eq!(list.failures[0].provider, "alphavantage");
}

#[test_log::test(tokio::test)]
async fn test_history_commands() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/market_chart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"prices": [[1709251200000, 60000.0], [1709337600000, 63000.0]]}"#),
        )
        .mount(&server)
        .await;

    let app = in_memory_app(config_for(&server));

    run_with_app(
        &app,
        AppCommand::History {
            id: "bitcoin".to_string(),
            kind: AssetKind::Crypto,
        },
    )
    .await
    .unwrap();

    let forex = run_with_app(
        &app,
        AppCommand::History {
            id: "EURUSD".to_string(),
            kind: AssetKind::Forex,
        },
    )
    .await;
    assert!(forex.is_err());
}
