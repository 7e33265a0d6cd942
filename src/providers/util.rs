use crate::core::config::HttpConfig;
use crate::core::error::QuoteError;
use anyhow::Result;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const RETRIES: usize = 2;
pub const RETRY_DELAY_MS: u64 = 300;

/// Builds the HTTP client shared by every provider.
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("quotewatch/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .read_timeout(Duration::from_secs(http.read_timeout_secs))
        .build()?;
    Ok(client)
}

/// Joins `path` onto `base_url` and appends url-encoded query parameters.
pub fn build_url(
    provider: &str,
    base_url: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, QuoteError> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse_with_params(&raw, params)
        .map_err(|e| QuoteError::Unknown(format!("invalid {provider} url {raw}: {e}")))
}

/// Retries an async operation while it fails with a transient error
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the last error
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, QuoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, QuoteError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries || !err.is_transient() {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// GETs `url` and decodes the JSON body, retrying transient failures.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: Url,
) -> Result<T, QuoteError> {
    debug!("Requesting {} data from {}", provider, url);
    let text = with_retry(
        || async {
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| QuoteError::from_reqwest(provider, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(QuoteError::Remote {
                    provider: provider.to_string(),
                    status: status.as_u16(),
                });
            }

            response
                .text()
                .await
                .map_err(|e| QuoteError::from_reqwest(provider, e))
        },
        RETRIES,
        RETRY_DELAY_MS,
    )
    .await?;

    serde_json::from_str(&text).map_err(|e| {
        QuoteError::malformed(provider, format!("{e}; body: '{}'", truncate(&text, 200)))
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
