use thiserror::Error;

/// Failures raised while talking to an upstream quote provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("network error while contacting {provider}: {detail}")]
    Transport { provider: String, detail: String },

    #[error("{provider} returned HTTP {status}")]
    Remote { provider: String, status: u16 },

    #[error("{provider} rejected the request: {message}")]
    Api { provider: String, message: String },

    #[error("malformed response from {provider}: {detail}")]
    Malformed { provider: String, detail: String },

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl QuoteError {
    pub fn malformed(provider: &str, detail: impl Into<String>) -> Self {
        QuoteError::Malformed {
            provider: provider.to_string(),
            detail: detail.into(),
        }
    }

    /// Classifies a reqwest failure by the stage it failed at.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            QuoteError::Remote {
                provider: provider.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            QuoteError::malformed(provider, err.to_string())
        } else if err.is_builder() {
            QuoteError::Unknown(err.to_string())
        } else {
            QuoteError::Transport {
                provider: provider.to_string(),
                detail: err.to_string(),
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            QuoteError::Transport { .. } => true,
            QuoteError::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Human readable cause shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            QuoteError::Transport { provider, .. } => {
                format!("Network error reaching {provider}. Check your connection.")
            }
            QuoteError::Remote { provider, status } => {
                format!("HTTP error {status} while fetching market data from {provider}")
            }
            QuoteError::Api { provider, message } => format!("{provider}: {message}"),
            QuoteError::Malformed { provider, .. } => {
                format!("Incomplete market data received from {provider}")
            }
            QuoteError::Unknown(detail) => format!("An unknown error occurred: {detail}"),
        }
    }
}
