//! Rate provider abstractions

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a single provider attempt produced no rate.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request error: {source} for URL: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for URL: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No usable quote in fields '{sell}' or '{buy}' from {url}")]
    NoQuote {
        url: String,
        sell: String,
        buy: String,
    },

    #[error("Quote {0} is not a positive rate")]
    NotPositive(Decimal),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the current USD to local currency rate.
    async fn fetch_rate(&self) -> Result<Decimal, ProviderError>;
}
