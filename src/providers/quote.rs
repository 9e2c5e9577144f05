use crate::core::config::ProviderConfig;
use crate::core::provider::{ProviderError, RateProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Reads a blue-dollar quote from a JSON endpoint shaped like
/// `{ "venta": ..., "compra": ... }`. The sell field wins over the buy field.
pub struct QuoteProvider {
    name: String,
    url: String,
    sell_field: String,
    buy_field: String,
    client: reqwest::Client,
}

impl QuoteProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder
            .build()
            .with_context(|| format!("Failed to build HTTP client for {}", config.name))?;

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            sell_field: config.sell_field.clone(),
            buy_field: config.buy_field.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Accepts JSON strings or numbers; anything that is not a positive decimal is
/// treated as missing.
fn parse_quote(value: Option<&Value>) -> Option<Decimal> {
    let rate = match value? {
        Value::String(s) => parse_decimal(s.trim())?,
        Value::Number(n) => parse_decimal(&n.to_string())?,
        _ => return None,
    };
    (rate > Decimal::ZERO).then_some(rate)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[async_trait]
impl RateProvider for QuoteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "QuoteFetch",
        skip(self),
        fields(provider = %self.name)
    )]
    async fn fetch_rate(&self) -> Result<Decimal, ProviderError> {
        debug!("Requesting quote from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                url: self.url.clone(),
                status: response.status(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ProviderError::Request {
                url: self.url.clone(),
                source,
            })?;

        let body: Value = serde_json::from_str(&text).map_err(|source| ProviderError::Decode {
            url: self.url.clone(),
            source,
        })?;

        parse_quote(body.get(self.sell_field.as_str()))
            .or_else(|| parse_quote(body.get(self.buy_field.as_str())))
            .ok_or_else(|| ProviderError::NoQuote {
                url: self.url.clone(),
                sell: self.sell_field.clone(),
                buy: self.buy_field.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUOTE_PATH: &str = "/v1/cotizaciones/dolar-blue";

    async fn create_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(QUOTE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider_for(mock_server: &MockServer) -> QuoteProvider {
        let config = ProviderConfig::new("dolarhoy", &format!("{}{QUOTE_PATH}", mock_server.uri()));
        QuoteProvider::from_config(&config).unwrap()
    }

    #[test]
    fn test_parse_quote() {
        assert_eq!(
            parse_quote(Some(&json!("1050.5"))),
            Some(Decimal::new(10505, 1))
        );
        assert_eq!(parse_quote(Some(&json!(" 1100 "))), Some(Decimal::new(1100, 0)));
        assert_eq!(parse_quote(Some(&json!(1020))), Some(Decimal::new(1020, 0)));
        assert_eq!(parse_quote(Some(&json!(1025.75))), Some(Decimal::new(102575, 2)));
        assert_eq!(parse_quote(Some(&json!("not-a-number"))), None);
        assert_eq!(parse_quote(Some(&json!("0"))), None);
        assert_eq!(parse_quote(Some(&json!(-5))), None);
        assert_eq!(parse_quote(Some(&json!(null))), None);
        assert_eq!(parse_quote(None), None);
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server =
            create_mock_server(200, r#"{"compra": "1030.00", "venta": "1050.5"}"#).await;
        let provider = provider_for(&mock_server);

        let rate = provider.fetch_rate().await.expect("Failed to get rate");
        assert_eq!(rate, Decimal::new(10505, 1));
        assert_eq!(provider.name(), "dolarhoy");
    }

    #[tokio::test]
    async fn test_numeric_quote_fetch() {
        let mock_server = create_mock_server(
            200,
            r#"{"moneda": "USD", "casa": "blue", "compra": 1080, "venta": 1100}"#,
        )
        .await;
        let provider = provider_for(&mock_server);

        assert_eq!(provider.fetch_rate().await.unwrap(), Decimal::new(1100, 0));
    }

    #[tokio::test]
    async fn test_invalid_sell_falls_back_to_buy() {
        let mock_server =
            create_mock_server(200, r#"{"venta": "not-a-number", "compra": "1020"}"#).await;
        let provider = provider_for(&mock_server);

        assert_eq!(provider.fetch_rate().await.unwrap(), Decimal::new(1020, 0));
    }

    #[tokio::test]
    async fn test_no_usable_quote() {
        let mock_server = create_mock_server(200, r#"{"venta": "n/a", "compra": ""}"#).await;
        let provider = provider_for(&mock_server);

        let result = provider.fetch_rate().await;
        assert!(matches!(result, Err(ProviderError::NoQuote { .. })));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("No usable quote in fields 'venta' or 'compra'")
        );
    }

    #[tokio::test]
    async fn test_quote_api_error_response() {
        let mock_server = create_mock_server(500, "").await;
        let provider = provider_for(&mock_server);

        let result = provider.fetch_rate().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            format!(
                "HTTP error: 500 Internal Server Error for URL: {}",
                provider.url()
            )
        );
    }

    #[tokio::test]
    async fn test_quote_api_malformed_response() {
        let mock_server = create_mock_server(200, "<html>maintenance</html>").await;
        let provider = provider_for(&mock_server);

        let result = provider.fetch_rate().await;
        assert!(matches!(result, Err(ProviderError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let config = ProviderConfig::new("offline", "http://127.0.0.1:1/blue");
        let provider = QuoteProvider::from_config(&config).unwrap();

        let result = provider.fetch_rate().await;
        assert!(matches!(result, Err(ProviderError::Request { .. })));
    }

    #[tokio::test]
    async fn test_custom_fields_and_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates/blue"))
            .and(header("user-agent", "bluerate-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"sell": "1200", "buy": "1180"}"#),
            )
            .mount(&mock_server)
            .await;

        let config = ProviderConfig {
            user_agent: Some("bluerate-test".to_string()),
            sell_field: "sell".to_string(),
            buy_field: "buy".to_string(),
            ..ProviderConfig::new("custom", &format!("{}/rates/blue", mock_server.uri()))
        };
        let provider = QuoteProvider::from_config(&config).unwrap();

        assert_eq!(provider.fetch_rate().await.unwrap(), Decimal::new(1200, 0));
    }
}
