use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::FeedError;

const BINANCE_API_URL: &str = "https://api.binance.com";
const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Spot price lookup by symbol
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, symbol: &str) -> Result<f64, FeedError>;
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    #[serde(deserialize_with = "deserialize_string_to_f64")]
    price: f64,
}

#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BinanceClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BINANCE_API_URL.to_string(),
            api_key,
        }
    }

    fn ticker_url(&self) -> String {
        format!("{}{}", self.base_url, TICKER_PRICE_PATH)
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    /// Fetch the latest spot price for a symbol
    async fn get_price(&self, symbol: &str) -> Result<f64, FeedError> {
        let mut request = self
            .client
            .get(self.ticker_url())
            .query(&[("symbol", symbol)]);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let body = request.send().await?.error_for_status()?.text().await?;
        parse_ticker(&body, symbol)
    }
}

fn parse_ticker(body: &str, symbol: &str) -> Result<f64, FeedError> {
    let ticker: TickerPrice =
        serde_json::from_str(body).map_err(|e| FeedError::Payload(e.to_string()))?;

    if !ticker.symbol.eq_ignore_ascii_case(symbol) {
        return Err(FeedError::Payload(format!(
            "asked for {} but got {}",
            symbol, ticker.symbol
        )));
    }
    if !ticker.price.is_finite() || ticker.price <= 0.0 {
        return Err(FeedError::Payload(format!(
            "unusable price {} for {}",
            ticker.price, symbol
        )));
    }

    Ok(ticker.price)
}

fn deserialize_string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker_reads_string_price() {
        let body = r#"{"symbol":"BTCUSDT","price":"48900.12000000"}"#;
        assert_eq!(parse_ticker(body, "BTCUSDT").unwrap(), 48_900.12);
    }

    #[test]
    fn test_parse_ticker_rejects_wrong_symbol() {
        let body = r#"{"symbol":"ETHUSDT","price":"3000.00"}"#;
        assert!(matches!(
            parse_ticker(body, "BTCUSDT"),
            Err(FeedError::Payload(_))
        ));
    }

    #[test]
    fn test_parse_ticker_rejects_non_positive_and_garbage() {
        let zero = r#"{"symbol":"BTCUSDT","price":"0.00"}"#;
        assert!(parse_ticker(zero, "BTCUSDT").is_err());

        let error = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        assert!(parse_ticker(error, "BTCUSDT").is_err());

        let text = r#"{"symbol":"BTCUSDT","price":"abc"}"#;
        assert!(parse_ticker(text, "BTCUSDT").is_err());
    }

    #[test]
    fn test_ticker_url_targets_price_endpoint() {
        let client = BinanceClient::new(None);
        assert_eq!(
            client.ticker_url(),
            "https://api.binance.com/api/v3/ticker/price"
        );
    }
}
