use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::api::types::{ApiConfig, ApiEndpoint, ApiError};

#[derive(Debug, Deserialize)]
struct ExchangeInfoBody {
    symbols: Vec<SymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    symbol: String,
}

/// Binance Spot `exchangeInfo` client used to discover the tracked universe
pub struct BinanceExchangeInfoClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceExchangeInfoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Every listed symbol whose name ends with `quote_asset`, in exchange order
    pub async fn fetch_symbols(&self, quote_asset: &str) -> Result<Vec<String>, ApiError> {
        let url = format!("{}{}", self.base_url, ApiEndpoint::ExchangeInfo.binance_path());
        debug!("Fetching exchange info from: {}", url);

        let response = self.client.get(&url).send().await.map_err(ApiError::from)?;

        if !response.status().is_success() {
            return Err(ApiError::Http(format!("HTTP {}: {}", response.status(), response.status().canonical_reason().unwrap_or("Unknown"))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to read response body: {}", e)))?;

        parse_symbols(&body, quote_asset)
    }
}

/// Extract symbols quoted in `quote_asset` from an `exchangeInfo` body
pub fn parse_symbols(body: &str, quote_asset: &str) -> Result<Vec<String>, ApiError> {
    let info: ExchangeInfoBody = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse exchange info: {}", e)))?;

    Ok(info.symbols
        .into_iter()
        .map(|entry| entry.symbol)
        .filter(|symbol| symbol.ends_with(quote_asset))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_filters_quote_asset() {
        let body = r#"{
            "timezone": "UTC",
            "serverTime": 1700000000000,
            "symbols": [
                {"symbol": "BTCUSDT", "status": "TRADING"},
                {"symbol": "ETHBTC", "status": "TRADING"},
                {"symbol": "SOLUSDT", "status": "TRADING"}
            ]
        }"#;

        let symbols = parse_symbols(body, "USDT").unwrap();
        assert_eq!(symbols, vec!["BTCUSDT".to_string(), "SOLUSDT".to_string()]);
    }

    #[test]
    fn test_parse_symbols_rejects_bad_body() {
        assert!(matches!(parse_symbols("[]", "USDT"), Err(ApiError::Parse(_))));
    }
}
