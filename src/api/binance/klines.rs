use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::api::types::{ApiConfig, ApiError, ApiRequest, ApiResponse, RateLimitInfo};
use crate::candles::{OHLCVCandle, TimestampMS};
use crate::common::constants::BINANCE_MAX_KLINES_LIMIT;

/// Binance Spot API client for klines data
pub struct BinanceKlinesClient {
    client: reqwest::Client,
    base_url: String,
    last_request_time: Option<Instant>,
    min_request_interval: Duration,
}

impl BinanceKlinesClient {
    /// Create a new Binance klines client
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            last_request_time: None,
            min_request_interval: Duration::from_millis(config.min_request_interval_ms),
        })
    }

    /// Fetch klines data from Binance API
    pub async fn fetch_klines(&mut self, request: ApiRequest) -> Result<ApiResponse<Vec<OHLCVCandle>>, ApiError> {
        // Keep a minimum spacing between consecutive requests
        if let Some(last_request) = self.last_request_time {
            let elapsed = last_request.elapsed();
            if elapsed < self.min_request_interval {
                let delay = self.min_request_interval - elapsed;
                debug!("Rate limiting: waiting {:?} before next request", delay);
                sleep(delay).await;
            }
        }

        let url = self.build_klines_url(&request);
        debug!("Fetching klines from: {}", url);

        self.last_request_time = Some(Instant::now());

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status().as_u16() == 429 || response.status().as_u16() == 418 {
            let retry_after = response.headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(ApiError::RateLimit(format!("Rate limit exceeded, retry after {} seconds", retry_after)));
        }

        if response.status().as_u16() == 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::InvalidSymbol(format!("{} {}: {}", request.symbol, request.interval, body)));
        }

        if !response.status().is_success() {
            return Err(ApiError::Http(format!("HTTP {}: {}", response.status(), response.status().canonical_reason().unwrap_or("Unknown"))));
        }

        let rate_limit_info = parse_rate_limit_headers(response.headers());

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to read response body: {}", e)))?;

        debug!("Received response body ({}b): {}", body.len(), body.chars().take(200).collect::<String>());

        let candles = parse_klines_body(&body)?;

        debug!("Fetched {} klines for {} {}", candles.len(), request.symbol, request.interval);

        Ok(ApiResponse {
            data: candles,
            timestamp: chrono::Utc::now().timestamp_millis(),
            rate_limit_info,
        })
    }

    /// Build the complete URL for klines request
    fn build_klines_url(&self, request: &ApiRequest) -> String {
        let mut url = format!("{}{}?symbol={}&interval={}",
            self.base_url,
            request.endpoint.binance_path(),
            request.symbol,
            request.interval
        );

        if let Some(limit) = request.limit {
            let limit = limit.clamp(1, BINANCE_MAX_KLINES_LIMIT);
            url.push_str(&format!("&limit={}", limit));
        }

        url
    }
}

/// Parse a klines JSON body (array of arrays) into candles
pub fn parse_klines_body(body: &str) -> Result<Vec<OHLCVCandle>, ApiError> {
    let raw_klines: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse JSON: {}", e)))?;

    let mut candles = Vec::with_capacity(raw_klines.len());

    for kline_array in raw_klines {
        let array = kline_array.as_array()
            .ok_or_else(|| ApiError::Parse("Expected kline to be an array".to_string()))?;

        if array.len() < 7 {
            return Err(ApiError::Parse(format!("Expected at least 7 elements in kline array, got {}", array.len())));
        }

        candles.push(OHLCVCandle {
            open_time: parse_timestamp(&array[0])?,
            open: parse_f64(&array[1])?,
            high: parse_f64(&array[2])?,
            low: parse_f64(&array[3])?,
            close: parse_f64(&array[4])?,
            volume: parse_f64(&array[5])?,
            close_time: parse_timestamp(&array[6])?,
        });
    }

    Ok(candles)
}

fn parse_timestamp(value: &serde_json::Value) -> Result<TimestampMS, ApiError> {
    value.as_i64()
        .ok_or_else(|| ApiError::Parse(format!("Expected timestamp to be i64, got: {:?}", value)))
}

/// Binance sends prices as strings; accept plain numbers too
fn parse_f64(value: &serde_json::Value) -> Result<f64, ApiError> {
    match value {
        serde_json::Value::String(s) => s.parse::<f64>()
            .map_err(|_| ApiError::Parse(format!("Failed to parse '{}' as f64", s))),
        serde_json::Value::Number(n) => n.as_f64()
            .ok_or_else(|| ApiError::Parse(format!("Failed to convert number to f64: {:?}", n))),
        _ => Err(ApiError::Parse(format!("Expected string or number, got: {:?}", value))),
    }
}

/// Parse rate limit information from response headers
pub(crate) fn parse_rate_limit_headers(headers: &reqwest::header::HeaderMap) -> Option<RateLimitInfo> {
    let weight_used = headers.get("x-mbx-used-weight-1m")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());

    let retry_after = headers.get("retry-after")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());

    if weight_used.is_some() || retry_after.is_some() {
        Some(RateLimitInfo {
            weight_used: weight_used.unwrap_or(0),
            retry_after,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BinanceKlinesClient {
        BinanceKlinesClient::new(&ApiConfig::default()).unwrap()
    }

    #[test]
    fn test_build_klines_url() {
        let request = ApiRequest::new_klines("BTCUSDT".to_string(), "4h".to_string())
            .with_limit(100);

        let url = client().build_klines_url(&request);
        assert_eq!(url, "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=4h&limit=100");
    }

    #[test]
    fn test_limit_is_clamped() {
        let request = ApiRequest::new_klines("ETHUSDT".to_string(), "1d".to_string())
            .with_limit(5000);

        let url = client().build_klines_url(&request);
        assert!(url.ends_with("&limit=1000"));
    }

    #[test]
    fn test_parse_klines_response() {
        let raw_response = r#"[
            [
                1640995200000,
                "46222.01",
                "46271.02",
                "46222.01",
                "46271.02",
                "3.45",
                1641009599999,
                "159633.38",
                10,
                "1.72",
                "79516.69",
                "0"
            ]
        ]"#;

        let candles = parse_klines_body(raw_response).unwrap();

        assert_eq!(candles.len(), 1);
        let candle = &candles[0];
        assert_eq!(candle.open_time, 1640995200000);
        assert_eq!(candle.close_time, 1641009599999);
        assert_eq!(candle.open, 46222.01);
        assert_eq!(candle.high, 46271.02);
        assert_eq!(candle.volume, 3.45);
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_klines_body("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse_klines_body("{\"code\":-1121}"), Err(ApiError::Parse(_))));
        assert!(matches!(parse_klines_body("[[1, \"2\"]]"), Err(ApiError::Parse(_))));
        assert!(matches!(
            parse_klines_body("[[1, \"x\", \"1\", \"1\", \"1\", \"1\", 2]]"),
            Err(ApiError::Parse(_))
        ));
    }
}
