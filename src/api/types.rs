use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candles::TimestampMS;
use crate::common::constants::{BINANCE_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_MIN_REQUEST_INTERVAL_MS};

/// Supported API endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiEndpoint {
    /// Kline/Candlestick data
    Klines,
    /// Exchange info (symbol listing)
    ExchangeInfo,
}

impl ApiEndpoint {
    /// Get the Binance Spot API path for this endpoint
    pub fn binance_path(&self) -> &'static str {
        match self {
            ApiEndpoint::Klines => "/api/v3/klines",
            ApiEndpoint::ExchangeInfo => "/api/v3/exchangeInfo",
        }
    }
}

/// API request configuration
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: ApiEndpoint,
    pub symbol: String,
    pub interval: String,
    pub limit: Option<u32>,
}

impl ApiRequest {
    pub fn new_klines(symbol: String, interval: String) -> Self {
        Self {
            endpoint: ApiEndpoint::Klines,
            symbol,
            interval,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn new_exchange_info() -> Self {
        Self {
            endpoint: ApiEndpoint::ExchangeInfo,
            symbol: "".to_string(), // Not used for exchange info
            interval: "".to_string(),
            limit: None,
        }
    }
}

/// API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub timestamp: TimestampMS,
    pub rate_limit_info: Option<RateLimitInfo>,
}

/// Rate limiting information from API headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub weight_used: u32,
    pub retry_after: Option<u32>,
}

/// API error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl ApiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimit(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// REST client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub min_request_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
        }
    }
}

/// API statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStats {
    pub requests_made: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub rate_limit_hits: u64,
    pub total_candles_fetched: u64,
    pub last_request_time: Option<TimestampMS>,
}

impl ApiStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self) {
        self.requests_made += 1;
        self.last_request_time = Some(chrono::Utc::now().timestamp_millis());
    }

    pub fn record_success(&mut self, candles_count: u64) {
        self.requests_successful += 1;
        self.total_candles_fetched += candles_count;
    }

    pub fn record_failure(&mut self) {
        self.requests_failed += 1;
    }

    pub fn record_rate_limit(&mut self) {
        self.rate_limit_hits += 1;
        self.record_failure();
    }

    pub fn success_rate(&self) -> f64 {
        if self.requests_made == 0 {
            0.0
        } else {
            self.requests_successful as f64 / self.requests_made as f64
        }
    }

    /// True on every `every`-th request; `every == 0` never reports.
    pub fn is_report_due(&self, every: u64) -> bool {
        every > 0 && self.requests_made > 0 && self.requests_made % every == 0
    }
}
