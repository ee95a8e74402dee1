use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::exchange::MarketDataSource;
use crate::api::types::{ApiConfig, ApiError, ApiRequest, ApiStats};
use crate::candles::OHLCVCandle;

use super::exchange_info::BinanceExchangeInfoClient;
use super::klines::BinanceKlinesClient;

/// Klines requests between two request-stats log lines
const STATS_LOG_EVERY: u64 = 500;

/// Binance Spot market-data source: klines plus symbol discovery
pub struct BinanceClient {
    klines_client: BinanceKlinesClient,
    exchange_info_client: BinanceExchangeInfoClient,
    stats: ApiStats,
}

impl BinanceClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            klines_client: BinanceKlinesClient::new(config)?,
            exchange_info_client: BinanceExchangeInfoClient::new(config)?,
            stats: ApiStats::new(),
        })
    }

    fn log_stats_if_due(&self) {
        if self.stats.is_report_due(STATS_LOG_EVERY) {
            info!(
                requests = self.stats.requests_made,
                rate_limit_hits = self.stats.rate_limit_hits,
                candles = self.stats.total_candles_fetched,
                "🌐 Binance klines: {:.1}% success rate",
                self.stats.success_rate() * 100.0
            );
        }
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn fetch_candles(&mut self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<OHLCVCandle>, ApiError> {
        self.stats.record_request();

        let request = ApiRequest::new_klines(symbol.to_string(), interval.to_string())
            .with_limit(limit);

        let outcome = match self.klines_client.fetch_klines(request).await {
            Ok(response) => {
                if let Some(info) = &response.rate_limit_info {
                    tracing::trace!(weight_used = info.weight_used, "Binance request weight");
                }
                self.stats.record_success(response.data.len() as u64);
                Ok(response.data)
            }
            Err(e) => {
                if e.is_rate_limit() {
                    self.stats.record_rate_limit();
                    warn!("⚠️ Rate limit hit while fetching {} {}", symbol, interval);
                } else {
                    self.stats.record_failure();
                }
                Err(e)
            }
        };
        self.log_stats_if_due();
        outcome
    }

    async fn list_symbols(&mut self, quote_asset: &str) -> Result<Vec<String>, ApiError> {
        self.exchange_info_client.fetch_symbols(quote_asset).await
    }

    fn source_name(&self) -> &'static str {
        "binance"
    }
}
