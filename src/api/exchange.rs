use async_trait::async_trait;

use crate::api::types::ApiError;
use crate::candles::OHLCVCandle;

/// Source of historical bars and tradable symbols.
///
/// The scanner treats every `Err` the same way: no data for that key this tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` bars for `symbol` at `interval`, oldest first.
    async fn fetch_candles(&mut self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<OHLCVCandle>, ApiError>;

    /// Symbols quoted in `quote_asset` (e.g. every `*USDT` pair).
    async fn list_symbols(&mut self, quote_asset: &str) -> Result<Vec<String>, ApiError>;

    /// Get the exchange name for identification
    fn source_name(&self) -> &'static str;
}
