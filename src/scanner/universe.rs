use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiError, MarketDataSource};
use crate::common::constants::{FALLBACK_SYMBOLS, INTERVAL_1D, INTERVAL_4H};

use super::registry::TrackingKey;

/// Display label of a timeframe and the exchange interval code it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeMapping {
    pub label: String,
    pub interval: String,
}

impl TimeframeMapping {
    pub fn new(label: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            interval: interval.into(),
        }
    }
}

pub fn default_timeframes() -> Vec<TimeframeMapping> {
    vec![
        TimeframeMapping::new(INTERVAL_4H, INTERVAL_4H),
        TimeframeMapping::new(INTERVAL_1D, INTERVAL_1D),
    ]
}

/// Symbols and timeframes swept on every tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    symbols: Vec<String>,
    timeframes: Vec<TimeframeMapping>,
}

impl Universe {
    pub fn new(symbols: Vec<String>, timeframes: Vec<TimeframeMapping>) -> Self {
        let mut universe = Self { symbols: Vec::new(), timeframes };
        universe.set_symbols(symbols);
        universe
    }

    /// Replace the symbol list, dropping duplicates but keeping first-seen order
    pub fn set_symbols(&mut self, symbols: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        self.symbols = unique;
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn timeframes(&self) -> &[TimeframeMapping] {
        &self.timeframes
    }

    pub fn len(&self) -> usize {
        self.symbols.len() * self.timeframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every (key, exchange interval) pair, symbol-major, in configured order
    pub fn keys(&self) -> Vec<(TrackingKey, String)> {
        self.symbols
            .iter()
            .flat_map(|symbol| {
                self.timeframes.iter().map(move |tf| {
                    (TrackingKey::new(symbol.clone(), tf.label.clone()), tf.interval.clone())
                })
            })
            .collect()
    }
}

/// Where the tracked symbol list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseSource {
    /// Fixed list from configuration
    Static(Vec<String>),
    /// Every exchange symbol quoted in `quote_asset`
    Exchange { quote_asset: String },
}

impl UniverseSource {
    /// Look up the symbol list without any fallback
    pub async fn try_resolve(&self, data_source: &mut dyn MarketDataSource) -> Result<Vec<String>, ApiError> {
        match self {
            UniverseSource::Static(symbols) => Ok(symbols.clone()),
            UniverseSource::Exchange { quote_asset } => data_source.list_symbols(quote_asset).await,
        }
    }

    /// Resolve the symbol list; exchange lookups that fail or come back empty
    /// fall back to BTCUSDT and ETHUSDT.
    pub async fn resolve(&self, data_source: &mut dyn MarketDataSource) -> Vec<String> {
        match self.try_resolve(data_source).await {
            Ok(symbols) if !symbols.is_empty() => {
                info!("🪙 Loaded {} symbols for the scan universe", symbols.len());
                symbols
            }
            Ok(_) => {
                warn!("⚠️ {} returned no symbols, using fallback list", data_source.source_name());
                fallback_symbols()
            }
            Err(e) => {
                warn!("⚠️ Failed to load symbols from {}: {}. Using fallback list", data_source.source_name(), e);
                fallback_symbols()
            }
        }
    }
}

fn fallback_symbols() -> Vec<String> {
    FALLBACK_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::exchange::MockMarketDataSource;

    #[test]
    fn test_keys_are_symbol_major() {
        let universe = Universe::new(
            vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            default_timeframes(),
        );
        let keys: Vec<String> = universe.keys().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["BTCUSDT_4h", "BTCUSDT_1d", "ETHUSDT_4h", "ETHUSDT_1d"]);
        assert_eq!(universe.len(), 4);
    }

    #[test]
    fn test_label_and_interval_can_differ() {
        let universe = Universe::new(
            vec!["BTCUSDT".to_string()],
            vec![TimeframeMapping::new("daily", "1d")],
        );
        let (key, interval) = &universe.keys()[0];
        assert_eq!(key.timeframe_label, "daily");
        assert_eq!(interval, "1d");
    }

    #[test]
    fn test_duplicate_symbols_removed() {
        let universe = Universe::new(
            vec!["ETHUSDT".to_string(), "BTCUSDT".to_string(), "ETHUSDT".to_string()],
            default_timeframes(),
        );
        assert_eq!(universe.symbols(), &["ETHUSDT".to_string(), "BTCUSDT".to_string()]);
    }

    #[tokio::test]
    async fn test_static_source_skips_exchange() {
        let mut data_source = MockMarketDataSource::new();
        data_source.expect_list_symbols().never();
        let source = UniverseSource::Static(vec!["SOLUSDT".to_string()]);
        assert_eq!(source.resolve(&mut data_source).await, vec!["SOLUSDT".to_string()]);
    }

    #[tokio::test]
    async fn test_exchange_source_uses_listing() {
        let mut data_source = MockMarketDataSource::new();
        data_source
            .expect_list_symbols()
            .withf(|quote: &str| quote == "USDT")
            .times(1)
            .returning(|_| Ok(vec!["BNBUSDT".to_string()]));
        let source = UniverseSource::Exchange { quote_asset: "USDT".to_string() };
        assert_eq!(source.resolve(&mut data_source).await, vec!["BNBUSDT".to_string()]);
    }

    #[tokio::test]
    async fn test_exchange_failure_falls_back() {
        let mut data_source = MockMarketDataSource::new();
        data_source.expect_source_name().return_const("mock");
        data_source
            .expect_list_symbols()
            .returning(|_| Err(ApiError::Network("down".to_string())));
        let source = UniverseSource::Exchange { quote_asset: "USDT".to_string() };
        assert_eq!(source.resolve(&mut data_source).await, vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_listing_falls_back() {
        let mut data_source = MockMarketDataSource::new();
        data_source.expect_source_name().return_const("mock");
        data_source.expect_list_symbols().returning(|_| Ok(Vec::new()));
        let source = UniverseSource::Exchange { quote_asset: "USDT".to_string() };
        assert_eq!(source.resolve(&mut data_source).await.len(), 2);
        assert!(source.try_resolve(&mut data_source).await.unwrap().is_empty());
    }
}
