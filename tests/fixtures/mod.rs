#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use ichimoku_scanner::api::{ApiError, MarketDataSource};
use ichimoku_scanner::candles::{CandleSeries, OHLCVCandle};
use ichimoku_scanner::notify::{Notifier, NotifyError};
use ichimoku_scanner::scanner::{ScannerSettings, TimeframeMapping, Universe};
use ichimoku_scanner::technical_analysis::IchimokuParams;

pub const FOUR_HOURS_MS: i64 = 4 * 3_600_000;

/// Create one 4h candle with a two-point high/low range around `close`
pub fn create_sample_candle(index: usize, close: f64) -> OHLCVCandle {
    let open_time = 1_700_000_000_000 + index as i64 * FOUR_HOURS_MS;
    OHLCVCandle::new_from_values(
        open_time,
        open_time + FOUR_HOURS_MS - 1,
        close,
        close + 1.0,
        close - 1.0,
        close,
        100.0,
    )
}

/// Bars `start..start + len`, close = 1000 + step * index
pub fn create_trending_candles(start: usize, len: usize, step: f64) -> Vec<OHLCVCandle> {
    (start..start + len)
        .map(|i| create_sample_candle(i, 1000.0 + step * i as f64))
        .collect()
}

pub fn create_trending_series(len: usize, step: f64) -> CandleSeries {
    CandleSeries::new(create_trending_candles(0, len, step)).expect("fixture candles are increasing")
}

pub fn create_test_settings() -> ScannerSettings {
    ScannerSettings {
        lookback: 100,
        params: IchimokuParams::default(),
        universe_refresh: None,
    }
}

pub fn create_test_universe(symbols: &[&str]) -> Universe {
    Universe::new(
        symbols.iter().map(|s| s.to_string()).collect(),
        vec![TimeframeMapping::new("4h", "4h"), TimeframeMapping::new("1d", "1d")],
    )
}

/// In-memory market data keyed by (symbol, interval); clones share state
#[derive(Clone, Default)]
pub struct FakeDataSource {
    responses: Arc<Mutex<FxHashMap<(String, String), Result<Vec<OHLCVCandle>, ApiError>>>>,
    requests: Arc<Mutex<Vec<(String, String, u32)>>>,
    symbols: Arc<Mutex<Vec<String>>>,
}

impl FakeDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_candles(&self, symbol: &str, interval: &str, candles: Vec<OHLCVCandle>) {
        self.responses
            .lock()
            .unwrap()
            .insert((symbol.to_string(), interval.to_string()), Ok(candles));
    }

    pub fn set_error(&self, symbol: &str, interval: &str, error: ApiError) {
        self.responses
            .lock()
            .unwrap()
            .insert((symbol.to_string(), interval.to_string()), Err(error));
    }

    pub fn set_symbols(&self, symbols: &[&str]) {
        *self.symbols.lock().unwrap() = symbols.iter().map(|s| s.to_string()).collect();
    }

    pub fn requests(&self) -> Vec<(String, String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for FakeDataSource {
    async fn fetch_candles(&mut self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<OHLCVCandle>, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), interval.to_string(), limit));

        self.responses
            .lock()
            .unwrap()
            .get(&(symbol.to_string(), interval.to_string()))
            .cloned()
            .unwrap_or_else(|| Err(ApiError::InvalidSymbol(symbol.to_string())))
    }

    async fn list_symbols(&mut self, _quote_asset: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.symbols.lock().unwrap().clone())
    }

    fn source_name(&self) -> &'static str {
        "fake"
    }
}

/// Notifier that keeps every message it was asked to send
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Http { status: 503, body: "unavailable".to_string() });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
