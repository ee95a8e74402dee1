use serde::{Deserialize, Serialize};

use super::errors::SeriesError;

pub type TimestampMS = i64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OHLCVCandle {
    pub open_time: TimestampMS,
    pub close_time: TimestampMS,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OHLCVCandle {
    #[allow(clippy::too_many_arguments)]
    pub fn new_from_values(
        open_time: TimestampMS,
        close_time: TimestampMS,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn open_time(&self) -> TimestampMS {
        self.open_time
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }
}

/// The most recent bars for one (symbol, timeframe) pair, oldest first.
///
/// Built fresh for every scan and never mutated afterwards. Construction
/// enforces strictly increasing `open_time`; OHLC consistency is trusted
/// from the exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<OHLCVCandle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<OHLCVCandle>) -> Result<Self, SeriesError> {
        for (index, pair) in candles.windows(2).enumerate() {
            if pair[1].open_time <= pair[0].open_time {
                return Err(SeriesError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0].open_time,
                    current: pair[1].open_time,
                });
            }
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[OHLCVCandle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&OHLCVCandle> {
        self.candles.last()
    }

    /// Open time of the newest bar, used as the dedup marker.
    pub fn latest_open_time(&self) -> Option<TimestampMS> {
        self.last().map(|c| c.open_time)
    }
}

impl TryFrom<Vec<OHLCVCandle>> for CandleSeries {
    type Error = SeriesError;

    fn try_from(candles: Vec<OHLCVCandle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}
