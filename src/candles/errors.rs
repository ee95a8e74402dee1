use thiserror::Error;

use super::structs::TimestampMS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Candle {index} open_time {current} is not after previous open_time {previous}")]
    NotIncreasing {
        index: usize,
        previous: TimestampMS,
        current: TimestampMS,
    },
}
