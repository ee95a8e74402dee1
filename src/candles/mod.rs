pub mod errors;
pub mod structs;

pub use errors::SeriesError;
pub use structs::{CandleSeries, OHLCVCandle, TimestampMS};
