pub mod client;
pub mod exchange_info;
pub mod klines;

pub use client::BinanceClient;
pub use exchange_info::BinanceExchangeInfoClient;
pub use klines::BinanceKlinesClient;
