pub mod binance;
pub mod exchange;
pub mod types;

pub use binance::BinanceClient;
pub use exchange::MarketDataSource;
pub use types::*;
