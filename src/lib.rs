pub mod api;
pub mod candles;
pub mod common;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod metrics_server;
pub mod notify;
pub mod scanner;
pub mod technical_analysis;
