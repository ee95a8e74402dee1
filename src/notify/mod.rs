pub mod discord;
pub mod errors;
pub mod log_sink;

use async_trait::async_trait;

use crate::technical_analysis::Signal;

pub use discord::{DiscordConfig, DiscordNotifier};
pub use errors::NotifyError;
pub use log_sink::LogNotifier;

/// Outbound text channel for signal alerts.
///
/// Delivery is at-most-once: callers log failures and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// `BTCUSDT - Ichimoku 4H: LONG`
pub fn format_signal_message(symbol: &str, timeframe_label: &str, signal: Signal) -> String {
    format!("{} - Ichimoku {}: {}", symbol, timeframe_label.to_uppercase(), signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_signal_message() {
        assert_eq!(format_signal_message("BTCUSDT", "4h", Signal::Long), "BTCUSDT - Ichimoku 4H: LONG");
        assert_eq!(format_signal_message("ETHUSDT", "1d", Signal::Short), "ETHUSDT - Ichimoku 1D: SHORT");
    }
}
