use async_trait::async_trait;
use tracing::info;

use super::{Notifier, NotifyError};

/// Writes alerts to the log instead of an external channel (dry runs)
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!(alert = %text, "📣 Signal alert (log notifier)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        tokio_test::assert_ok!(notifier.send("BTCUSDT - Ichimoku 4H: LONG").await);
        assert_eq!(notifier.name(), "log");
    }
}
