use thiserror::Error;

/// Custom error types for alert delivery
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    /// Notifier configuration error
    #[error("Notifier configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Failed to reach notification channel: {0}")]
    Network(String),

    /// Channel answered with a non-success status
    #[error("Notification rejected with HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Network(err.to_string())
    }
}
