use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{Notifier, NotifyError};
use crate::common::constants::DISCORD_API_BASE_URL;

/// Discord bot credentials and target channel
#[derive(Clone)]
pub struct DiscordConfig {
    pub base_url: String,
    pub token: String,
    pub channel_id: u64,
    pub timeout_seconds: u64,
}

impl DiscordConfig {
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            base_url: DISCORD_API_BASE_URL.to_string(),
            token,
            channel_id,
            timeout_seconds: 10,
        }
    }
}

// Keep the bot token out of Debug output
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Posts alerts to a Discord channel through the bot REST API
pub struct DiscordNotifier {
    client: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Result<Self, NotifyError> {
        if config.token.trim().is_empty() {
            return Err(NotifyError::Config("Discord token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/api/v10/channels/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.channel_id
        )
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = self.messages_url();
        debug!("Posting alert to Discord channel {}", self.config.channel_id);

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .json(&json!({ "content": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Http { status: status.as_u16(), body });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
