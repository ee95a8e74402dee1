//! config.toml loading plus the environment-only Discord secrets

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::api::ApiConfig;
use crate::common::constants::{
    DEFAULT_LOOKBACK_CANDLES, DEFAULT_METRICS_PORT, DEFAULT_QUOTE_ASSET, DEFAULT_SCAN_INTERVAL_SECONDS,
    DISCORD_API_BASE_URL, DISCORD_CHANNEL_ID_ENV, DISCORD_TOKEN_ENV,
};
use crate::logging::LoggingConfig;
use crate::notify::DiscordConfig;
use crate::scanner::{default_timeframes, ScannerSettings, TimeframeMapping, UniverseSource};
use crate::technical_analysis::IchimokuParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue { field: field.to_string(), reason: reason.into() }
    }
}

/// `[scanner]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerTomlConfig {
    /// Fixed symbol list; empty means discover every `quote_asset` pair
    pub symbols: Vec<String>,
    pub quote_asset: String,
    pub timeframes: Vec<TimeframeMapping>,
    pub scan_interval_seconds: u64,
    pub lookback: u32,
    /// Reload the discovered symbol list this often; 0 disables
    pub universe_refresh_minutes: u64,
}

impl Default for ScannerTomlConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            timeframes: default_timeframes(),
            scan_interval_seconds: DEFAULT_SCAN_INTERVAL_SECONDS,
            lookback: DEFAULT_LOOKBACK_CANDLES,
            universe_refresh_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Discord,
    /// Write alerts to the log only
    Log,
}

/// `[notifier]` section; credentials never live in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierTomlConfig {
    pub kind: NotifierKind,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for NotifierTomlConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Discord,
            base_url: DISCORD_API_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

/// `[metrics]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsTomlConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsTomlConfig {
    fn default() -> Self {
        Self { enabled: true, port: DEFAULT_METRICS_PORT }
    }
}

/// Full config.toml; every section is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scanner: ScannerTomlConfig,
    pub ichimoku: IchimokuParams,
    pub api: ApiConfig,
    pub notifier: NotifierTomlConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsTomlConfig,
}

impl ScannerConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    ///
    /// The flag reports whether the file was found.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<(Self, bool), ConfigError> {
        if path.as_ref().exists() {
            Ok((Self::from_toml(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ichimoku
            .validate()
            .map_err(|reason| ConfigError::invalid("ichimoku", reason))?;

        if self.scanner.scan_interval_seconds == 0 {
            return Err(ConfigError::invalid("scanner.scan_interval_seconds", "must be greater than zero"));
        }
        if self.scanner.lookback == 0 {
            return Err(ConfigError::invalid("scanner.lookback", "must be greater than zero"));
        }
        if self.scanner.timeframes.is_empty() {
            return Err(ConfigError::invalid("scanner.timeframes", "at least one timeframe is required"));
        }
        if let Some(tf) = self.scanner.timeframes.iter().find(|tf| tf.label.is_empty() || tf.interval.is_empty()) {
            return Err(ConfigError::invalid("scanner.timeframes", format!("empty label or interval in {:?}", tf)));
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::invalid("api.timeout_seconds", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scanner.scan_interval_seconds)
    }

    pub fn scanner_settings(&self) -> ScannerSettings {
        let universe_refresh = match self.scanner.universe_refresh_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        };
        ScannerSettings {
            lookback: self.scanner.lookback,
            params: self.ichimoku,
            universe_refresh,
        }
    }

    pub fn universe_source(&self) -> UniverseSource {
        if self.scanner.symbols.is_empty() {
            UniverseSource::Exchange { quote_asset: self.scanner.quote_asset.clone() }
        } else {
            UniverseSource::Static(self.scanner.symbols.clone())
        }
    }

    /// Discord settings with the token and channel id read from the environment
    pub fn discord_config(&self) -> Result<DiscordConfig, ConfigError> {
        self.discord_config_from(|name| std::env::var(name).ok())
    }

    fn discord_config_from<F>(&self, lookup: F) -> Result<DiscordConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(DISCORD_TOKEN_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnv(DISCORD_TOKEN_ENV.to_string()))?;

        let raw_channel = lookup(DISCORD_CHANNEL_ID_ENV)
            .ok_or_else(|| ConfigError::MissingEnv(DISCORD_CHANNEL_ID_ENV.to_string()))?;
        let channel_id = raw_channel
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::invalid(DISCORD_CHANNEL_ID_ENV, e.to_string()))?;

        let mut discord = DiscordConfig::new(token, channel_id);
        discord.base_url = self.notifier.base_url.clone();
        discord.timeout_seconds = self.notifier.timeout_seconds;
        Ok(discord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ScannerConfig::from_toml_str("").unwrap();
        assert_eq!(config.scanner.scan_interval_seconds, 60);
        assert_eq!(config.scanner.lookback, 100);
        assert_eq!(config.scanner.timeframes.len(), 2);
        assert_eq!(config.ichimoku, IchimokuParams::default());
        assert_eq!(config.notifier.kind, NotifierKind::Discord);
        assert_eq!(
            config.universe_source(),
            UniverseSource::Exchange { quote_asset: "USDT".to_string() }
        );
    }

    #[test]
    fn test_full_file() {
        let content = r#"
            [scanner]
            symbols = ["BTCUSDT", "SOLUSDT"]
            scan_interval_seconds = 30
            lookback = 200
            universe_refresh_minutes = 60
            timeframes = [{ label = "1h", interval = "1h" }]

            [ichimoku]
            tenkan_period = 7
            kijun_period = 22

            [notifier]
            kind = "log"

            [metrics]
            enabled = false
        "#;
        let config = ScannerConfig::from_toml_str(content).unwrap();
        assert_eq!(config.scan_interval(), Duration::from_secs(30));
        assert_eq!(config.ichimoku.tenkan_period, 7);
        assert_eq!(config.ichimoku.span_b_period, 52);
        assert_eq!(config.notifier.kind, NotifierKind::Log);
        assert!(!config.metrics.enabled);

        let settings = config.scanner_settings();
        assert_eq!(settings.lookback, 200);
        assert_eq!(settings.universe_refresh, Some(Duration::from_secs(3600)));
        assert!(matches!(config.universe_source(), UniverseSource::Static(ref s) if s.len() == 2));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_period = ScannerConfig::from_toml_str("[ichimoku]\nkijun_period = 0");
        assert!(matches!(zero_period, Err(ConfigError::InvalidValue { .. })));

        let zero_interval = ScannerConfig::from_toml_str("[scanner]\nscan_interval_seconds = 0");
        assert!(matches!(zero_interval, Err(ConfigError::InvalidValue { .. })));

        let no_timeframes = ScannerConfig::from_toml_str("[scanner]\ntimeframes = []");
        assert!(matches!(no_timeframes, Err(ConfigError::InvalidValue { .. })));

        assert!(matches!(ScannerConfig::from_toml_str("[scanner"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntimeout_seconds = 5").unwrap();
        let config = ScannerConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.api.timeout_seconds, 5);

        let (_, found) = ScannerConfig::load_or_default("/nonexistent/config.toml").unwrap();
        assert!(!found);
    }

    #[test]
    fn test_discord_secrets_from_env() {
        let config = ScannerConfig::default();

        let discord = config
            .discord_config_from(|name| match name {
                "DISCORD_TOKEN" => Some("abc".to_string()),
                "DISCORD_CHANNEL_ID" => Some("1234".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(discord.channel_id, 1234);
        assert_eq!(discord.token, "abc");

        let missing = config.discord_config_from(|_| None);
        assert!(matches!(missing, Err(ConfigError::MissingEnv(ref v)) if v == "DISCORD_TOKEN"));

        let bad_channel = config.discord_config_from(|name| match name {
            "DISCORD_TOKEN" => Some("abc".to_string()),
            _ => Some("general".to_string()),
        });
        assert!(matches!(bad_channel, Err(ConfigError::InvalidValue { .. })));
    }
}
