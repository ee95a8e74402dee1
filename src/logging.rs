//! Console + rotating file logging
//!
//! Console output is human-readable; the file stream defaults to JSON so scan
//! outcomes can be grepped per key after the fact.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::technical_analysis::IchimokuParams;

const LOG_FILE_PREFIX: &str = "ichimoku_scanner";

/// `[logging]` section of config.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    /// EnvFilter directive; `RUST_LOG` wins when set
    pub level_filter: String,
    pub rotation: LogRotation,
    pub console_timestamps: bool,
    pub file_json_format: bool,
    /// Disable to log to the console only
    pub file_enabled: bool,
    /// Log files older than this are removed at startup; 0 keeps everything
    pub cleanup_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            level_filter: "info,ichimoku_scanner=info".to_string(),
            rotation: LogRotation::Daily,
            console_timestamps: true,
            file_json_format: true,
            file_enabled: true,
            cleanup_days: 14,
        }
    }
}

fn env_filter(level_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_filter))
}

fn file_appender(config: &LoggingConfig) -> RollingFileAppender {
    let file_name = format!("{}.log", LOG_FILE_PREFIX);
    match config.rotation {
        LogRotation::Daily => tracing_appender::rolling::daily(&config.log_dir, file_name),
        LogRotation::Hourly => tracing_appender::rolling::hourly(&config.log_dir, file_name),
        LogRotation::Never => tracing_appender::rolling::never(&config.log_dir, file_name),
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the background file writer on drop, so keep it
/// alive for the whole process. `None` when file output is disabled.
pub fn init_dual_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_level(true)
        .with_target(true)
        .with_timer(if config.console_timestamps {
            ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f UTC".to_string())
        } else {
            ChronoUtc::new(String::new())
        })
        .with_filter(env_filter(&config.level_filter));

    if !config.file_enabled {
        tracing_subscriber::registry().with(console_layer).try_init()?;
        tracing::info!("🖥️ Console logging initialized");
        return Ok(None);
    }

    std::fs::create_dir_all(&config.log_dir)?;
    let (file_writer, guard) = non_blocking(file_appender(config));

    let file_layer = if config.file_json_format {
        fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string()))
            .with_filter(env_filter(&config.level_filter))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f UTC".to_string()))
            .with_filter(env_filter(&config.level_filter))
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        log_dir = %config.log_dir,
        rotation = ?config.rotation,
        json_format = config.file_json_format,
        "📁 Dual logging initialized - console + rotating files"
    );

    Ok(Some(guard))
}

/// Console-only logging for tools and ad-hoc runs
pub fn init_simple_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info,ichimoku_scanner=info"))
        .try_init()?;
    Ok(())
}

/// Log files written by this service in `log_dir`, sorted by name
pub fn get_current_log_files(log_dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_service_log(path))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn is_service_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(LOG_FILE_PREFIX) && name.contains(".log"))
        .unwrap_or(false)
}

/// Remove service log files last modified more than `keep_days` ago
pub fn cleanup_old_logs(log_dir: impl AsRef<Path>, keep_days: u32) -> Result<usize, std::io::Error> {
    if keep_days == 0 {
        return Ok(0);
    }

    let cutoff_time = std::time::SystemTime::now()
        - std::time::Duration::from_secs(keep_days as u64 * 24 * 3600);

    let mut removed_count = 0;
    for path in get_current_log_files(log_dir) {
        let modified = path.metadata().and_then(|m| m.modified())?;
        if modified < cutoff_time {
            std::fs::remove_file(&path)?;
            removed_count += 1;
            tracing::debug!("🗑️ Removed old log file: {:?}", path);
        }
    }

    if removed_count > 0 {
        tracing::info!("🧹 Cleaned up {} old log files (older than {} days)", removed_count, keep_days);
    }

    Ok(removed_count)
}

/// Log build and indicator settings once at startup
pub fn log_system_info(params: &IchimokuParams) {
    tracing::info!(
        package_version = env!("CARGO_PKG_VERSION"),
        target_arch = std::env::consts::ARCH,
        target_os = std::env::consts::OS,
        "📊 Environment information logged"
    );
    tracing::info!(
        tenkan = params.tenkan_period,
        kijun = params.kijun_period,
        span_b = params.span_b_period,
        displacement = params.displacement,
        "☁️ Ichimoku parameters"
    );
}
