use ichimoku_scanner::api::{BinanceClient, MarketDataSource};
use ichimoku_scanner::config::{NotifierKind, ScannerConfig};
use ichimoku_scanner::logging::{cleanup_old_logs, init_dual_logging, init_simple_logging, log_system_info};
use ichimoku_scanner::metrics::init_metrics;
use ichimoku_scanner::metrics_server::start_metrics_server;
use ichimoku_scanner::notify::{DiscordNotifier, LogNotifier, Notifier};
use ichimoku_scanner::scanner::{spawn_scan_timer, ScannerActor, ScannerAsk, ScannerReply, Universe};
use kameo::actor::ActorRef;
use kameo::request::MessageSend;
use tokio::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(600);

fn build_notifier(config: &ScannerConfig) -> Result<Box<dyn Notifier>, String> {
    match config.notifier.kind {
        NotifierKind::Discord => {
            let discord = config.discord_config().map_err(|e| e.to_string())?;
            info!("💬 Discord notifier configured for channel {}", discord.channel_id);
            let notifier = DiscordNotifier::new(discord).map_err(|e| e.to_string())?;
            Ok(Box::new(notifier))
        }
        NotifierKind::Log => {
            warn!("📝 Log notifier selected, alerts will only be written to the log");
            Ok(Box::new(LogNotifier))
        }
    }
}

async fn log_scanner_status(scanner: &ActorRef<ScannerActor>) {
    match scanner.ask(ScannerAsk::GetStats).send().await {
        Ok(ScannerReply::Stats(stats)) => {
            info!(
                scans = stats.scans_completed,
                signals = stats.signals,
                alerts_sent = stats.notifications_sent,
                alert_failures = stats.notification_failures,
                unavailable = stats.data_unavailable,
                tracked_keys = stats.tracked_keys,
                universe = stats.universe_size,
                "💓 Scanner status"
            );
        }
        Ok(other) => warn!("Unexpected reply to GetStats: {:?}", other),
        Err(e) => warn!("⚠️ Scanner status unavailable: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Simple prints until logging is initialized
    let (config, found) = match ScannerConfig::load_or_default(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Invalid configuration in {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let _logging_guard = match init_dual_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Failed to initialize logging system: {}", e);
            if let Err(e) = init_simple_logging() {
                eprintln!("❌ Fallback logging failed too: {}", e);
            }
            None
        }
    };

    if found {
        info!("✅ Loaded configuration from {}", config_path);
    } else {
        warn!("⚠️ {} not found, using default configuration", config_path);
    }

    if config.logging.file_enabled {
        if let Err(e) = cleanup_old_logs(&config.logging.log_dir, config.logging.cleanup_days) {
            warn!("⚠️ Failed to clean up old log files: {}", e);
        }
    }

    log_system_info(&config.ichimoku);
    info!("🚀 Starting Ichimoku Scanner");

    let notifier = match build_notifier(&config) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("❌ Notifier setup failed: {}", e);
            std::process::exit(1);
        }
    };

    if config.metrics.enabled {
        match init_metrics() {
            Ok(_) => info!("📊 Prometheus metrics initialized successfully"),
            Err(e) => warn!("⚠️ Failed to initialize metrics: {}", e),
        }
    }

    let mut client = match BinanceClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Failed to create Binance client: {}", e);
            std::process::exit(1);
        }
    };

    let universe_source = config.universe_source();
    let symbols = universe_source.resolve(&mut client).await;
    let universe = Universe::new(symbols, config.scanner.timeframes.clone());
    info!(
        source = client.source_name(),
        symbols = universe.symbols().len(),
        timeframes = universe.timeframes().len(),
        "🪙 Universe ready with {} keys",
        universe.len()
    );

    let settings = config.scanner_settings();
    if !settings.confirms_lagging_span() {
        warn!(
            "⚠️ {} candles per request leave the {} lagging span undefined, every key will read NEUTRAL (needs {})",
            settings.request_limit(),
            settings.params,
            settings.params.complete_row_bars()
        );
    }

    let actor = ScannerActor::new(settings, universe, Box::new(client), notifier)
        .with_universe_source(universe_source);
    let scanner_ref = kameo::spawn(actor);

    if config.metrics.enabled {
        let port = config.metrics.port;
        let server_ref = scanner_ref.clone();
        tokio::spawn(async move {
            start_metrics_server(port, Some(server_ref)).await;
        });
    }

    let scan_interval = config.scan_interval();
    info!("⏱️ Scanning every {}s", scan_interval.as_secs());
    let scan_timer = spawn_scan_timer(scanner_ref.clone(), scan_interval);

    let mut status_interval = tokio::time::interval(STATUS_LOG_INTERVAL);
    status_interval.tick().await;

    loop {
        tokio::select! {
            _ = status_interval.tick() => {
                log_scanner_status(&scanner_ref).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutdown signal received");
                break;
            }
        }
    }

    scan_timer.abort();
    if let Err(e) = scanner_ref.stop_gracefully().await {
        warn!("⚠️ Scanner actor did not accept stop request: {}", e);
    }
    scanner_ref.wait_for_stop().await;

    info!("🏁 Graceful shutdown completed");
}
