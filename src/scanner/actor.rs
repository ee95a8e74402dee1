use std::time::{Duration, Instant};

use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::{ActorStopReason, BoxError};
use kameo::message::{Context, Message};
use kameo::request::MessageSend;
use kameo::{Actor, mailbox::unbounded::UnboundedMailbox};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::MarketDataSource;
use crate::candles::{CandleSeries, TimestampMS};
use crate::common::constants::BINANCE_MAX_KLINES_LIMIT;
use crate::notify::{format_signal_message, Notifier};
use crate::technical_analysis::{classify, compute_ichimoku, IchimokuParams};
use crate::{record_duplicate_bar, record_fetch_failure, record_notification, record_scan, record_signal};

use super::registry::{LastSeenRegistry, TrackingKey};
use super::universe::{Universe, UniverseSource};

/// Runtime settings for the scanner actor
#[derive(Debug, Clone)]
pub struct ScannerSettings {
    pub lookback: u32,
    pub params: IchimokuParams,
    pub universe_refresh: Option<Duration>,
}

impl ScannerSettings {
    /// Candles requested per key, capped at the exchange maximum.
    pub fn request_limit(&self) -> u32 {
        self.lookback.min(BINANCE_MAX_KLINES_LIMIT)
    }

    /// Whether a fetched series is long enough for a defined lagging span.
    /// When it is not, every reading classifies as Neutral.
    pub fn confirms_lagging_span(&self) -> bool {
        self.request_limit() as usize >= self.params.complete_row_bars()
    }
}

/// Outcome counts of one universe sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub keys_scanned: usize,
    pub data_unavailable: usize,
    pub duplicates_skipped: usize,
    pub evaluated: usize,
    pub insufficient_history: usize,
    pub signals: usize,
    pub notifications_sent: usize,
    pub notification_failures: usize,
    pub duration: Duration,
}

/// Cumulative counters since the actor started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerStats {
    pub scans_completed: u64,
    pub keys_scanned: u64,
    pub data_unavailable: u64,
    pub signals: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
    pub tracked_keys: usize,
    pub universe_size: usize,
    pub last_scan_at: Option<TimestampMS>,
    pub last_scan_duration: Option<Duration>,
}

impl ScannerStats {
    fn absorb(&mut self, report: &ScanReport) {
        self.scans_completed += 1;
        self.keys_scanned += report.keys_scanned as u64;
        self.data_unavailable += report.data_unavailable as u64;
        self.signals += report.signals as u64;
        self.notifications_sent += report.notifications_sent as u64;
        self.notification_failures += report.notification_failures as u64;
        self.last_scan_at = Some(chrono::Utc::now().timestamp_millis());
        self.last_scan_duration = Some(report.duration);
    }
}

/// Scanner actor tell messages
#[derive(Debug, Clone)]
pub enum ScannerTell {
    /// Reload the symbol list from the universe source before the next sweep
    RefreshUniverse,
}

/// Scanner actor ask messages
#[derive(Debug, Clone)]
pub enum ScannerAsk {
    /// Sweep every key once
    RunScan,
    GetStats,
    GetLastSeen { symbol: String, timeframe_label: String },
}

/// Scanner actor replies
#[derive(Debug, Clone)]
pub enum ScannerReply {
    ScanCompleted(ScanReport),
    Stats(ScannerStats),
    LastSeen(Option<TimestampMS>),
}

/// Sweeps the universe, evaluating each key's newest bar at most once.
///
/// The mailbox serializes sweeps, so the last-seen registry has a single
/// writer and no two sweeps ever overlap.
pub struct ScannerActor {
    settings: ScannerSettings,
    data_source: Box<dyn MarketDataSource>,
    notifier: Box<dyn Notifier>,
    notifier_name: &'static str,
    universe: Universe,
    universe_source: Option<UniverseSource>,
    last_universe_refresh: Instant,
    refresh_requested: bool,
    registry: LastSeenRegistry,
    stats: ScannerStats,
}

impl ScannerActor {
    pub fn new(
        settings: ScannerSettings,
        universe: Universe,
        data_source: Box<dyn MarketDataSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let notifier_name = notifier.name();
        Self {
            settings,
            data_source,
            notifier,
            notifier_name,
            universe,
            universe_source: None,
            last_universe_refresh: Instant::now(),
            refresh_requested: false,
            registry: LastSeenRegistry::new(),
            stats: ScannerStats::default(),
        }
    }

    /// Enable symbol list reloads from `source`
    pub fn with_universe_source(mut self, source: UniverseSource) -> Self {
        self.universe_source = Some(source);
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn stats(&self) -> ScannerStats {
        let mut stats = self.stats.clone();
        stats.tracked_keys = self.registry.len();
        stats.universe_size = self.universe.len();
        stats
    }

    pub fn last_seen(&self, key: &TrackingKey) -> Option<TimestampMS> {
        self.registry.get(key)
    }

    /// Visit every key once, symbol-major in configured order
    pub async fn scan_universe(&mut self) -> ScanReport {
        let started = Instant::now();
        self.maybe_refresh_universe().await;

        let mut report = ScanReport::default();
        let keys = self.universe.keys();
        debug!("🔍 Scanning {} keys", keys.len());

        for (key, interval) in keys {
            report.keys_scanned += 1;
            self.scan_key(&key, &interval, &mut report).await;
        }

        report.duration = started.elapsed();
        self.stats.absorb(&report);
        record_scan!(report.keys_scanned, self.registry.len(), report.duration.as_secs_f64());

        info!(
            keys = report.keys_scanned,
            evaluated = report.evaluated,
            signals = report.signals,
            unavailable = report.data_unavailable,
            "✅ Scan completed in {:.2}s",
            report.duration.as_secs_f64()
        );

        report
    }

    async fn scan_key(&mut self, key: &TrackingKey, interval: &str, report: &mut ScanReport) {
        let limit = self.settings.request_limit();

        let candles = match self.data_source.fetch_candles(&key.symbol, interval, limit).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!("⚠️ Failed to fetch {} candles: {}", key, e);
                report.data_unavailable += 1;
                record_fetch_failure!(&key.timeframe_label, if e.is_rate_limit() { "rate_limit" } else { "request" });
                return;
            }
        };

        let series = match CandleSeries::new(candles) {
            Ok(series) => series,
            Err(e) => {
                warn!("⚠️ Discarding malformed {} series: {}", key, e);
                report.data_unavailable += 1;
                record_fetch_failure!(&key.timeframe_label, "malformed");
                return;
            }
        };

        let Some(latest_open_time) = series.latest_open_time() else {
            debug!("No candles returned for {}", key);
            report.data_unavailable += 1;
            record_fetch_failure!(&key.timeframe_label, "empty");
            return;
        };

        // Marked seen before evaluation: a failed alert is not retried for this bar
        if !self.registry.observe(key, latest_open_time) {
            debug!("Bar {} already evaluated for {}", latest_open_time, key);
            report.duplicates_skipped += 1;
            record_duplicate_bar!(&key.timeframe_label);
            return;
        }

        report.evaluated += 1;
        let state = compute_ichimoku(Some(&series), &self.settings.params);
        if state.is_none() {
            debug!("Not enough history for {} ({} bars)", key, series.len());
            report.insufficient_history += 1;
        }

        let signal = classify(state.as_ref());
        if let Some(state) = &state {
            debug!("{} {} -> {}", key, state, signal);
        }
        if !signal.is_directional() {
            return;
        }

        report.signals += 1;
        record_signal!(&key.timeframe_label, signal);

        let message = format_signal_message(&key.symbol, &key.timeframe_label, signal);
        match self.notifier.send(&message).await {
            Ok(()) => {
                info!("📣 Sent: {}", message);
                report.notifications_sent += 1;
                record_notification!(self.notifier_name, true);
            }
            Err(e) => {
                error!("❌ Failed to send '{}' via {}: {}", message, self.notifier_name, e);
                report.notification_failures += 1;
                record_notification!(self.notifier_name, false);
            }
        }
    }

    async fn maybe_refresh_universe(&mut self) {
        let due = match self.settings.universe_refresh {
            Some(every) => self.last_universe_refresh.elapsed() >= every,
            None => false,
        };
        if due || self.refresh_requested {
            self.refresh_universe().await;
        }
    }

    async fn refresh_universe(&mut self) {
        self.refresh_requested = false;
        self.last_universe_refresh = Instant::now();

        let Some(source) = &self.universe_source else {
            debug!("No universe source configured, keeping {} symbols", self.universe.symbols().len());
            return;
        };

        // Keep the current list when the lookup fails
        match source.try_resolve(self.data_source.as_mut()).await {
            Ok(symbols) if !symbols.is_empty() => {
                let before = self.universe.symbols().len();
                self.universe.set_symbols(symbols);
                info!("🔄 Universe refreshed: {} -> {} symbols", before, self.universe.symbols().len());
            }
            Ok(_) => warn!("⚠️ Universe refresh returned no symbols, keeping current list"),
            Err(e) => warn!("⚠️ Universe refresh failed: {}. Keeping current list", e),
        }
    }
}

impl Actor for ScannerActor {
    type Mailbox = UnboundedMailbox<Self>;

    fn name() -> &'static str {
        "ScannerActor"
    }

    async fn on_start(&mut self, _actor_ref: ActorRef<Self>) -> Result<(), BoxError> {
        info!("🚀 Starting Scanner Actor");
        info!(
            "📊 Tracking {} symbols x {} timeframes, {} candles per request, alerts via {}",
            self.universe.symbols().len(),
            self.universe.timeframes().len(),
            self.settings.request_limit(),
            self.notifier_name
        );
        Ok(())
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _reason: ActorStopReason,
    ) -> Result<(), BoxError> {
        info!("🛑 Stopping Scanner Actor");
        info!(
            "📊 Final stats: {} scans, {} signals, {} alerts sent, {} alert failures",
            self.stats.scans_completed,
            self.stats.signals,
            self.stats.notifications_sent,
            self.stats.notification_failures
        );
        Ok(())
    }
}

impl Message<ScannerTell> for ScannerActor {
    type Reply = ();

    async fn handle(&mut self, msg: ScannerTell, _ctx: Context<'_, Self, Self::Reply>) -> Self::Reply {
        match msg {
            ScannerTell::RefreshUniverse => {
                self.refresh_requested = true;
            }
        }
    }
}

impl Message<ScannerAsk> for ScannerActor {
    type Reply = Result<ScannerReply, String>;

    async fn handle(&mut self, msg: ScannerAsk, _ctx: Context<'_, Self, Self::Reply>) -> Self::Reply {
        match msg {
            ScannerAsk::RunScan => Ok(ScannerReply::ScanCompleted(self.scan_universe().await)),
            ScannerAsk::GetStats => Ok(ScannerReply::Stats(self.stats())),
            ScannerAsk::GetLastSeen { symbol, timeframe_label } => {
                let key = TrackingKey::new(symbol, timeframe_label);
                Ok(ScannerReply::LastSeen(self.last_seen(&key)))
            }
        }
    }
}

/// Drive `RunScan` on a fixed period.
///
/// Each sweep is awaited before the next tick, and late ticks are delayed
/// rather than burst. The task ends when the actor stops.
pub fn spawn_scan_timer(actor_ref: ActorRef<ScannerActor>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match actor_ref.ask(ScannerAsk::RunScan).send().await {
                Ok(ScannerReply::ScanCompleted(report)) => {
                    debug!("Scan report: {:?}", report);
                }
                Ok(other) => {
                    warn!("Unexpected reply to RunScan: {:?}", other);
                }
                Err(e) => {
                    warn!("⏹️ Scanner actor unavailable, stopping scan timer: {}", e);
                    break;
                }
            }
        }
    })
}
