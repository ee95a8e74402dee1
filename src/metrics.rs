/// Prometheus metrics for the scan loop
///
/// Counters and histograms covering sweeps, market-data failures, emitted
/// signals and notification delivery.
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tracing::info;

use crate::technical_analysis::Signal;

/// Global metrics registry for the application
pub struct MetricsRegistry {
    registry: Registry,

    // Sweep metrics
    pub scans_total: IntCounter,
    pub scan_duration_seconds: Histogram,
    pub keys_scanned_total: IntCounter,
    pub tracked_keys: IntGauge,

    // Market data
    pub fetch_failures_total: IntCounterVec,
    pub duplicate_bars_total: IntCounterVec,

    // Signals and alerts
    pub signals_total: IntCounterVec,
    pub notifications_total: IntCounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scans_total = IntCounter::with_opts(
            Opts::new("ichimoku_scans_total", "Total number of completed universe sweeps")
        )?;

        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "ichimoku_scan_duration_seconds",
                "Wall-clock time of one universe sweep"
            ).buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        let keys_scanned_total = IntCounter::with_opts(
            Opts::new("ichimoku_keys_scanned_total", "Total number of symbol/timeframe keys visited")
        )?;

        let tracked_keys = IntGauge::with_opts(
            Opts::new("ichimoku_tracked_keys", "Keys with a recorded last-seen bar")
        )?;

        let fetch_failures_total = IntCounterVec::new(
            Opts::new("ichimoku_fetch_failures_total", "Keys skipped because candle data was unavailable"),
            &["timeframe", "reason"]
        )?;

        let duplicate_bars_total = IntCounterVec::new(
            Opts::new("ichimoku_duplicate_bars_total", "Keys skipped because their latest bar was already evaluated"),
            &["timeframe"]
        )?;

        let signals_total = IntCounterVec::new(
            Opts::new("ichimoku_signals_total", "Directional signals detected"),
            &["timeframe", "direction"]
        )?;

        let notifications_total = IntCounterVec::new(
            Opts::new("ichimoku_notifications_total", "Alert delivery attempts"),
            &["channel", "status"]
        )?;

        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;
        registry.register(Box::new(keys_scanned_total.clone()))?;
        registry.register(Box::new(tracked_keys.clone()))?;
        registry.register(Box::new(fetch_failures_total.clone()))?;
        registry.register(Box::new(duplicate_bars_total.clone()))?;
        registry.register(Box::new(signals_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;

        Ok(Self {
            registry,
            scans_total,
            scan_duration_seconds,
            keys_scanned_total,
            tracked_keys,
            fetch_failures_total,
            duplicate_bars_total,
            signals_total,
            notifications_total,
        })
    }

    /// Export metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("UTF-8 encoding error: {}", e)))
    }

    pub fn record_scan(&self, keys_scanned: usize, tracked_keys: usize, duration_seconds: f64) {
        self.scans_total.inc();
        self.keys_scanned_total.inc_by(keys_scanned as u64);
        self.tracked_keys.set(tracked_keys as i64);
        self.scan_duration_seconds.observe(duration_seconds);
    }

    pub fn record_fetch_failure(&self, timeframe: &str, reason: &str) {
        self.fetch_failures_total
            .with_label_values(&[timeframe, reason])
            .inc();
    }

    pub fn record_duplicate_bar(&self, timeframe: &str) {
        self.duplicate_bars_total
            .with_label_values(&[timeframe])
            .inc();
    }

    pub fn record_signal(&self, timeframe: &str, signal: Signal) {
        self.signals_total
            .with_label_values(&[timeframe, signal.as_str()])
            .inc();
    }

    pub fn record_notification(&self, channel: &str, delivered: bool) {
        let status = if delivered { "sent" } else { "failed" };
        self.notifications_total
            .with_label_values(&[channel, status])
            .inc();
    }
}

/// Global metrics instance
static METRICS: std::sync::OnceLock<Arc<MetricsRegistry>> = std::sync::OnceLock::new();

/// Initialize global metrics registry
pub fn init_metrics() -> Result<Arc<MetricsRegistry>, prometheus::Error> {
    let metrics = Arc::new(MetricsRegistry::new()?);
    METRICS.set(metrics.clone()).map_err(|_| {
        prometheus::Error::Msg("Metrics already initialized".to_string())
    })?;

    info!("Global metrics registry initialized");
    Ok(metrics)
}

/// Get global metrics instance
pub fn get_metrics() -> Option<Arc<MetricsRegistry>> {
    METRICS.get().cloned()
}

/// Convenience macros for metrics recording; no-ops until `init_metrics` runs
#[macro_export]
macro_rules! record_scan {
    ($keys_scanned:expr, $tracked_keys:expr, $duration_seconds:expr) => {
        if let Some(metrics) = $crate::metrics::get_metrics() {
            metrics.record_scan($keys_scanned, $tracked_keys, $duration_seconds);
        }
    };
}

#[macro_export]
macro_rules! record_fetch_failure {
    ($timeframe:expr, $reason:expr) => {
        if let Some(metrics) = $crate::metrics::get_metrics() {
            metrics.record_fetch_failure($timeframe, $reason);
        }
    };
}

#[macro_export]
macro_rules! record_duplicate_bar {
    ($timeframe:expr) => {
        if let Some(metrics) = $crate::metrics::get_metrics() {
            metrics.record_duplicate_bar($timeframe);
        }
    };
}

#[macro_export]
macro_rules! record_signal {
    ($timeframe:expr, $signal:expr) => {
        if let Some(metrics) = $crate::metrics::get_metrics() {
            metrics.record_signal($timeframe, $signal);
        }
    };
}

#[macro_export]
macro_rules! record_notification {
    ($channel:expr, $delivered:expr) => {
        if let Some(metrics) = $crate::metrics::get_metrics() {
            metrics.record_notification($channel, $delivered);
        }
    };
}
