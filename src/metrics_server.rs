/// HTTP endpoints for Prometheus scraping and liveness/readiness probes
///
/// - GET /metrics - Prometheus text format
/// - GET /health  - process is running
/// - GET /ready   - scanner actor answers and has completed a sweep
use kameo::actor::ActorRef;
use kameo::request::MessageSend;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::Filter;

use crate::metrics::get_metrics;
use crate::scanner::{ScannerActor, ScannerAsk, ScannerReply};

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

fn metrics_reply() -> warp::reply::WithStatus<String> {
    match get_metrics() {
        Some(metrics) => match metrics.export_metrics() {
            Ok(text) => warp::reply::with_status(text, StatusCode::OK),
            Err(e) => {
                error!("Failed to export metrics: {}", e);
                warp::reply::with_status(format!("Failed to export metrics: {}", e), StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        None => {
            warn!("Metrics registry not initialized");
            warp::reply::with_status("Metrics registry not initialized".to_string(), StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn check_readiness(
    scanner: Option<ActorRef<ScannerActor>>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    let Some(scanner) = scanner else {
        return Ok(warp::reply::with_status(
            warp::reply::json(&json!({ "status": "not_ready", "reason": "scanner not started" })),
            StatusCode::SERVICE_UNAVAILABLE,
        ));
    };

    let (body, status) = match timeout(READINESS_TIMEOUT, scanner.ask(ScannerAsk::GetStats).send()).await {
        Ok(Ok(ScannerReply::Stats(stats))) if stats.scans_completed > 0 => (
            json!({
                "status": "ready",
                "scans_completed": stats.scans_completed,
                "tracked_keys": stats.tracked_keys,
                "universe_size": stats.universe_size,
                "last_scan_at": stats.last_scan_at,
            }),
            StatusCode::OK,
        ),
        Ok(Ok(ScannerReply::Stats(_))) => (
            json!({ "status": "not_ready", "reason": "first scan in progress" }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Ok(Ok(other)) => (
            json!({ "status": "not_ready", "reason": format!("unexpected reply: {:?}", other) }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Ok(Err(e)) => (
            json!({ "status": "not_ready", "reason": e.to_string() }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Err(_) => (
            json!({ "status": "not_ready", "reason": "timeout" }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Build the route table; split out so tests can drive it with `warp::test`
pub fn routes(
    scanner: Option<ActorRef<ScannerActor>>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let metrics = warp::path("metrics")
        .and(warp::get())
        .map(metrics_reply);

    let health = warp::path("health")
        .and(warp::get())
        .map(|| {
            warp::reply::with_status(
                warp::reply::json(&json!({
                    "status": "healthy",
                    "service": "ichimoku-scanner",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
                StatusCode::OK,
            )
        });

    let ready = warp::path("ready")
        .and(warp::get())
        .and_then(move || check_readiness(scanner.clone()));

    metrics.or(health).or(ready)
}

/// Serve `/metrics`, `/health` and `/ready` on `0.0.0.0:port` until the task is dropped
pub async fn start_metrics_server(port: u16, scanner: Option<ActorRef<ScannerActor>>) {
    info!("🚀 Metrics server starting on port {}", port);
    info!("📊 Prometheus metrics available at http://0.0.0.0:{}/metrics", port);
    info!("💚 Health check available at http://0.0.0.0:{}/health", port);

    warp::serve(routes(scanner))
        .run(([0, 0, 0, 0], port))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(None))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_without_scanner() {
        let response = warp::test::request()
            .method("GET")
            .path("/ready")
            .reply(&routes(None))
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_path_is_rejected() {
        let response = warp::test::request()
            .method("GET")
            .path("/dashboard")
            .reply(&routes(None))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
