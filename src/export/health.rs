use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Prometheus metrics for agent health and observability.
///
/// All metrics use the "proxyscope" namespace. These observe the agent
/// itself (collection health), not the balancer's traffic.
pub struct HealthMetrics {
    registry: Registry,
    addr: String,
    shutdown: parking_lot::Mutex<Option<CancellationToken>>,

    /// Total snapshots collected and aggregated successfully.
    pub snapshots_total: Counter,
    /// Total failed collection attempts by error_type.
    pub snapshot_errors: CounterVec,
    /// Total statistic rows parsed across all snapshots.
    pub rows_parsed: Counter,
    /// Proxies observed in the most recent snapshot.
    pub proxies_tracked: Gauge,
    /// Pool members observed in the most recent snapshot.
    pub servers_tracked: Gauge,
    /// Listener entries observed in the most recent snapshot.
    pub listeners_tracked: Gauge,
    /// Reference fields missing from the most recent snapshot's header.
    pub fields_missing: Gauge,
    /// Snapshot fetch duration over the stats socket.
    pub fetch_duration: Histogram,
    /// Snapshot parse-and-aggregate duration.
    pub parse_duration: Histogram,
}

impl HealthMetrics {
    /// Creates a new health metrics instance with all metrics registered.
    pub fn new(addr: &str) -> Result<Self> {
        let registry = Registry::new();

        let snapshots_total = Counter::with_opts(
            Opts::new(
                "snapshots_total",
                "Total snapshots collected and aggregated successfully.",
            )
            .namespace("proxyscope"),
        )?;
        let snapshot_errors = CounterVec::new(
            Opts::new(
                "snapshot_errors_total",
                "Total failed collection attempts by error type.",
            )
            .namespace("proxyscope"),
            &["error_type"],
        )?;
        let rows_parsed = Counter::with_opts(
            Opts::new(
                "rows_parsed_total",
                "Total statistic rows parsed across all snapshots.",
            )
            .namespace("proxyscope"),
        )?;
        let proxies_tracked = Gauge::with_opts(
            Opts::new(
                "proxies_tracked",
                "Proxies observed in the most recent snapshot.",
            )
            .namespace("proxyscope"),
        )?;
        let servers_tracked = Gauge::with_opts(
            Opts::new(
                "servers_tracked",
                "Pool members observed in the most recent snapshot.",
            )
            .namespace("proxyscope"),
        )?;
        let listeners_tracked = Gauge::with_opts(
            Opts::new(
                "listeners_tracked",
                "Listener entries observed in the most recent snapshot.",
            )
            .namespace("proxyscope"),
        )?;
        let fields_missing = Gauge::with_opts(
            Opts::new(
                "fields_missing",
                "Reference fields missing from the most recent snapshot's header.",
            )
            .namespace("proxyscope"),
        )?;
        let fetch_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fetch_duration_seconds",
                "Snapshot fetch duration over the stats socket.",
            )
            .namespace("proxyscope")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        let parse_duration = Histogram::with_opts(
            HistogramOpts::new(
                "parse_duration_seconds",
                "Snapshot parse-and-aggregate duration.",
            )
            .namespace("proxyscope")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        registry.register(Box::new(snapshots_total.clone()))?;
        registry.register(Box::new(snapshot_errors.clone()))?;
        registry.register(Box::new(rows_parsed.clone()))?;
        registry.register(Box::new(proxies_tracked.clone()))?;
        registry.register(Box::new(servers_tracked.clone()))?;
        registry.register(Box::new(listeners_tracked.clone()))?;
        registry.register(Box::new(fields_missing.clone()))?;
        registry.register(Box::new(fetch_duration.clone()))?;
        registry.register(Box::new(parse_duration.clone()))?;

        Ok(Self {
            registry,
            addr: addr.to_string(),
            shutdown: parking_lot::Mutex::new(None),
            snapshots_total,
            snapshot_errors,
            rows_parsed,
            proxies_tracked,
            servers_tracked,
            listeners_tracked,
            fields_missing,
            fetch_duration,
            parse_duration,
        })
    }

    /// Starts the HTTP server serving /metrics and /healthz.
    pub async fn start(&self) -> Result<()> {
        let addr = if self.addr.is_empty() {
            ":9123"
        } else {
            &self.addr
        };

        // Parse address, handling ":port" shorthand.
        let bind_addr = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };

        let registry = self.registry.clone();
        let app_state = Arc::new(AppState { registry });

        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/healthz", get(healthz_handler))
            .with_state(app_state);

        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("listening on {bind_addr}"))?;

        let local_addr = listener.local_addr().context("getting local address")?;

        let cancel = CancellationToken::new();
        *self.shutdown.lock() = Some(cancel.clone());

        tokio::spawn(async move {
            tracing::info!(addr = %local_addr, "health metrics server started");

            let result = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await;

            if let Err(e) = result {
                tracing::error!(error = %e, "health metrics server error");
            }
        });

        Ok(())
    }

    /// Gracefully shuts down the health metrics server.
    pub async fn stop(&self) -> Result<()> {
        if let Some(cancel) = self.shutdown.lock().take() {
            cancel.cancel();
        }

        Ok(())
    }
}

/// Shared state for axum handlers.
struct AppState {
    registry: Registry,
}

/// GET /metrics - Prometheus text format.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "encoding metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "encoding error".to_string(),
        );
    }

    match String::from_utf8(buffer) {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            tracing::error!(error = %e, "converting metrics to string");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encoding error".to_string(),
            )
        }
    }
}

/// GET /healthz - Simple health check.
async fn healthz_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_without_collision() {
        let health = HealthMetrics::new(":0").expect("metrics");
        health.snapshots_total.inc();
        health
            .snapshot_errors
            .with_label_values(&["proxy_shape"])
            .inc();
        health.proxies_tracked.set(3.0);

        let families = health.registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "proxyscope_snapshots_total"));
    }

    #[tokio::test]
    async fn test_server_starts_and_stops_on_ephemeral_port() {
        let health = HealthMetrics::new("127.0.0.1:0").expect("metrics");
        health.start().await.expect("start");
        health.stop().await.expect("stop");
    }
}
