use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::export::health::HealthMetrics;
use crate::resolve::{MappingResolver, NameResolver};
use crate::source::{SnapshotSource, UnixSocketSource};
use crate::stats::{self, SnapshotStats};

/// Agent orchestrates all components: snapshot source, name resolution,
/// the poll loop, and the health metrics server.
pub struct Agent {
    cfg: Config,
    health: Arc<HealthMetrics>,
    source: Arc<dyn SnapshotSource>,
    resolver: Arc<dyn NameResolver>,
    cancel: CancellationToken,
}

impl Agent {
    /// Creates a new Agent, initializing health metrics and collaborators.
    pub fn new(cfg: Config) -> Result<Self> {
        let health =
            Arc::new(HealthMetrics::new(&cfg.health.addr).context("creating health metrics")?);

        let source = Arc::new(UnixSocketSource::new(
            cfg.haproxy.socket_path.clone(),
            cfg.haproxy.timeout,
        ));

        let resolver = Arc::new(MappingResolver::new(&cfg.resolver));

        Ok(Self {
            cfg,
            health,
            source,
            resolver,
            cancel: CancellationToken::new(),
        })
    }

    /// Start the health server and the snapshot poll loop.
    pub async fn start(&self) -> Result<()> {
        self.health
            .start()
            .await
            .context("starting health metrics server")?;

        let health = Arc::clone(&self.health);
        let source = Arc::clone(&self.source);
        let resolver = Arc::clone(&self.resolver);
        let cancel = self.cancel.clone();
        let poll_interval = self.cfg.haproxy.poll_interval;

        info!(
            socket = %self.cfg.haproxy.socket_path.display(),
            interval = ?poll_interval,
            "snapshot collection started",
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("snapshot collection stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        collect_once(&health, &source, &resolver).await;
                    }
                }
            }
        });

        Ok(())
    }

    /// Stop the poll loop and the health server.
    pub async fn stop(&self) -> Result<()> {
        self.cancel.cancel();
        self.health.stop().await?;

        Ok(())
    }
}

/// Fetch, parse, and account for one snapshot.
async fn collect_once(
    health: &HealthMetrics,
    source: &Arc<dyn SnapshotSource>,
    resolver: &Arc<dyn NameResolver>,
) {
    let fetch_started = Instant::now();
    let fetch_source = Arc::clone(source);

    // The socket fetch blocks; keep it off the runtime workers.
    let fetched = tokio::task::spawn_blocking(move || fetch_source.fetch()).await;

    let text = match fetched {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, "snapshot fetch failed");
            health.snapshot_errors.with_label_values(&["fetch"]).inc();
            return;
        }
        Err(e) => {
            warn!(error = %e, "snapshot fetch task failed");
            health.snapshot_errors.with_label_values(&["fetch"]).inc();
            return;
        }
    };

    health
        .fetch_duration
        .observe(fetch_started.elapsed().as_secs_f64());

    let parse_started = Instant::now();

    match stats::parse_snapshot(&text, resolver.as_ref()) {
        Ok(snapshot) => {
            health
                .parse_duration
                .observe(parse_started.elapsed().as_secs_f64());
            record_snapshot(health, &snapshot);
        }
        Err(e) => {
            warn!(error = %e, "snapshot parsing failed");
            health
                .snapshot_errors
                .with_label_values(&[e.label()])
                .inc();
        }
    }
}

/// Update health metrics and log the per-poll summary.
fn record_snapshot(health: &HealthMetrics, snapshot: &SnapshotStats) {
    health.snapshots_total.inc();
    health.rows_parsed.inc_by(snapshot.row_count() as f64);
    health.proxies_tracked.set(snapshot.proxies.len() as f64);
    health.servers_tracked.set(snapshot.server_count() as f64);
    health
        .listeners_tracked
        .set(snapshot.listener_count() as f64);
    health
        .fields_missing
        .set(snapshot.missing_fields.len() as f64);

    debug!(
        proxies = snapshot.proxies.len(),
        servers = snapshot.server_count(),
        listeners = snapshot.listener_count(),
        missing_fields = snapshot.missing_fields.len(),
        captured_at = snapshot.captured_at,
        "snapshot aggregated",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::PassthroughResolver;

    struct StaticSource(&'static str);

    impl SnapshotSource for StaticSource {
        fn fetch(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSource;

    impl SnapshotSource for FailingSource {
        fn fetch(&self) -> Result<String> {
            anyhow::bail!("socket gone")
        }
    }

    const SNAPSHOT: &str = "\
# pxname,svname,qcur,scur
app,FRONTEND,,2
app,node-1,0,1
app,BACKEND,0,3
";

    #[tokio::test]
    async fn test_collect_once_accounts_a_snapshot() {
        let health = HealthMetrics::new(":0").expect("metrics");
        let source: Arc<dyn SnapshotSource> = Arc::new(StaticSource(SNAPSHOT));
        let resolver: Arc<dyn NameResolver> = Arc::new(PassthroughResolver);

        collect_once(&health, &source, &resolver).await;

        assert_eq!(health.snapshots_total.get() as u64, 1);
        assert_eq!(health.proxies_tracked.get() as u64, 1);
        assert_eq!(health.servers_tracked.get() as u64, 1);
        assert_eq!(health.rows_parsed.get() as u64, 3);
    }

    #[tokio::test]
    async fn test_collect_once_counts_fetch_failures() {
        let health = HealthMetrics::new(":0").expect("metrics");
        let source: Arc<dyn SnapshotSource> = Arc::new(FailingSource);
        let resolver: Arc<dyn NameResolver> = Arc::new(PassthroughResolver);

        collect_once(&health, &source, &resolver).await;

        assert_eq!(health.snapshots_total.get() as u64, 0);
        assert_eq!(
            health
                .snapshot_errors
                .with_label_values(&["fetch"])
                .get() as u64,
            1
        );
    }

    #[tokio::test]
    async fn test_collect_once_labels_parse_failures() {
        let health = HealthMetrics::new(":0").expect("metrics");
        let source: Arc<dyn SnapshotSource> =
            Arc::new(StaticSource("# pxname,svname,qcur\napp,FRONTEND,\n"));
        let resolver: Arc<dyn NameResolver> = Arc::new(PassthroughResolver);

        collect_once(&health, &source, &resolver).await;

        assert_eq!(
            health
                .snapshot_errors
                .with_label_values(&["proxy_shape"])
                .get() as u64,
            1
        );
    }
}
