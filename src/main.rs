//! fusionpbx-cdr-exporter - Prometheus exporter for FusionPBX CDR counts
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;
mod infrastructure;
mod metrics;

use crate::adapters::inbound::MetricsServer;
use crate::adapters::outbound::PgCdrStore;
use crate::application::CdrCollector;
use crate::config::{load_config, read_database_config};
use crate::infrastructure::{shutdown_signal, CdrPoller, ShutdownController};
use crate::metrics::CdrMetrics;
use anyhow::Context;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting fusionpbx-cdr-exporter listen={} config={}",
        cfg.listen_addr,
        cfg.fusion_config_path
    );

    // ===== COMPOSITION ROOT =====

    // 1. Database configuration and connection (both fatal on failure)
    let db_config = read_database_config(&cfg.fusion_config_path)
        .with_context(|| format!("reading config file {}", cfg.fusion_config_path))?;

    let store = Arc::new(
        PgCdrStore::connect(&db_config)
            .await
            .context("connecting to FusionPBX database")?,
    );

    // 2. Metrics instruments on an explicit registry (double registration
    //    is fatal)
    let registry = Arc::new(Registry::new());
    let cdr_metrics = CdrMetrics::new().context("building metrics")?;
    cdr_metrics
        .register_on(&registry)
        .context("registering metrics")?;

    // 3. Signal handling and the background poll loop
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let collector = CdrCollector::new(store, cdr_metrics);
    let poller = CdrPoller::new(collector, Duration::from_secs(cfg.poll_interval_secs))
        .start(&shutdown);

    // 4. Serve /metrics until shutdown; a listener failure is fatal
    let server = MetricsServer::new(cfg.listen_addr.clone(), registry);
    server.run(shutdown).await?;

    let _ = poller.await;
    Ok(())
}
