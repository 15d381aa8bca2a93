//! Metrics HTTP Server
//!
//! Serves the Prometheus text exposition of the shared registry.
//! One route, no authentication.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::infrastructure::ShutdownController;

/// HTTP server exposing `GET /metrics`.
pub struct MetricsServer {
    listen_addr: String,
    registry: Arc<Registry>,
}

impl MetricsServer {
    /// Create a new server for the given registry.
    pub fn new(listen_addr: String, registry: Arc<Registry>) -> Self {
        Self {
            listen_addr,
            registry,
        }
    }

    /// Build the router. Exposed for handler tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.registry.clone())
    }

    /// Bind and serve until the shutdown controller fires.
    ///
    /// A bind or listener failure is returned to the caller, which treats
    /// it as fatal.
    pub async fn run(self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("metrics endpoint listening on {}", self.listen_addr);

        let mut rx = shutdown.subscribe();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                if !shutdown.is_shutdown() {
                    let _ = rx.recv().await;
                }
            })
            .await?;

        Ok(())
    }
}

/// Render the current registry state in the text exposition format.
async fn metrics_handler(State(registry): State<Arc<Registry>>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&registry.gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
