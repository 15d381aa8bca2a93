mod metrics_server;

pub use metrics_server::MetricsServer;
