//! fusionpbx-cdr-exporter Library
//!
//! This module exposes the exporter components for use in integration
//! tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod metrics;

// Re-export commonly used types
pub use adapters::inbound::MetricsServer;
pub use adapters::outbound::PgCdrStore;
pub use application::CdrCollector;
pub use config::{load_config, read_database_config, Config, DatabaseConfig};
pub use domain::entities::DestinationCount;
pub use domain::ports::{CdrStore, CdrStoreError};
pub use infrastructure::{shutdown_signal, CdrPoller, ShutdownController};
pub use metrics::CdrMetrics;
