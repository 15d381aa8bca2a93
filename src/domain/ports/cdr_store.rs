//! CDR Store Port
//!
//! Defines the interface for reading call-detail-record counts.
//! Implementations may use PostgreSQL or in-memory fixtures for tests.

use async_trait::async_trait;

/// Errors from a CDR store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CdrStoreError {
    /// The database could not be reached.
    #[error("connection error: {0}")]
    Connection(String),
    /// A query failed to execute or a row could not be decoded.
    #[error("query error: {0}")]
    Query(String),
}

/// Read-only access to the call-detail-record table.
///
/// This is an outbound port: the collector drives one poll cycle through
/// these three operations without knowing the storage details.
#[async_trait]
pub trait CdrStore: Send + Sync {
    /// Distinct gateway destinations currently present in the CDR table.
    async fn gateway_destinations(&self) -> Result<Vec<String>, CdrStoreError>;

    /// Number of call records for a single destination.
    async fn destination_count(&self, destination: &str) -> Result<i64, CdrStoreError>;

    /// Number of call records across all gateway destinations.
    async fn gateway_total(&self) -> Result<i64, CdrStoreError>;
}
