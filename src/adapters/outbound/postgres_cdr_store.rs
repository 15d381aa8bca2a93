//! PostgreSQL CDR Store
//!
//! Implements CdrStore against the FusionPBX `v_xml_cdr` table.

use crate::config::DatabaseConfig;
use crate::domain::ports::{CdrStore, CdrStoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// LIKE pattern selecting gateway destinations (`+` is a literal here,
/// `%` the wildcard).
const GATEWAY_PATTERN: &str = "gw+%";

/// PostgreSQL-backed CDR store.
///
/// Holds a single persistent connection; the poll loop is the only issuer
/// of queries and runs them strictly one at a time.
pub struct PgCdrStore {
    pool: PgPool,
}

impl PgCdrStore {
    /// Connect to the FusionPBX database. Fails if it is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, CdrStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&config.connection_url())
            .await
            .map_err(|e| CdrStoreError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CdrStore for PgCdrStore {
    async fn gateway_destinations(&self) -> Result<Vec<String>, CdrStoreError> {
        sqlx::query_scalar(
            "SELECT DISTINCT caller_destination FROM v_xml_cdr WHERE caller_destination LIKE $1",
        )
        .bind(GATEWAY_PATTERN)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CdrStoreError::Query(e.to_string()))
    }

    async fn destination_count(&self, destination: &str) -> Result<i64, CdrStoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM v_xml_cdr WHERE caller_destination LIKE $1")
            .bind(destination)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CdrStoreError::Query(e.to_string()))
    }

    async fn gateway_total(&self) -> Result<i64, CdrStoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM v_xml_cdr WHERE caller_destination LIKE $1")
            .bind(GATEWAY_PATTERN)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CdrStoreError::Query(e.to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_pattern() {
        assert!(GATEWAY_PATTERN.starts_with("gw+"));
        assert!(GATEWAY_PATTERN.ends_with('%'));
    }

    #[tokio::test]
    async fn test_connect_unreachable_host_is_connection_error() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: "1".to_string(),
            name: "fusionpbx".to_string(),
            username: "nobody".to_string(),
            password: "nothing".to_string(),
        };

        let result = PgCdrStore::connect(&config).await;
        assert!(matches!(result, Err(CdrStoreError::Connection(_))));
    }
}
