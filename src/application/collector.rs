//! CDR Collector - poll-cycle use case
//!
//! Runs one metrics update: enumerate gateway destinations, count records
//! per destination, count the aggregate, and overwrite the gauges.

use crate::domain::entities::DestinationCount;
use crate::domain::ports::{CdrStore, CdrStoreError};
use crate::metrics::CdrMetrics;
use std::sync::Arc;

/// Poll-cycle use case.
///
/// Owns the gauge instruments and reads CDR counts through the store port.
pub struct CdrCollector {
    store: Arc<dyn CdrStore>,
    metrics: CdrMetrics,
}

impl CdrCollector {
    /// Create a new collector.
    pub fn new(store: Arc<dyn CdrStore>, metrics: CdrMetrics) -> Self {
        Self { store, metrics }
    }

    /// Run one poll cycle.
    ///
    /// Gauges are overwritten as each count arrives; an error aborts the
    /// rest of the cycle but values already written this cycle are kept.
    /// The three reads are not transactionally consistent with each other.
    pub async fn update(&self) -> Result<(), CdrStoreError> {
        let destinations = self.store.gateway_destinations().await?;

        for destination in destinations {
            let count = self.store.destination_count(&destination).await?;
            self.metrics
                .set_destination(&DestinationCount { destination, count });
        }

        let total = self.store.gateway_total().await?;
        self.metrics.set_total(total);

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prometheus::Registry;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store with an optional per-destination failure.
    struct MockCdrStore {
        destinations: Mutex<Vec<String>>,
        counts: Mutex<HashMap<String, i64>>,
        fail_listing: Mutex<bool>,
        fail_destination: Mutex<Option<String>>,
    }

    impl MockCdrStore {
        fn new(entries: &[(&str, i64)]) -> Self {
            Self {
                destinations: Mutex::new(entries.iter().map(|(d, _)| d.to_string()).collect()),
                counts: Mutex::new(
                    entries
                        .iter()
                        .map(|(d, c)| (d.to_string(), *c))
                        .collect(),
                ),
                fail_listing: Mutex::new(false),
                fail_destination: Mutex::new(None),
            }
        }

        fn set_entries(&self, entries: &[(&str, i64)]) {
            *self.destinations.lock().unwrap() =
                entries.iter().map(|(d, _)| d.to_string()).collect();
            *self.counts.lock().unwrap() = entries
                .iter()
                .map(|(d, c)| (d.to_string(), *c))
                .collect();
        }
    }

    #[async_trait]
    impl CdrStore for MockCdrStore {
        async fn gateway_destinations(&self) -> Result<Vec<String>, CdrStoreError> {
            if *self.fail_listing.lock().unwrap() {
                return Err(CdrStoreError::Query("listing failed".to_string()));
            }
            Ok(self.destinations.lock().unwrap().clone())
        }

        async fn destination_count(&self, destination: &str) -> Result<i64, CdrStoreError> {
            if self.fail_destination.lock().unwrap().as_deref() == Some(destination) {
                return Err(CdrStoreError::Query("count failed".to_string()));
            }
            Ok(self
                .counts
                .lock()
                .unwrap()
                .get(destination)
                .copied()
                .unwrap_or(0))
        }

        async fn gateway_total(&self) -> Result<i64, CdrStoreError> {
            Ok(self.counts.lock().unwrap().values().sum())
        }
    }

    fn registered_metrics() -> (Registry, CdrMetrics) {
        let registry = Registry::new();
        let metrics = CdrMetrics::new().unwrap();
        metrics.register_on(&registry).unwrap();
        (registry, metrics)
    }

    fn labeled_value(registry: &Registry, destination: &str) -> Option<f64> {
        registry
            .gather()
            .iter()
            .find(|mf| mf.get_name() == "fusionpbx_individual_caller_destination_count")?
            .get_metric()
            .iter()
            .find(|m| {
                m.get_label()
                    .iter()
                    .any(|l| l.get_name() == "destination" && l.get_value() == destination)
            })
            .map(|m| m.get_gauge().get_value())
    }

    fn total_value(registry: &Registry) -> Option<f64> {
        registry
            .gather()
            .iter()
            .find(|mf| mf.get_name() == "fusionpbx_total_caller_destination_count")?
            .get_metric()
            .first()
            .map(|m| m.get_gauge().get_value())
    }

    fn series_count(registry: &Registry) -> usize {
        registry
            .gather()
            .iter()
            .find(|mf| mf.get_name() == "fusionpbx_individual_caller_destination_count")
            .map(|mf| mf.get_metric().len())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_update_sets_labeled_and_total_gauges() {
        let store = Arc::new(MockCdrStore::new(&[("gw+100", 3), ("gw+200", 5)]));
        let (registry, metrics) = registered_metrics();
        let collector = CdrCollector::new(store, metrics);

        collector.update().await.unwrap();

        assert_eq!(series_count(&registry), 2);
        assert_eq!(labeled_value(&registry, "gw+100"), Some(3.0));
        assert_eq!(labeled_value(&registry, "gw+200"), Some(5.0));
        assert_eq!(total_value(&registry), Some(8.0));
    }

    #[tokio::test]
    async fn test_listing_failure_writes_nothing() {
        let store = Arc::new(MockCdrStore::new(&[("gw+100", 3)]));
        *store.fail_listing.lock().unwrap() = true;
        let (registry, metrics) = registered_metrics();
        let collector = CdrCollector::new(store, metrics);

        let result = collector.update().await;

        assert!(matches!(result, Err(CdrStoreError::Query(_))));
        assert_eq!(series_count(&registry), 0);
        assert_eq!(total_value(&registry), Some(0.0));
    }

    #[tokio::test]
    async fn test_per_destination_failure_keeps_earlier_values() {
        let store = Arc::new(MockCdrStore::new(&[("gw+100", 3), ("gw+200", 5)]));
        *store.fail_destination.lock().unwrap() = Some("gw+200".to_string());
        let (registry, metrics) = registered_metrics();
        let collector = CdrCollector::new(store, metrics);

        let result = collector.update().await;

        // The cycle is abandoned, but gw+100 was already written and stays.
        assert!(matches!(result, Err(CdrStoreError::Query(_))));
        assert_eq!(labeled_value(&registry, "gw+100"), Some(3.0));
        assert_eq!(labeled_value(&registry, "gw+200"), None);
        assert_eq!(total_value(&registry), Some(0.0));
    }

    #[tokio::test]
    async fn test_stale_destination_series_persists() {
        let store = Arc::new(MockCdrStore::new(&[("gw+100", 3), ("gw+200", 5)]));
        let (registry, metrics) = registered_metrics();
        let collector = CdrCollector::new(store.clone(), metrics);

        collector.update().await.unwrap();
        assert_eq!(total_value(&registry), Some(8.0));

        // gw+200 disappears from the data; its series keeps the last value.
        store.set_entries(&[("gw+100", 3)]);
        collector.update().await.unwrap();

        assert_eq!(series_count(&registry), 2);
        assert_eq!(labeled_value(&registry, "gw+200"), Some(5.0));
        assert_eq!(total_value(&registry), Some(3.0));
    }

    #[tokio::test]
    async fn test_update_with_no_destinations() {
        let store = Arc::new(MockCdrStore::new(&[]));
        let (registry, metrics) = registered_metrics();
        let collector = CdrCollector::new(store, metrics);

        collector.update().await.unwrap();

        assert_eq!(series_count(&registry), 0);
        assert_eq!(total_value(&registry), Some(0.0));
    }
}
