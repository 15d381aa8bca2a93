//! CDR Metrics
//!
//! The two gauge instruments exposed by the exporter. Instruments are
//! registered on a caller-owned registry; there is no process-wide
//! implicit registry.

use crate::domain::entities::DestinationCount;
use prometheus::{Gauge, GaugeVec, Opts, Registry};

/// Gauge instruments for CDR counts.
///
/// Clones share the underlying instrument state, so the poll loop and the
/// registered copies observe the same values.
#[derive(Clone)]
pub struct CdrMetrics {
    individual_counts: GaugeVec,
    total_count: Gauge,
}

impl CdrMetrics {
    /// Build both instruments. Does not register them anywhere.
    pub fn new() -> prometheus::Result<Self> {
        let individual_counts = GaugeVec::new(
            Opts::new(
                "fusionpbx_individual_caller_destination_count",
                "Count of calls to individual caller destinations",
            ),
            &["destination"],
        )?;

        let total_count = Gauge::with_opts(Opts::new(
            "fusionpbx_total_caller_destination_count",
            "Total count of calls to all gateways",
        ))?;

        Ok(Self {
            individual_counts,
            total_count,
        })
    }

    /// Register both instruments on `registry`.
    ///
    /// Registration is single-use per registry: a second registration of the
    /// same metric name returns `AlreadyReg`.
    pub fn register_on(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.individual_counts.clone()))?;
        registry.register(Box::new(self.total_count.clone()))?;
        Ok(())
    }

    /// Overwrite the labeled gauge for one destination.
    ///
    /// Series for destinations that stop appearing in later cycles are left
    /// in place at their last value.
    pub fn set_destination(&self, sample: &DestinationCount) {
        self.individual_counts
            .with_label_values(&[sample.destination.as_str()])
            .set(sample.count as f64);
    }

    /// Overwrite the aggregate gauge.
    pub fn set_total(&self, count: i64) {
        self.total_count.set(count as f64);
    }
}
