//! Domain Entities - Core business objects

/// One per-destination sample from the most recent poll cycle.
///
/// Recomputed in full on every cycle; never persisted and never diffed
/// against a previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationCount {
    /// Gateway destination as stored in the CDR table (`gw+...`)
    pub destination: String,
    /// Number of call records for this destination
    pub count: i64,
}
