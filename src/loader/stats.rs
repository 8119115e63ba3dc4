//! Loader Statistics Module

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Loader Stats ==
/// Counters describing how well a loader coalesces lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderStats {
    /// Total `load` calls, cache hits included
    pub loads: u64,
    /// Calls answered from the loader cache without joining a batch
    pub cache_hits: u64,
    /// Batch function invocations
    pub batches: u64,
    /// Distinct keys handed to the batch function
    pub keys_dispatched: u64,
    /// Batch function invocations that failed or returned misaligned results
    pub failures: u64,
    /// Wall-clock time of the latest dispatch
    pub last_dispatch_at: Option<DateTime<Utc>>,
}

impl LoaderStats {
    /// Average distinct keys per batch function call.
    pub fn mean_batch_size(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.keys_dispatched as f64 / self.batches as f64
        }
    }

    pub(crate) fn record_dispatch(&mut self, keys: usize) {
        self.batches += 1;
        self.keys_dispatched += keys as u64;
        self.last_dispatch_at = Some(Utc::now());
    }
}
