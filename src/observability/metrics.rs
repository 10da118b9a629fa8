//! Store metrics
//!
//! - Counters only, monotonic
//! - One registry per store, reset only by dropping the store
//! - Relaxed atomics; readers may observe counters mid-update

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one store
#[derive(Debug, Default)]
pub struct StoreMetrics {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    items_written: AtomicU64,
    items_removed: AtomicU64,
    /// Indexes filled from the store contents
    index_populations: AtomicU64,
    rebuilds: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_items_written(&self, count: u64) {
        self.items_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_items_removed(&self, count: u64) {
        self.items_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_index_populations(&self) {
        self.index_populations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rebuilds(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"queries_executed":{},"queries_rejected":{},"items_written":{},"items_removed":{},"index_populations":{},"rebuilds":{}}}"#,
            s.queries_executed,
            s.queries_rejected,
            s.items_written,
            s.items_removed,
            s.index_populations,
            s.rebuilds,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            items_written: self.items_written.load(Ordering::Relaxed),
            items_removed: self.items_removed.load(Ordering::Relaxed),
            index_populations: self.index_populations.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`StoreMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub items_written: u64,
    pub items_removed: u64,
    pub index_populations: u64,
    pub rebuilds: u64,
}
