//! Observable store events

use std::fmt;

use super::logger::Severity;

/// Events emitted by indexes, the query layer and the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Index lifecycle
    IndexRegistered,
    IndexPopulated,
    IndexCleared,
    /// A unique index refused an item
    IndexInsertFailed,

    // Store lifecycle, logged through `ObservationScope`
    StorePopulate,
    StoreRebuild,
    StoreDestroyed,

    // Queries
    QueryExecuted,
    QueryRejected,
    /// Per-selector evaluation detail
    QueryEvaluated,

    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IndexRegistered => "INDEX_REGISTERED",
            Event::IndexPopulated => "INDEX_POPULATED",
            Event::IndexCleared => "INDEX_CLEARED",
            Event::IndexInsertFailed => "INDEX_INSERT_FAILED",
            Event::StorePopulate => "STORE_POPULATE",
            Event::StoreRebuild => "STORE_REBUILD",
            Event::StoreDestroyed => "STORE_DESTROYED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryEvaluated => "QUERY_EVALUATED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryExecuted | Event::QueryEvaluated => Severity::Trace,
            Event::QueryRejected => Severity::Warn,
            Event::IndexInsertFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
