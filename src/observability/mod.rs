//! Observability
//!
//! - Structured JSON logging to stderr
//! - Per-store counters
//! - Begin/complete tracing of store-wide operations
//!
//! Observability is read-only: nothing here changes the outcome of the
//! operation being observed.

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, StoreMetrics};
pub use scope::ObservationScope;

/// Logs `event` at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
