//! ObservationScope for store-wide operations
//!
//! - `{EVENT}_BEGIN` on creation
//! - `{EVENT}_COMPLETE` with `elapsed_us` on `complete`
//! - `{EVENT}_FAILED` with the reason on `fail`
//! - `{EVENT}_INCOMPLETE` if dropped without either

use std::time::Instant;

use super::events::Event;
use super::logger::Logger;

/// Brackets a long-running operation with begin/end log lines
pub struct ObservationScope {
    event: Event,
    fields: Vec<(&'static str, String)>,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    pub fn new(event: Event) -> Self {
        Self::with_fields(event, &[])
    }

    /// Fields are repeated on every line the scope logs
    pub fn with_fields(event: Event, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            event,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
            finished: false,
        };
        Logger::info(&scope.event_name("BEGIN"), &scope.field_refs());
        scope
    }

    pub fn complete(mut self) {
        self.finished = true;
        let elapsed = self.started.elapsed().as_micros().to_string();
        let mut fields = self.field_refs();
        fields.push(("elapsed_us", elapsed.as_str()));
        Logger::info(&self.event_name("COMPLETE"), &fields);
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.push(("reason", reason));
        Logger::error(&self.event_name("FAILED"), &fields);
    }

    fn event_name(&self, phase: &str) -> String {
        format!("{}_{}", self.event.as_str(), phase)
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &self.event_name("INCOMPLETE"),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
