//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines on stderr)
//! - Typed pipeline events
//! - Monotonic counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on expansion results
//! 3. No async or background threads
//!
//! # Usage
//!
//! ```ignore
//! use expander::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! log_event_with_fields(Event::ResolveBatch, Severity::Info, &[("resolver", "DbRefResolver")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a pipeline event
pub fn log_event(event: Event, severity: Severity) {
    Logger::log(severity, event.as_str(), &[]);
}

/// Log a pipeline event with fields
pub fn log_event_with_fields(event: Event, severity: Severity, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded, Severity::Info);
        log_event(Event::TaskSlotMissing, Severity::Warn);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(
            Event::ResolveBatch,
            Severity::Trace,
            &[("resolver", "test"), ("references", "3")],
        );
    }
}
