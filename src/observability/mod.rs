//! Observability for fmu-dataio
//!
//! Structured JSON logging on stderr. Every line is a single event with
//! deterministic key order, filtered by the `FMU_DATAIO_LOG` level.
//!
//! ```ignore
//! use fmu_dataio::observability::{log_event, Event, ObservationScope};
//!
//! log_event(Event::SchemasLoaded, &[("count", "3")]);
//!
//! let scope = ObservationScope::new("EXPORT");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use scope::ObservationScope;

/// Log a typed event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::ConfigLoaded, &[("path", "/tmp/global_variables.yml")]);
        log_event(Event::ValidationFailed, &[("violations", "2")]);
    }
}
