//! Observability
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed events
//! - Begin/complete scopes with timing
//! - Query counters
//!
//! Observability is read-only: it never changes what a query returns.
//!
//! ```ignore
//! use aggtree::observability::{Event, Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info(Event::QueryCompiled.as_str(), &[("request_id", &id)]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event; failure events go out at ERROR, the rest at INFO
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
