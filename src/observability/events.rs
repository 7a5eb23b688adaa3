//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Tree building
    /// Program resolved into an executor tree
    TreeBuilt,

    // Query
    /// Request compiled from the tree
    QueryCompiled,
    /// Request sent to the backend
    BackendDispatch,
    /// Backend response decoded into rows
    ResponseDecoded,
    /// Query finished with rows
    QueryExecuted,
    /// Query aborted by an error
    QueryFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TreeBuilt => "TREE_BUILT",
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::BackendDispatch => "BACKEND_DISPATCH",
            Event::ResponseDecoded => "RESPONSE_DECODED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryFailed => "QUERY_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
