//! Transport errors

use thiserror::Error;

/// Result type for backend dispatch
pub type TransportResult<T> = Result<T, TransportError>;

/// Dispatch failures; surfaced unchanged, never retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("search timed out after {0} ms")]
    Timeout(u64),

    #[error("search failed: {0}")]
    Failed(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        "AGG_TRANSPORT_FAILED"
    }
}
