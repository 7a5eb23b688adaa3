//! Response decoding errors

use thiserror::Error;

/// Result type for response parsing
pub type ResponseResult<T> = Result<T, ResponseError>;

/// Raised when a backend response does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response is missing hits.total")]
    MissingTotal,

    #[error("malformed aggregation response: {0}")]
    Malformed(String),
}

impl ResponseError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ResponseError::Malformed(reason.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        "AGG_RESPONSE_INVALID"
    }
}
