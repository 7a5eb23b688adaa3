//! Translator errors

use thiserror::Error;

/// Result type for clause translation
pub type TranslationResult<T> = Result<T, TranslationError>;

/// A SQL fragment that has no aggregation DSL equivalent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("invalid arguments to {function}: {reason}")]
    InvalidArguments { function: String, reason: String },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("invalid date_trunc interval: {0}")]
    InvalidInterval(String),
}

impl TranslationError {
    pub fn invalid_arguments(function: impl Into<String>, reason: impl Into<String>) -> Self {
        TranslationError::InvalidArguments {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        "AGG_TRANSLATION_FAILED"
    }
}
