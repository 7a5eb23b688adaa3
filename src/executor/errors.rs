//! Executor error types
//!
//! Error codes:
//! - AGG_COMPILATION_FAILED
//! - AGG_TRANSLATION_FAILED
//! - AGG_TRANSPORT_FAILED
//! - AGG_RESPONSE_INVALID

use std::fmt;

use thiserror::Error;

use crate::backend::TransportError;
use crate::response::ResponseError;
use crate::translator::TranslationError;

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// The tree cannot be turned into a request
    AggCompilationFailed,
    /// A clause translator rejected a fragment
    AggTranslationFailed,
    /// Backend dispatch failed
    AggTransportFailed,
    /// The backend response cannot be decoded
    AggResponseInvalid,
}

impl ExecutorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::AggCompilationFailed => "AGG_COMPILATION_FAILED",
            ExecutorErrorCode::AggTranslationFailed => "AGG_TRANSLATION_FAILED",
            ExecutorErrorCode::AggTransportFailed => "AGG_TRANSPORT_FAILED",
            ExecutorErrorCode::AggResponseInvalid => "AGG_RESPONSE_INVALID",
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while compiling, dispatching or decoding a tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Compilation(String),

    #[error("executor tree has not been compiled")]
    NotCompiled,

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl ExecutorError {
    pub fn compilation(reason: impl Into<String>) -> Self {
        ExecutorError::Compilation(reason.into())
    }

    pub fn code(&self) -> ExecutorErrorCode {
        match self {
            ExecutorError::Compilation(_) | ExecutorError::NotCompiled => {
                ExecutorErrorCode::AggCompilationFailed
            }
            ExecutorError::Translation(_) => ExecutorErrorCode::AggTranslationFailed,
            ExecutorError::Transport(_) => ExecutorErrorCode::AggTransportFailed,
            ExecutorError::Response(_) => ExecutorErrorCode::AggResponseInvalid,
        }
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
