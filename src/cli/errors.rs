//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::executor::ExecutorError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout, JSON)
    IoError,
    /// The program cannot be built, compiled or executed
    QueryFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AGG_CLI_CONFIG_ERROR",
            Self::IoError => "AGG_CLI_IO_ERROR",
            Self::QueryFailed => "AGG_CLI_QUERY_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Query error; the message leads with the engine's own code
    pub fn query_failed(code: &str, msg: impl fmt::Display) -> Self {
        Self::new(CliErrorCode::QueryFailed, format!("{}: {}", code, msg))
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        Self::query_failed(e.code(), &e)
    }
}

impl From<ExecutorError> for CliError {
    fn from(e: ExecutorError) -> Self {
        Self::query_failed(e.code().code(), &e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TransportError;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::io_error("Empty input");
        assert_eq!(err.to_string(), "AGG_CLI_IO_ERROR: Empty input");
    }

    #[test]
    fn test_executor_error_keeps_inner_code() {
        let err: CliError = ExecutorError::Transport(TransportError::Timeout(100)).into();
        assert_eq!(err.code(), &CliErrorCode::QueryFailed);
        assert!(err.message().starts_with("AGG_TRANSPORT_FAILED: "));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CliError = ConfigError::Invalid("default_terms_size must be > 0".into()).into();
        assert_eq!(err.code_str(), "AGG_CLI_CONFIG_ERROR");
    }
}
