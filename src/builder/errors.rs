//! Tree builder errors

use thiserror::Error;

/// Result type for tree building
pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("program has no statements")]
    EmptyProgram,

    #[error("alias declared twice: {0}")]
    DuplicateAlias(String),

    #[error("only one physical source is allowed, found '{first}' and '{second}'")]
    MultipleSources { first: String, second: String },

    #[error("alias '{0}' is used before it is declared")]
    ForwardReference(String),
}

impl BuildError {
    pub fn code(&self) -> &'static str {
        "AGG_BUILD_FAILED"
    }
}
