//! Application error types

use thiserror::Error;
use echocheck_domain::DomainError;

/// Errors that abort a run before any scenario executes.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The harness configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
