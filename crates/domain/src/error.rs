//! Domain error types

use thiserror::Error;

/// Errors raised while constructing or validating domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The URL is malformed, relative, or uses an unsupported scheme.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name is empty or contains non-token characters.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value contains a line break.
    #[error("invalid header value for {name}: {reason}")]
    InvalidHeaderValue {
        /// Header the value was supplied for.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Query parameters could not be URL-encoded.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The HTTP method is not one of the supported verbs.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A field path could not be parsed.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
