//! HTTP executor port

use std::future::Future;

use echocheck_domain::{FailureKind, RequestSpec, ResponseRecord};
use thiserror::Error;

/// Failures surfaced by an [`HttpExecutor`].
///
/// None of these are retried; the runner records each as a failed scenario.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutorError {
    /// The connection could not be established or broke mid-flight.
    #[error("connection failed: {message}")]
    Transport {
        /// Transport-level description.
        message: String,
    },

    /// The host name did not resolve.
    #[error("DNS resolution failed for {host}: {message}")]
    Dns {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The per-request deadline passed.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The server answered with 400 or above while the request asked to fail
    /// on such statuses.
    #[error("{method} {url} returned status {status}")]
    HttpStatus {
        /// Status received.
        status: u16,
        /// Method of the failed request.
        method: String,
        /// Full URL of the failed request.
        url: String,
    },

    /// The request could not be encoded or handed to the transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ExecutorError {
    /// Reporting category of this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::Dns { .. } => FailureKind::Transport,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }
}

/// Port for sending a request and normalizing the response.
///
/// Implementations must measure `elapsed_ms` from dispatch to full body
/// receipt and apply [`enforce_status_policy`] before returning.
pub trait HttpExecutor: Send + Sync {
    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutorError`] on transport failure, timeout, or an
    /// error status when `fail_on_status_code` is set.
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseRecord, ExecutorError>> + Send;
}

/// Turns a status of 400 or above into [`ExecutorError::HttpStatus`] when the
/// request fails on status codes; otherwise returns the record untouched.
///
/// # Errors
///
/// Returns [`ExecutorError::HttpStatus`] as described.
pub fn enforce_status_policy(
    request: &RequestSpec,
    record: ResponseRecord,
) -> Result<ResponseRecord, ExecutorError> {
    if request.fail_on_status_code() && record.is_error_status() {
        return Err(ExecutorError::HttpStatus {
            status: record.status(),
            method: request.method().to_string(),
            url: request.full_url().to_string(),
        });
    }
    Ok(record)
}
