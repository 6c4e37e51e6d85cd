//! HTTP executor implementation using reqwest.
//!
//! This adapter implements the `HttpExecutor` port. It encodes the request,
//! times it from dispatch until the whole body has arrived, and applies the
//! shared status policy before handing the record back.

use std::error::Error as _;
use std::future::Future;
use std::time::{Duration, Instant};

use echocheck_application::ports::{ExecutorError, HttpExecutor, enforce_status_policy};
use echocheck_domain::{Headers, HttpMethod, RequestSpec, ResponseRecord};
use reqwest::{Client, Method, Url};
use tracing::trace;

use crate::http::encode_body;

const USER_AGENT: &str = concat!("echocheck/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// HTTP executor backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    default_timeout_ms: Option<u64>,
}

impl ReqwestExecutor {
    /// Creates an executor with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: `echocheck/<version>`, overridable per request
    /// - No deadline unless the request sets one
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, ExecutorError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ExecutorError::Transport {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            default_timeout_ms: None,
        })
    }

    /// Deadline for requests that do not set their own.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn build(&self, request: &RequestSpec) -> Result<reqwest::RequestBuilder, ExecutorError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), request.full_url());

        if let Some(timeout_ms) = request.timeout_ms().or(self.default_timeout_ms) {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        for header in request.headers().iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        if let Some(body) =
            encode_body(request).map_err(|e| ExecutorError::InvalidRequest(e.to_string()))?
        {
            if let Some(content_type) = body.content_type {
                builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
            }
            builder = builder.body(body.bytes);
        }

        Ok(builder)
    }

    /// Maps reqwest errors to `ExecutorError`.
    fn map_error(error: &reqwest::Error, timeout_ms: Option<u64>, url: &Url) -> ExecutorError {
        if error.is_timeout() {
            return ExecutorError::Timeout {
                timeout_ms: timeout_ms.unwrap_or_default(),
            };
        }

        if error.is_builder() {
            return ExecutorError::InvalidRequest(error.to_string());
        }

        let message = error_chain(error);
        if error.is_connect() {
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return ExecutorError::Dns {
                    host: url.host_str().unwrap_or("unknown").to_string(),
                    message,
                };
            }
        }
        ExecutorError::Transport { message }
    }
}

/// Joins an error with its sources; reqwest keeps the useful part
/// ("connection refused", "dns error") in the source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseRecord, ExecutorError>> + Send {
        let request = request.clone();

        async move {
            let url = request.full_url();
            let timeout_ms = request.timeout_ms().or(self.default_timeout_ms);
            let builder = self.build(&request)?;

            let start = Instant::now();
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms, &url))?;

            let status = response.status().as_u16();
            let headers: Headers = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str(),
                        String::from_utf8_lossy(v.as_bytes()).into_owned(),
                    )
                })
                .collect();

            let body = if request.method().expects_response_body() {
                response
                    .bytes()
                    .await
                    .map_err(|e| Self::map_error(&e, timeout_ms, &url))?
                    .to_vec()
            } else {
                Vec::new()
            };
            let elapsed = start.elapsed();

            trace!(status, bytes = body.len(), ?elapsed, url = %url, "response read");
            enforce_status_policy(&request, ResponseRecord::new(status, headers, body, elapsed))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestExecutor::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestExecutor::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
        assert_eq!(
            ReqwestExecutor::to_reqwest_method(HttpMethod::Head),
            Method::HEAD
        );
    }

    #[test]
    fn test_executor_creation() {
        assert!(ReqwestExecutor::new().is_ok());
    }

    #[test]
    fn builds_query_headers_and_json_body() {
        let executor = ReqwestExecutor::new().unwrap();
        let spec = RequestSpec::post("https://httpbin.org/post")
            .query("name", "Ania Kowalska")
            .header("User-Agent", "MyTestAgent/1.0")
            .body(echocheck_domain::StructuredValue::mapping([("job", "tester")]))
            .timeout_ms(500)
            .build()
            .unwrap();

        let built = executor.build(&spec).unwrap().build().unwrap();

        assert_eq!(built.method(), Method::POST);
        assert_eq!(
            built.url().as_str(),
            "https://httpbin.org/post?name=Ania+Kowalska"
        );
        assert_eq!(built.headers()["user-agent"], "MyTestAgent/1.0");
        assert_eq!(built.headers()["content-type"], "application/json");
        assert_eq!(built.timeout(), Some(&Duration::from_millis(500)));
        assert_eq!(
            built.body().and_then(reqwest::Body::as_bytes),
            Some(br#"{"job":"tester"}"#.as_slice())
        );
    }

    #[test]
    fn author_content_type_is_kept_verbatim() {
        let executor = ReqwestExecutor::new().unwrap();
        let spec = RequestSpec::builder(HttpMethod::Delete, "https://httpbin.org/delete")
            .header("Content-Type", "application/JSON")
            .body(echocheck_domain::StructuredValue::mapping([("id", "123")]))
            .build()
            .unwrap();

        let built = executor.build(&spec).unwrap().build().unwrap();
        let content_types: Vec<_> = built.headers().get_all("content-type").iter().collect();
        assert_eq!(content_types, vec!["application/JSON"]);
    }
}
