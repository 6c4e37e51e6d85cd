//! Request specification and its builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};
use crate::headers::Headers;
use crate::value::StructuredValue;

/// Immutable description of one HTTP call.
///
/// Built through [`RequestSpec::builder`], which validates the URL and
/// headers. Query parameters are kept sorted so two specs with the same
/// parameters compare equal regardless of insertion order. Deserialization
/// goes through the same builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequestSpecRecord")]
pub struct RequestSpec {
    method: HttpMethod,
    url: Url,
    #[serde(default)]
    query: BTreeMap<String, String>,
    #[serde(default)]
    headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<StructuredValue>,
    #[serde(default = "default_fail_on_status_code")]
    fail_on_status_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(skip)]
    encoded_query: String,
}

/// Wire form of [`RequestSpec`], validated by [`RequestSpecBuilder::build`].
#[derive(Deserialize)]
struct RequestSpecRecord {
    method: HttpMethod,
    url: String,
    #[serde(default)]
    query: BTreeMap<String, String>,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    body: Option<StructuredValue>,
    #[serde(default = "default_fail_on_status_code")]
    fail_on_status_code: bool,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

impl TryFrom<RequestSpecRecord> for RequestSpec {
    type Error = DomainError;

    fn try_from(record: RequestSpecRecord) -> DomainResult<Self> {
        let headers = record
            .headers
            .iter()
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect();
        RequestSpecBuilder {
            method: record.method,
            url: record.url,
            query: record.query,
            headers,
            body: record.body,
            fail_on_status_code: record.fail_on_status_code,
            timeout_ms: record.timeout_ms,
        }
        .build()
    }
}

const fn default_fail_on_status_code() -> bool {
    true
}

impl RequestSpec {
    /// Starts building a request.
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            method,
            url: url.into(),
            query: BTreeMap::new(),
            headers: Vec::new(),
            body: None,
            fail_on_status_code: true,
            timeout_ms: None,
        }
    }

    /// Shorthand for a GET builder.
    pub fn get(url: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Get, url)
    }

    /// Shorthand for a POST builder.
    pub fn post(url: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Post, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Base URL without the query parameters added by the builder.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Query parameters, sorted by name.
    #[must_use]
    pub const fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Request body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&StructuredValue> {
        self.body.as_ref()
    }

    /// Whether a status of 400 or above is treated as a failure.
    #[must_use]
    pub const fn fail_on_status_code(&self) -> bool {
        self.fail_on_status_code
    }

    /// Per-request deadline in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Content type explicitly set by the author.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// The URL with query parameters URL-encoded and appended to any query
    /// already present in the base URL.
    #[must_use]
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.encoded_query.is_empty() {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => {
                    format!("{existing}&{}", self.encoded_query)
                }
                _ => self.encoded_query.clone(),
            };
            url.set_query(Some(&query));
        }
        url
    }
}

/// Builder for [`RequestSpec`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RequestSpecBuilder {
    method: HttpMethod,
    url: String,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    body: Option<StructuredValue>,
    fail_on_status_code: bool,
    timeout_ms: Option<u64>,
}

impl RequestSpecBuilder {
    /// Adds a query parameter; the value is converted to its string form.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(name.into(), value.to_string());
        self
    }

    /// Adds several query parameters.
    pub fn queries<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in params {
            self.query.insert(name.into(), value.to_string());
        }
        self
    }

    /// Adds a header; later headers replace earlier ones of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a structured body.
    pub fn body(mut self, body: impl Into<StructuredValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Controls whether statuses of 400 and above fail the request.
    pub fn fail_on_status_code(mut self, fail: bool) -> Self {
        self.fail_on_status_code = fail;
        self
    }

    /// Sets a per-request deadline.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Validates and builds the spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL, a
    /// header is invalid, or the query cannot be encoded.
    pub fn build(self) -> DomainResult<RequestSpec> {
        let url = parse_http_url(&self.url)?;
        let encoded_query = serde_urlencoded::to_string(&self.query)
            .map_err(|e| DomainError::InvalidQuery(e.to_string()))?;

        let mut headers = Headers::new();
        for (name, value) in self.headers {
            headers.try_insert(name, value)?;
        }

        Ok(RequestSpec {
            method: self.method,
            url,
            query: self.query,
            headers,
            body: self.body,
            fail_on_status_code: self.fail_on_status_code,
            timeout_ms: self.timeout_ms,
            encoded_query,
        })
    }
}

/// Parses an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] for relative URLs, other schemes or
/// URLs without a host.
pub fn parse_http_url(raw: &str) -> DomainResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::InvalidUrl("URL is required".to_string()));
    }
    let url = Url::parse(raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::InvalidUrl(format!(
            "unsupported scheme '{}': {raw}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DomainError::InvalidUrl(format!("missing host: {raw}")));
    }
    Ok(url)
}
