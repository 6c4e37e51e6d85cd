//! Normalized HTTP response record.
//!
//! A `ResponseRecord` is produced exactly once per executed request and has
//! no mutators: assertions only ever read it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::headers::Headers;
use crate::value::StructuredValue;

/// Response body: raw bytes plus the parsed structure when the bytes were
/// valid JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    raw: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parsed: Option<StructuredValue>,
}

impl ResponseBody {
    /// Wraps raw bytes, parsing them as JSON when possible.
    #[must_use]
    pub fn new(raw: Vec<u8>) -> Self {
        let parsed = if raw.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<serde_json::Value>(&raw)
                .ok()
                .map(StructuredValue::from)
        };
        Self { raw, parsed }
    }

    /// Parsed structure, if the body was JSON.
    #[must_use]
    pub const fn parsed(&self) -> Option<&StructuredValue> {
        self.parsed.as_ref()
    }

    /// Body as lossy UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }

    /// Length in bytes.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True for an empty body.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Normalized response of one executed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    status: u16,
    headers: Headers,
    body: ResponseBody,
    elapsed_ms: u64,
}

impl ResponseRecord {
    /// Creates a record from wire data and the measured wall-clock time.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: Vec<u8>, elapsed: Duration) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::new(body),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// True for 4xx and 5xx statuses.
    #[must_use]
    pub const fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Wall-clock milliseconds from dispatch to full body receipt.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_bodies_are_parsed() {
        let record = ResponseRecord::new(
            200,
            Headers::new(),
            br#"{"args": {"name": "Ania"}}"#.to_vec(),
            Duration::from_millis(12),
        );
        assert_eq!(
            record.body().parsed(),
            Some(&StructuredValue::mapping([(
                "args",
                StructuredValue::mapping([("name", "Ania")])
            )]))
        );
        assert_eq!(record.elapsed_ms(), 12);
    }

    #[test]
    fn non_json_bodies_keep_raw_bytes_only() {
        let body = ResponseBody::new(b"<html></html>".to_vec());
        assert_eq!(body.parsed(), None);
        assert_eq!(body.text(), "<html></html>");

        let empty = ResponseBody::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.parsed(), None);
    }

    #[test]
    fn error_status_starts_at_400() {
        let make = |status| ResponseRecord::new(status, Headers::new(), Vec::new(), Duration::ZERO);
        assert!(!make(399).is_error_status());
        assert!(make(400).is_error_status());
        assert!(make(503).is_error_status());
    }
}
