//! HTTP request body encoding.
//!
//! Turns the structured body of a [`RequestSpec`] into bytes on the wire,
//! honouring whatever `Content-Type` the author set.

use echocheck_domain::{RequestSpec, StructuredValue};
use mime::Mime;

/// Error type for body encoding.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// The body could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serializer message.
        message: String,
    },
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// Content type to add. `None` when the request already carries one,
    /// which is then sent verbatim.
    pub content_type: Option<String>,
    /// Bytes to send.
    pub bytes: Vec<u8>,
}

/// Encodes the body of `request`, if it has one.
///
/// - No content type set: JSON, with `application/json` added.
/// - A JSON content type in any case (`application/JSON`,
///   `application/problem+json`): JSON, header left as written.
/// - Any other content type: a string body is sent raw, anything else as
///   JSON text.
///
/// # Errors
///
/// Returns [`BodyBuildError::Serialization`] if JSON encoding fails.
pub fn encode_body(request: &RequestSpec) -> Result<Option<EncodedBody>, BodyBuildError> {
    let Some(body) = request.body() else {
        return Ok(None);
    };

    let encoded = match request.content_type() {
        None => EncodedBody {
            content_type: Some(mime::APPLICATION_JSON.to_string()),
            bytes: to_json(body)?,
        },
        Some(content_type) if is_json_content_type(content_type) => EncodedBody {
            content_type: None,
            bytes: to_json(body)?,
        },
        Some(_) => {
            let bytes = match body {
                StructuredValue::String(text) => text.clone().into_bytes(),
                other => to_json(other)?,
            };
            EncodedBody {
                content_type: None,
                bytes,
            }
        }
    };
    Ok(Some(encoded))
}

/// True for `*/json` and `*/*+json`, ignoring case and parameters.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.trim().parse::<Mime>().map_or_else(
        |_| content_type.to_ascii_lowercase().contains("json"),
        |mime| {
            mime.subtype().as_str().eq_ignore_ascii_case("json")
                || mime
                    .suffix()
                    .is_some_and(|suffix| suffix.as_str().eq_ignore_ascii_case("json"))
        },
    )
}

fn to_json(value: &StructuredValue) -> Result<Vec<u8>, BodyBuildError> {
    serde_json::to_vec(value).map_err(|e| BodyBuildError::Serialization {
        message: e.to_string(),
    })
}
