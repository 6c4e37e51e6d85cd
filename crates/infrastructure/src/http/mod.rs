//! HTTP request encoding helpers.

mod body_builder;

pub use body_builder::{BodyBuildError, EncodedBody, encode_body, is_json_content_type};
