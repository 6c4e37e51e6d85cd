//! Request types: methods and request specifications.

mod method;
mod spec;

pub use method::HttpMethod;
pub use spec::{RequestSpec, RequestSpecBuilder, parse_http_url};
