//! Echocheck Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the application ports (reqwest executor,
//! system clock, `rand` value generator) plus configuration loading and
//! report output.

pub mod adapters;
pub mod config;
pub mod http;
pub mod report;
pub mod serialization;

pub use adapters::{RandomValueGenerator, ReqwestExecutor, SystemClock};
pub use config::{ConfigError, HarnessConfig};
pub use http::{BodyBuildError, EncodedBody, encode_body};
pub use report::{ReportError, write_report};
pub use serialization::{SerializationError, from_json, to_json_stable};
