//! Echocheck Domain - Core types
//!
//! Pure data types for describing HTTP contract checks: request specs,
//! normalized responses, structured values, assertions and outcomes.
//! Nothing here performs I/O.

pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod testing;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use headers::{Header, Headers};
pub use request::{HttpMethod, RequestSpec, RequestSpecBuilder};
pub use response::{ResponseBody, ResponseRecord};
pub use testing::{Assertion, AssertionResult, FailureKind, RunReport, ScenarioOutcome};
pub use value::{FieldPath, Number, PathSegment, StructuredValue};
