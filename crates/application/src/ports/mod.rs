//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and the outside
//! world. Adapters in the infrastructure layer implement them.

mod clock;
mod http_executor;
mod value_generator;

pub use clock::Clock;
pub use http_executor::{ExecutorError, HttpExecutor, enforce_status_policy};
pub use value_generator::{FixedValueGenerator, ValueGenerator};
