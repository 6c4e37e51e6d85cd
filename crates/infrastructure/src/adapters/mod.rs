//! Adapters implementing the application ports.

mod random_generator;
mod reqwest_executor;
mod system_clock;

pub use random_generator::RandomValueGenerator;
pub use reqwest_executor::ReqwestExecutor;
pub use system_clock::SystemClock;
