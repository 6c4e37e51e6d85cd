//! Echocheck Application - Ports and orchestration
//!
//! Defines the ports the harness depends on (HTTP execution, clock, value
//! generation), the pure assertion evaluators, and the scenario runner.

pub mod assertions;
pub mod error;
pub mod ports;
pub mod scenario;

pub use assertions::{evaluate, evaluate_all};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    Clock, ExecutorError, FixedValueGenerator, HttpExecutor, ValueGenerator, enforce_status_policy,
};
pub use scenario::{RunnerOptions, Scenario, ScenarioContext, ScenarioRunner, run_scenario};
