//! Scenarios and the runner that executes them.

mod definition;
mod runner;

pub use definition::{Scenario, ScenarioContext};
pub use runner::{RunnerOptions, ScenarioRunner, run_scenario};
