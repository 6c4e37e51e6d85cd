//! echocheck - HTTP contract-verification harness
//!
//! Wires the reqwest executor, clock and value generator into the scenario
//! runner and runs a suite against a configured echo service.

pub mod suite;

use std::sync::Arc;

use echocheck_application::{
    ApplicationError, ExecutorError, RunnerOptions, Scenario, ScenarioContext, ScenarioRunner,
};
use echocheck_domain::{FailureKind, RunReport};
use echocheck_infrastructure::{
    ConfigError, HarnessConfig, RandomValueGenerator, ReportError, ReqwestExecutor, SystemClock,
    write_report,
};
use thiserror::Error;
use tracing::{info, warn};

pub use suite::httpbin_scenarios;

/// Errors that stop a run before or after the scenarios execute.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// The runner rejected its setup.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Runs `scenarios` with `config`, logs the results and writes the report
/// when a path is configured.
///
/// # Errors
///
/// Returns a [`HarnessError`] for setup failures or an unwritable report.
/// Failing scenarios are not errors; inspect the returned report.
pub async fn run_suite(
    config: &HarnessConfig,
    scenarios: Vec<Scenario>,
) -> Result<RunReport, HarnessError> {
    config.validate()?;

    let executor =
        Arc::new(ReqwestExecutor::new()?.with_default_timeout(config.default_timeout_ms));
    let generator = Arc::new(RandomValueGenerator::new(config.seed));
    let context = ScenarioContext::new(&config.base_url, generator)?;
    let runner = ScenarioRunner::new(
        executor,
        SystemClock::new(),
        context,
        RunnerOptions {
            concurrency: config.concurrency,
            default_timeout_ms: config.default_timeout_ms,
        },
    )?;

    let report = runner.run(scenarios).await;
    log_report(&report);

    if let Some(path) = &config.report_path {
        write_report(path, &report).await?;
    }
    Ok(report)
}

/// Logs one line per scenario, one per failed check, and the summary.
pub fn log_report(report: &RunReport) {
    for outcome in report.outcomes() {
        if outcome.overall_passed() {
            info!(
                scenario = outcome.name(),
                elapsed_ms = outcome.elapsed_ms(),
                "PASS"
            );
            continue;
        }
        warn!(
            scenario = outcome.name(),
            elapsed_ms = outcome.elapsed_ms(),
            "FAIL"
        );
        for failure in outcome.failures() {
            warn!(
                scenario = outcome.name(),
                kind = failure.failure_kind().map(FailureKind::label),
                check = failure.description(),
                details = failure.details().unwrap_or_default(),
                "check failed"
            );
        }
    }
    info!(
        run_id = %report.run_id(),
        total = report.total(),
        passed = report.passed(),
        failed = report.failed(),
        duration_ms = report.duration_ms(),
        "summary"
    );
}
