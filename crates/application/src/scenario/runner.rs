//! Scenario runner.
//!
//! Runs each scenario in its own tokio task so a panicking builder or
//! assertion cannot take the rest of the run down. With a concurrency of one
//! the tasks run strictly one after another in input order; above one they
//! run in parallel behind a semaphore. In both modes this function is the
//! only writer of the outcome list, which it fills in scenario order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use echocheck_domain::{AssertionResult, FailureKind, RunReport, ScenarioOutcome};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::definition::{Scenario, ScenarioContext};
use crate::assertions::evaluate_all;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, ExecutorError, HttpExecutor};

/// Runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Maximum number of scenarios in flight. Must be at least one.
    pub concurrency: usize,
    /// Deadline applied to requests that set none.
    pub default_timeout_ms: Option<u64>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            default_timeout_ms: Some(30_000),
        }
    }
}

/// Orchestrates scenarios against an [`HttpExecutor`].
pub struct ScenarioRunner<E, C> {
    executor: Arc<E>,
    clock: C,
    context: ScenarioContext,
    options: RunnerOptions,
}

impl<E, C> ScenarioRunner<E, C>
where
    E: HttpExecutor + 'static,
    C: Clock,
{
    /// Creates a runner.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Configuration`] for a concurrency of zero.
    pub fn new(
        executor: Arc<E>,
        clock: C,
        context: ScenarioContext,
        options: RunnerOptions,
    ) -> ApplicationResult<Self> {
        if options.concurrency == 0 {
            return Err(ApplicationError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            executor,
            clock,
            context,
            options,
        })
    }

    /// Runs every scenario and returns the aggregate report.
    ///
    /// Never fails: executor errors, builder errors and panics are all
    /// recorded as failed outcomes of the scenario they belong to.
    pub async fn run(&self, scenarios: Vec<Scenario>) -> RunReport {
        let started_at = self.clock.now();
        let start = Instant::now();
        let total = scenarios.len();
        info!(total, concurrency = self.options.concurrency, "starting run");

        let outcomes = if self.options.concurrency == 1 {
            self.run_sequential(scenarios).await
        } else {
            self.run_concurrent(scenarios).await
        };

        let report = RunReport::new(started_at, elapsed_ms(start), outcomes);
        info!(
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            duration_ms = report.duration_ms(),
            "run finished"
        );
        report
    }

    async fn run_sequential(&self, scenarios: Vec<Scenario>) -> Vec<ScenarioOutcome> {
        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let name = scenario.name().to_string();
            let handle = self.spawn(scenario, None);
            outcomes.push(collect(name, handle).await);
        }
        outcomes
    }

    async fn run_concurrent(&self, scenarios: Vec<Scenario>) -> Vec<ScenarioOutcome> {
        let permits = Arc::new(Semaphore::new(self.options.concurrency));
        let handles: Vec<_> = scenarios
            .into_iter()
            .map(|scenario| {
                let name = scenario.name().to_string();
                (name, self.spawn(scenario, Some(Arc::clone(&permits))))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            outcomes.push(collect(name, handle).await);
        }
        outcomes
    }

    fn spawn(
        &self,
        scenario: Scenario,
        permits: Option<Arc<Semaphore>>,
    ) -> JoinHandle<ScenarioOutcome> {
        let executor = Arc::clone(&self.executor);
        let context = self.context.clone();
        let default_timeout_ms = self.options.default_timeout_ms;

        tokio::spawn(async move {
            // The semaphore is never closed, so acquiring only waits.
            let _permit = match permits {
                Some(permits) => permits.acquire_owned().await.ok(),
                None => None,
            };
            run_scenario(&scenario, &context, executor.as_ref(), default_timeout_ms).await
        })
    }
}

async fn collect(name: String, handle: JoinHandle<ScenarioOutcome>) -> ScenarioOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => aborted(name, &e),
    }
}

fn aborted(name: String, error: &JoinError) -> ScenarioOutcome {
    let reason = if error.is_panic() {
        "scenario panicked"
    } else {
        "scenario task was cancelled"
    };
    warn!(scenario = %name, reason, "scenario aborted");
    ScenarioOutcome::new(
        name,
        vec![AssertionResult::failure(
            FailureKind::Aborted,
            "scenario completed",
            reason,
        )],
        0,
    )
}

/// Runs one scenario to completion: build, execute, assert.
pub async fn run_scenario<E: HttpExecutor>(
    scenario: &Scenario,
    context: &ScenarioContext,
    executor: &E,
    default_timeout_ms: Option<u64>,
) -> ScenarioOutcome {
    let start = Instant::now();
    let name = scenario.name();

    let request = match scenario.build_request(context) {
        Ok(request) => request,
        Err(e) => {
            warn!(scenario = name, error = %e, "request could not be built");
            let result =
                AssertionResult::failure(FailureKind::InvalidRequest, "request built", e.to_string());
            return finish(name, vec![result], start);
        }
    };

    debug!(
        scenario = name,
        method = %request.method(),
        url = %request.full_url(),
        "dispatching request"
    );

    let timeout_ms = request.timeout_ms().or(default_timeout_ms);
    let response = match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), executor.execute(&request))
            .await
            .unwrap_or(Err(ExecutorError::Timeout { timeout_ms: ms })),
        None => executor.execute(&request).await,
    };

    let results = match response {
        Ok(record) => {
            debug!(
                scenario = name,
                status = record.status(),
                elapsed_ms = record.elapsed_ms(),
                "response received"
            );
            evaluate_all(&scenario.build_assertions(&request), &record)
        }
        Err(e) => {
            warn!(scenario = name, kind = e.kind().label(), error = %e, "request failed");
            vec![AssertionResult::failure(
                e.kind(),
                format!("{} {}", request.method(), request.full_url()),
                format!("{}: {e}", e.kind().label()),
            )]
        }
    };

    finish(name, results, start)
}

fn finish(name: &str, results: Vec<AssertionResult>, start: Instant) -> ScenarioOutcome {
    let outcome = ScenarioOutcome::new(name, results, elapsed_ms(start));
    info!(
        scenario = name,
        passed = outcome.overall_passed(),
        elapsed_ms = outcome.elapsed_ms(),
        "scenario finished"
    );
    outcome
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
