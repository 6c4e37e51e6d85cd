//! End-to-end runs of the default suite against the echo fixture.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use std::sync::Arc;

use echocheck::{HarnessError, httpbin_scenarios, run_suite};
use echocheck_application::{
    FixedValueGenerator, RunnerOptions, Scenario, ScenarioContext, ScenarioRunner,
};
use echocheck_domain::{Assertion, FailureKind, RequestSpec, RunReport};
use echocheck_infrastructure::{
    ConfigError, HarnessConfig, ReqwestExecutor, SystemClock, from_json,
};
use pretty_assertions::assert_eq;
use support::{EchoServer, closed_port_url};

fn config(server: &EchoServer, concurrency: usize) -> HarnessConfig {
    HarnessConfig {
        base_url: server.base_url(),
        concurrency,
        default_timeout_ms: Some(10_000),
        seed: Some(7),
        report_path: None,
    }
}

async fn run_fixed(base_url: &str, scenarios: Vec<Scenario>) -> RunReport {
    let context =
        ScenarioContext::new(base_url, Arc::new(FixedValueGenerator::new(512))).unwrap();
    let runner = ScenarioRunner::new(
        Arc::new(ReqwestExecutor::new().unwrap()),
        SystemClock::new(),
        context,
        RunnerOptions {
            concurrency: 1,
            default_timeout_ms: Some(10_000),
        },
    )
    .unwrap();
    runner.run(scenarios).await
}

fn describe_failures(report: &RunReport) -> Vec<String> {
    report
        .outcomes()
        .iter()
        .flat_map(|o| {
            o.failures().map(move |f| {
                format!("{}: {} ({})", o.name(), f.description(), f.details().unwrap_or(""))
            })
        })
        .collect()
}

#[tokio::test]
async fn default_suite_passes_sequentially() {
    let server = EchoServer::start().await;

    let report = run_suite(&config(&server, 1), httpbin_scenarios()).await.unwrap();

    assert_eq!(describe_failures(&report), Vec::<String>::new());
    assert_eq!(report.total(), 10);
    assert_eq!(report.passed(), 10);
    assert!(report.duration_ms() >= 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn default_suite_passes_concurrently_in_order() {
    let server = EchoServer::start().await;

    let report = run_suite(&config(&server, 4), httpbin_scenarios()).await.unwrap();

    assert_eq!(describe_failures(&report), Vec::<String>::new());
    let names: Vec<_> = report.outcomes().iter().map(|o| o.name().to_string()).collect();
    let expected: Vec<_> = httpbin_scenarios()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn transport_failure_leaves_other_scenarios_unchanged() {
    let server = EchoServer::start().await;
    let unreachable = closed_port_url().await;

    let baseline = run_fixed(&server.base_url(), httpbin_scenarios()).await;

    let mut scenarios = httpbin_scenarios();
    scenarios.insert(
        3,
        Scenario::new(
            "unreachable host",
            move |_: &ScenarioContext| RequestSpec::get(unreachable.clone()).build(),
            |_: &RequestSpec| vec![Assertion::status(200)],
        ),
    );
    let with_failure = run_fixed(&server.base_url(), scenarios).await;

    assert_eq!(with_failure.total(), 11);
    assert_eq!(with_failure.failed(), 1);
    let broken = &with_failure.outcomes()[3];
    assert_eq!(broken.results().len(), 1);
    assert_eq!(broken.results()[0].failure_kind(), Some(FailureKind::Transport));

    let others: Vec<_> = with_failure
        .outcomes()
        .iter()
        .filter(|o| o.name() != "unreachable host")
        .map(|o| o.results().to_vec())
        .collect();
    let expected: Vec<_> = baseline.outcomes().iter().map(|o| o.results().to_vec()).collect();
    assert_eq!(others, expected);
}

#[tokio::test]
async fn fixed_inputs_give_identical_results() {
    let server = EchoServer::start().await;

    let first = run_fixed(&server.base_url(), httpbin_scenarios()).await;
    let second = run_fixed(&server.base_url(), httpbin_scenarios()).await;

    let results = |report: &RunReport| -> Vec<_> {
        report.outcomes().iter().map(|o| o.results().to_vec()).collect()
    };
    assert_eq!(results(&first), results(&second));
}

#[tokio::test]
async fn report_is_written_when_configured() {
    let server = EchoServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("echocheck.json");
    let mut config = config(&server, 2);
    config.report_path = Some(path.clone());

    let report = run_suite(&config, httpbin_scenarios()).await.unwrap();

    let written: RunReport = from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, report);
}

#[tokio::test]
async fn malformed_base_url_aborts_before_running() {
    let config = HarnessConfig {
        base_url: "not a url".to_string(),
        ..HarnessConfig::default()
    };

    let err = run_suite(&config, httpbin_scenarios()).await.unwrap_err();

    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::InvalidBaseUrl { .. })
    ));
}
