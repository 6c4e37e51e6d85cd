//! Assertions, their results, and scenario outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::StructuredValue;

/// A declarative check applied to a response record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Status code equals the expected value.
    StatusEquals {
        /// Expected status.
        expected: u16,
    },
    /// Header exists (case-insensitive) and has exactly this value.
    HeaderEquals {
        /// Header name.
        name: String,
        /// Expected value.
        expected: String,
    },
    /// Header exists, whatever its value.
    HeaderPresent {
        /// Header name.
        name: String,
    },
    /// Header exists and its value matches a regex.
    HeaderMatches {
        /// Header name.
        name: String,
        /// Regex pattern.
        pattern: String,
    },
    /// Parsed body deep-equals the expected structure.
    BodyDeepEquals {
        /// Expected body.
        expected: StructuredValue,
    },
    /// Field at `path` in the parsed body deep-equals the expected structure.
    BodyFieldDeepEquals {
        /// Field path, e.g. `args` or `headers.User-Agent`.
        path: String,
        /// Expected value.
        expected: StructuredValue,
    },
    /// Elapsed time strictly greater than `ms`.
    DurationGreaterThan {
        /// Lower bound in milliseconds (exclusive).
        ms: u64,
    },
    /// Elapsed time strictly less than `ms`.
    DurationLessThan {
        /// Upper bound in milliseconds (exclusive).
        ms: u64,
    },
}

impl Assertion {
    /// Status equals.
    #[must_use]
    pub const fn status(expected: u16) -> Self {
        Self::StatusEquals { expected }
    }

    /// Header equals.
    #[must_use]
    pub fn header_equals(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::HeaderEquals {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Header present.
    #[must_use]
    pub fn header_present(name: impl Into<String>) -> Self {
        Self::HeaderPresent { name: name.into() }
    }

    /// Header matches pattern.
    #[must_use]
    pub fn header_matches(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::HeaderMatches {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Body deep-equals.
    #[must_use]
    pub fn body(expected: impl Into<StructuredValue>) -> Self {
        Self::BodyDeepEquals {
            expected: expected.into(),
        }
    }

    /// Body field deep-equals.
    #[must_use]
    pub fn body_field(path: impl Into<String>, expected: impl Into<StructuredValue>) -> Self {
        Self::BodyFieldDeepEquals {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Human-readable description used as the result label.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { expected } => format!("status == {expected}"),
            Self::HeaderEquals { name, expected } => format!("header '{name}' == '{expected}'"),
            Self::HeaderPresent { name } => format!("header '{name}' present"),
            Self::HeaderMatches { name, pattern } => format!("header '{name}' matches /{pattern}/"),
            Self::BodyDeepEquals { .. } => "body deep-equals expected".to_string(),
            Self::BodyFieldDeepEquals { path, expected } => {
                format!("body.{path} deep-equals {expected}")
            }
            Self::DurationGreaterThan { ms } => format!("elapsed > {ms}ms"),
            Self::DurationLessThan { ms } => format!("elapsed < {ms}ms"),
        }
    }
}

/// Why a result failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection or DNS failure.
    Transport,
    /// Per-request deadline exceeded.
    Timeout,
    /// Status of 400 or above while `fail_on_status_code` was set.
    HttpStatus,
    /// The request could not be built or encoded.
    InvalidRequest,
    /// An expectation did not hold.
    Assertion,
    /// The scenario task panicked or was cancelled before finishing.
    Aborted,
}

impl FailureKind {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "TransportError",
            Self::Timeout => "TimeoutError",
            Self::HttpStatus => "HttpStatusError",
            Self::InvalidRequest => "InvalidRequest",
            Self::Assertion => "AssertionFailure",
            Self::Aborted => "ScenarioAborted",
        }
    }
}

/// Result of one check. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResult {
    description: String,
    passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_kind: Option<FailureKind>,
}

impl AssertionResult {
    /// A passed check.
    #[must_use]
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: true,
            details: None,
            failure_kind: None,
        }
    }

    /// A failed expectation.
    #[must_use]
    pub fn fail(description: impl Into<String>, details: impl Into<String>) -> Self {
        Self::failure(FailureKind::Assertion, description, details)
    }

    /// A failure of the given kind.
    #[must_use]
    pub fn failure(
        kind: FailureKind,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            passed: false,
            details: Some(details.into()),
            failure_kind: Some(kind),
        }
    }

    /// What was checked.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the check held.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Expected-vs-actual explanation for failures.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Failure category, `None` when passed.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }
}

/// Outcome of one scenario.
///
/// `overall_passed` is derived from the results at construction, so it is
/// true exactly when every result passed. Deserialization recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScenarioOutcomeRecord")]
pub struct ScenarioOutcome {
    name: String,
    results: Vec<AssertionResult>,
    overall_passed: bool,
    elapsed_ms: u64,
}

impl ScenarioOutcome {
    /// Creates an outcome from ordered results.
    #[must_use]
    pub fn new(name: impl Into<String>, results: Vec<AssertionResult>, elapsed_ms: u64) -> Self {
        let overall_passed = results.iter().all(AssertionResult::passed);
        Self {
            name: name.into(),
            results,
            overall_passed,
            elapsed_ms,
        }
    }

    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Results in evaluation order.
    #[must_use]
    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    /// AND over all results.
    #[must_use]
    pub const fn overall_passed(&self) -> bool {
        self.overall_passed
    }

    /// Wall-clock time spent on the whole scenario.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Aggregate report of one run. Counts are always derived from the
/// outcomes, including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RunReportRecord")]
pub struct RunReport {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    total: usize,
    passed: usize,
    failed: usize,
    outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    /// Builds the report; counts are derived from the outcomes.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, duration_ms: u64, outcomes: Vec<ScenarioOutcome>) -> Self {
        Self::with_id(Uuid::now_v7(), started_at, duration_ms, outcomes)
    }

    fn with_id(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        outcomes: Vec<ScenarioOutcome>,
    ) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.overall_passed).count();
        Self {
            run_id,
            started_at,
            duration_ms,
            total,
            passed,
            failed: total - passed,
            outcomes,
        }
    }

    /// Unique run identifier.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Total wall-clock duration.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Number of scenarios.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of passed scenarios.
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Number of failed scenarios.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Outcomes in scenario order.
    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// True when every scenario passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Wire form of [`ScenarioOutcome`]; `overall_passed` is ignored on input.
#[derive(Deserialize)]
struct ScenarioOutcomeRecord {
    name: String,
    results: Vec<AssertionResult>,
    elapsed_ms: u64,
}

impl From<ScenarioOutcomeRecord> for ScenarioOutcome {
    fn from(record: ScenarioOutcomeRecord) -> Self {
        Self::new(record.name, record.results, record.elapsed_ms)
    }
}

/// Wire form of [`RunReport`]; the counts are ignored on input.
#[derive(Deserialize)]
struct RunReportRecord {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    outcomes: Vec<ScenarioOutcome>,
}

impl From<RunReportRecord> for RunReport {
    fn from(record: RunReportRecord) -> Self {
        Self::with_id(
            record.run_id,
            record.started_at,
            record.duration_ms,
            record.outcomes,
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overall_passed_is_and_of_results() {
        let ok = ScenarioOutcome::new(
            "ok",
            vec![AssertionResult::pass("a"), AssertionResult::pass("b")],
            5,
        );
        assert!(ok.overall_passed());

        let mixed = ScenarioOutcome::new(
            "mixed",
            vec![
                AssertionResult::fail("a", "expected 200, got 500"),
                AssertionResult::pass("b"),
            ],
            5,
        );
        assert!(!mixed.overall_passed());
        assert_eq!(mixed.results().len(), 2);
        assert_eq!(mixed.failures().count(), 1);
    }

    #[test]
    fn failures_carry_kind() {
        let result = AssertionResult::failure(FailureKind::Timeout, "request", "after 50ms");
        assert!(!result.passed());
        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(result.details(), Some("after 50ms"));
        assert_eq!(AssertionResult::pass("x").failure_kind(), None);
    }

    #[test]
    fn report_counts_follow_outcomes() {
        let outcomes = vec![
            ScenarioOutcome::new("a", vec![AssertionResult::pass("x")], 1),
            ScenarioOutcome::new("b", vec![AssertionResult::fail("x", "y")], 1),
            ScenarioOutcome::new("c", vec![AssertionResult::pass("x")], 1),
        ];
        let report = RunReport::new(Utc::now(), 3, outcomes);

        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.outcomes()[1].name(), "b");
    }

    #[test]
    fn descriptions_name_the_check() {
        assert_eq!(Assertion::status(200).description(), "status == 200");
        assert_eq!(
            Assertion::body_field("args.name", "User7").description(),
            r#"body.args.name deep-equals "User7""#
        );
        assert_eq!(
            Assertion::DurationGreaterThan { ms: 1000 }.description(),
            "elapsed > 1000ms"
        );
    }

    #[test]
    fn assertions_deserialize_from_tagged_json() {
        let assertion: Assertion =
            serde_json::from_str(r#"{"type": "header_present", "name": "content-type"}"#)
                .expect("valid assertion");
        assert_eq!(assertion, Assertion::header_present("content-type"));
    }

    #[test]
    fn deserialized_outcome_recomputes_overall_passed() {
        let outcome: ScenarioOutcome = serde_json::from_str(
            r#"{
                "name": "tampered",
                "results": [{"description": "status == 200", "passed": false, "details": "expected status 200, got 500", "failure_kind": "assertion"}],
                "overall_passed": true,
                "elapsed_ms": 4
            }"#,
        )
        .expect("valid outcome");

        assert!(!outcome.overall_passed());
        assert_eq!(outcome.failures().count(), 1);
    }

    #[test]
    fn deserialized_report_recomputes_counts() {
        let report: RunReport = serde_json::from_str(
            r#"{
                "run_id": "01890a5d-ac96-774b-bcce-b302099a8057",
                "started_at": "2026-01-01T00:00:00Z",
                "duration_ms": 10,
                "total": 7,
                "passed": 7,
                "failed": 0,
                "outcomes": [
                    {"name": "a", "results": [{"description": "x", "passed": true}], "overall_passed": true, "elapsed_ms": 1},
                    {"name": "b", "results": [{"description": "x", "passed": false, "details": "y", "failure_kind": "assertion"}], "overall_passed": true, "elapsed_ms": 1}
                ]
            }"#,
        )
        .expect("valid report");

        assert_eq!(report.total(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
        assert_eq!(
            report.run_id().to_string(),
            "01890a5d-ac96-774b-bcce-b302099a8057"
        );
    }
}
