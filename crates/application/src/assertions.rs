//! Response assertions.
//!
//! Every check is a pure function of a [`ResponseRecord`] and the expected
//! values. A mismatch never panics or errors: it comes back as a failed
//! [`AssertionResult`] whose details spell out expected versus actual.

use echocheck_domain::{Assertion, AssertionResult, FieldPath, ResponseRecord, StructuredValue};
use regex::Regex;

const PREVIEW_LEN: usize = 100;

/// Evaluates every assertion in order. Nothing short-circuits: a failure
/// never hides the results of later checks.
#[must_use]
pub fn evaluate_all(assertions: &[Assertion], record: &ResponseRecord) -> Vec<AssertionResult> {
    assertions.iter().map(|a| evaluate(a, record)).collect()
}

/// Evaluates one declarative assertion.
#[must_use]
pub fn evaluate(assertion: &Assertion, record: &ResponseRecord) -> AssertionResult {
    match assertion {
        Assertion::StatusEquals { expected } => status_equals(record, *expected),
        Assertion::HeaderEquals { name, expected } => header_equals(record, name, expected),
        Assertion::HeaderPresent { name } => header_present(record, name),
        Assertion::HeaderMatches { name, pattern } => header_matches(record, name, pattern),
        Assertion::BodyDeepEquals { expected } => body_deep_equals(record, expected),
        Assertion::BodyFieldDeepEquals { path, expected } => {
            body_field_deep_equals(record, path, expected)
        }
        Assertion::DurationGreaterThan { ms } => duration_greater_than(record, *ms),
        Assertion::DurationLessThan { ms } => duration_less_than(record, *ms),
    }
}

/// Passes iff the status equals `expected`.
#[must_use]
pub fn status_equals(record: &ResponseRecord, expected: u16) -> AssertionResult {
    let description = Assertion::status(expected).description();
    let actual = record.status();
    if actual == expected {
        AssertionResult::pass(description)
    } else {
        AssertionResult::fail(description, format!("expected status {expected}, got {actual}"))
    }
}

/// Passes iff the header exists (any casing) with exactly `expected`.
#[must_use]
pub fn header_equals(record: &ResponseRecord, name: &str, expected: &str) -> AssertionResult {
    let description = Assertion::header_equals(name, expected).description();
    match record.header(name) {
        Some(actual) if actual == expected => AssertionResult::pass(description),
        Some(actual) => AssertionResult::fail(
            description,
            format!("header '{name}': expected '{expected}', got '{actual}'"),
        ),
        None => AssertionResult::fail(description, format!("header '{name}' not found")),
    }
}

/// Fails only when the header is absent.
#[must_use]
pub fn header_present(record: &ResponseRecord, name: &str) -> AssertionResult {
    let description = Assertion::header_present(name).description();
    if record.header(name).is_some() {
        AssertionResult::pass(description)
    } else {
        let present: Vec<_> = record.headers().iter().map(|h| h.name.as_str()).collect();
        AssertionResult::fail(
            description,
            format!("header '{name}' not found; received [{}]", present.join(", ")),
        )
    }
}

/// Passes iff the header exists and matches the regex `pattern`.
#[must_use]
pub fn header_matches(record: &ResponseRecord, name: &str, pattern: &str) -> AssertionResult {
    let description = Assertion::header_matches(name, pattern).description();
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            return AssertionResult::fail(description, format!("invalid pattern '{pattern}': {e}"));
        }
    };
    match record.header(name) {
        Some(actual) if regex.is_match(actual) => AssertionResult::pass(description),
        Some(actual) => AssertionResult::fail(
            description,
            format!("header '{name}' value '{actual}' does not match /{pattern}/"),
        ),
        None => AssertionResult::fail(description, format!("header '{name}' not found")),
    }
}

/// Passes iff the parsed body deep-equals `expected`.
#[must_use]
pub fn body_deep_equals(record: &ResponseRecord, expected: &StructuredValue) -> AssertionResult {
    let description = Assertion::body(expected.clone()).description();
    let Some(actual) = record.body().parsed() else {
        return AssertionResult::fail(description, not_json_details(record));
    };
    match expected.first_difference(actual) {
        None => AssertionResult::pass(description),
        Some(difference) => AssertionResult::fail(description, difference),
    }
}

/// Resolves `path` in the parsed body, then compares it with `expected`.
#[must_use]
pub fn body_field_deep_equals(
    record: &ResponseRecord,
    path: &str,
    expected: &StructuredValue,
) -> AssertionResult {
    let description = Assertion::body_field(path, expected.clone()).description();
    let field_path = match FieldPath::parse(path) {
        Ok(field_path) => field_path,
        Err(e) => return AssertionResult::fail(description, e.to_string()),
    };
    let Some(body) = record.body().parsed() else {
        return AssertionResult::fail(description, not_json_details(record));
    };
    let Some(actual) = field_path.resolve(body) else {
        return AssertionResult::fail(description, format!("field '{path}' not found in body"));
    };
    match expected.first_difference(actual) {
        None => AssertionResult::pass(description),
        Some(difference) => {
            let difference = difference.strip_prefix('$').unwrap_or(&difference);
            AssertionResult::fail(description, format!("{path}{difference}"))
        }
    }
}

/// Passes iff `elapsed_ms > ms`.
#[must_use]
pub fn duration_greater_than(record: &ResponseRecord, ms: u64) -> AssertionResult {
    let description = Assertion::DurationGreaterThan { ms }.description();
    let actual = record.elapsed_ms();
    if actual > ms {
        AssertionResult::pass(description)
    } else {
        AssertionResult::fail(description, format!("took {actual}ms, expected more than {ms}ms"))
    }
}

/// Passes iff `elapsed_ms < ms`.
#[must_use]
pub fn duration_less_than(record: &ResponseRecord, ms: u64) -> AssertionResult {
    let description = Assertion::DurationLessThan { ms }.description();
    let actual = record.elapsed_ms();
    if actual < ms {
        AssertionResult::pass(description)
    } else {
        AssertionResult::fail(description, format!("took {actual}ms, expected less than {ms}ms"))
    }
}

fn not_json_details(record: &ResponseRecord) -> String {
    let text = record.body().text();
    if text.is_empty() {
        return "body is empty".to_string();
    }
    let preview: String = text.chars().take(PREVIEW_LEN).collect();
    let ellipsis = if text.chars().count() > PREVIEW_LEN { "..." } else { "" };
    format!("body is not JSON: {preview}{ellipsis}")
}
