//! Structured values used for request bodies and parsed response bodies.
//!
//! `StructuredValue` is a tagged union over the JSON data model. Equality is
//! structural: mapping keys are compared as sets (order never matters),
//! sequences are compared element by element, and numbers compare by numeric
//! value so an echoed `25.0` equals a submitted `25`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A JSON-compatible number that remembers whether it was integral.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Integral value. Wide enough for every `i64` and `u64`.
    Integer(i128),
    /// Floating point value.
    Float(f64),
}

/// 2^127, the first magnitude outside the `i128` range.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl Number {
    /// Returns the value as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// The exact integer a float stands for, if it has no fractional part
    /// and fits in `i128`.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn float_as_integer(f: f64) -> Option<i128> {
        (f.is_finite() && f.fract() == 0.0 && f >= -I128_LIMIT && f < I128_LIMIT)
            .then(|| f as i128)
    }
}

impl PartialEq for Number {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                Self::float_as_integer(f) == Some(i)
            }
        }
    }
}

/// Generic structured value: null, bool, number, string, sequence or mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum StructuredValue {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<StructuredValue>),
    /// String-keyed mapping; key order is irrelevant.
    Mapping(BTreeMap<String, StructuredValue>),
}

impl StructuredValue {
    /// Builds a mapping from key/value pairs.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the string contents if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Resolves a field path such as `args`, `headers.User-Agent` or
    /// `$.json.items[0]`.
    ///
    /// Mapping keys match exactly first and then ignoring ASCII case, since
    /// echo services normalise header names.
    ///
    /// # Errors
    ///
    /// Returns an error if the path itself is malformed. A well-formed path
    /// that does not resolve yields `Ok(None)`.
    pub fn lookup(&self, path: &str) -> DomainResult<Option<&Self>> {
        let path = FieldPath::parse(path)?;
        Ok(path.resolve(self))
    }

    /// Describes the first structural difference between `self` (expected)
    /// and `actual`, or `None` when they are deep-equal.
    #[must_use]
    pub fn first_difference(&self, actual: &Self) -> Option<String> {
        difference_at(self, actual, "$")
    }
}

fn difference_at(expected: &StructuredValue, actual: &StructuredValue, path: &str) -> Option<String> {
    match (expected, actual) {
        (StructuredValue::Mapping(exp), StructuredValue::Mapping(act)) => {
            if let Some(key) = exp.keys().find(|k| !act.contains_key(*k)) {
                return Some(format!("{path}.{key}: missing key"));
            }
            if let Some(key) = act.keys().find(|k| !exp.contains_key(*k)) {
                return Some(format!("{path}.{key}: unexpected key"));
            }
            exp.iter().find_map(|(key, value)| {
                difference_at(value, &act[key], &format!("{path}.{key}"))
            })
        }
        (StructuredValue::Sequence(exp), StructuredValue::Sequence(act)) => {
            if exp.len() != act.len() {
                return Some(format!(
                    "{path}: expected {} elements, got {}",
                    exp.len(),
                    act.len()
                ));
            }
            exp.iter()
                .zip(act)
                .enumerate()
                .find_map(|(i, (e, a))| difference_at(e, a, &format!("{path}[{i}]")))
        }
        _ if expected == actual => None,
        _ => Some(format!("{path}: expected {expected}, got {actual}")),
    }
}

impl fmt::Display for StructuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self.clone()))
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(
                n.as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from))
                    .map_or_else(|| Number::Float(n.as_f64().unwrap_or(f64::NAN)), Number::Integer),
            ),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<StructuredValue> for serde_json::Value {
    fn from(value: StructuredValue) -> Self {
        match value {
            StructuredValue::Null => Self::Null,
            StructuredValue::Bool(b) => Self::Bool(b),
            StructuredValue::Number(Number::Integer(i)) => i64::try_from(i)
                .map(Self::from)
                .or_else(|_| u64::try_from(i).map(Self::from))
                .unwrap_or_else(|_| {
                    serde_json::Number::from_f64(Number::Integer(i).as_f64())
                        .map_or(Self::Null, Self::Number)
                }),
            StructuredValue::Number(Number::Float(f)) => {
                serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number)
            }
            StructuredValue::String(s) => Self::String(s),
            StructuredValue::Sequence(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            StructuredValue::Mapping(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for StructuredValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StructuredValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for StructuredValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for StructuredValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::Integer(i128::from(value)))
    }
}

impl From<u64> for StructuredValue {
    fn from(value: u64) -> Self {
        Self::Number(Number::Integer(i128::from(value)))
    }
}

impl From<i32> for StructuredValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::Integer(i128::from(value)))
    }
}

impl From<u32> for StructuredValue {
    fn from(value: u32) -> Self {
        Self::Number(Number::Integer(i128::from(value)))
    }
}

impl From<f64> for StructuredValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl<T: Into<Self>> From<Vec<T>> for StructuredValue {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Self>> FromIterator<(K, V)> for StructuredValue {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::mapping(iter)
    }
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// A parsed field path: dot-separated keys with optional `[n]` indices and an
/// optional leading `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parses a path. The empty path and `$` both denote the root.
    ///
    /// # Errors
    ///
    /// Returns an error for empty keys, unclosed brackets or non-numeric
    /// indices.
    pub fn parse(path: &str) -> DomainResult<Self> {
        let invalid = |reason: &str| DomainError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = path.trim();
        let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let rest = rest.strip_prefix('.').unwrap_or(rest);

        let mut segments = Vec::new();
        if rest.is_empty() {
            return Ok(Self { segments });
        }

        for part in rest.split('.') {
            let (key, mut indices) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };
            if key.is_empty() && indices.is_empty() {
                return Err(invalid("empty key"));
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            while !indices.is_empty() {
                let inner = indices
                    .strip_prefix('[')
                    .ok_or_else(|| invalid("expected '['"))?;
                let close = inner.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                let index = inner[..close]
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
                indices = &inner[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    /// Path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walks `root` along this path.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a StructuredValue) -> Option<&'a StructuredValue> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match (segment, current) {
                (PathSegment::Key(key), StructuredValue::Mapping(map)) => map.get(key).or_else(|| {
                    map.iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(key))
                        .map(|(_, v)| v)
                }),
                (PathSegment::Index(i), StructuredValue::Sequence(items)) => items.get(*i),
                _ => None,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn mapping_equality_ignores_key_order() {
        let a: StructuredValue = json!({"name": "Ania", "age": "25"}).into();
        let b = StructuredValue::mapping([("age", "25"), ("name", "Ania")]);
        assert_eq!(a, b);
        assert_eq!(a.first_difference(&b), None);
    }

    #[test]
    fn sequence_order_matters() {
        let a: StructuredValue = json!([1, 2]).into();
        let b: StructuredValue = json!([2, 1]).into();
        assert_ne!(a, b);
        assert_eq!(
            a.first_difference(&b).unwrap(),
            "$[0]: expected 1, got 2"
        );
    }

    #[test]
    fn integers_equal_their_float_echo() {
        let submitted: StructuredValue = json!({"age": 100}).into();
        let echoed: StructuredValue = json!({"age": 100.0}).into();
        assert_eq!(submitted, echoed);
    }

    #[test]
    fn large_unsigned_integers_stay_exact() {
        let max: StructuredValue = serde_json::from_str("18446744073709551615").unwrap();
        let below: StructuredValue = serde_json::from_str("18446744073709551614").unwrap();

        assert_ne!(max, below);
        assert_eq!(
            max.first_difference(&below).unwrap(),
            "$: expected 18446744073709551615, got 18446744073709551614"
        );
        assert_eq!(max.to_string(), "18446744073709551615");
        assert_eq!(max, StructuredValue::from(u64::MAX));
    }

    #[test]
    fn integer_and_float_match_only_when_exact() {
        assert_ne!(
            StructuredValue::from(9_007_199_254_740_993_i64),
            StructuredValue::from(9_007_199_254_740_992.0)
        );
        assert_eq!(
            StructuredValue::from(9_007_199_254_740_992_i64),
            StructuredValue::from(9_007_199_254_740_992.0)
        );
        assert_ne!(StructuredValue::from(25), StructuredValue::from(25.5));
        assert_ne!(StructuredValue::from(0), StructuredValue::from(f64::NAN));
        assert_ne!(
            StructuredValue::Number(Number::Integer(i128::MAX)),
            StructuredValue::from(1.0e39)
        );
    }

    #[test]
    fn difference_reports_missing_and_extra_keys() {
        let expected: StructuredValue = json!({"name": "Ania", "age": "25"}).into();

        let missing: StructuredValue = json!({"name": "Ania"}).into();
        assert_eq!(expected.first_difference(&missing).unwrap(), "$.age: missing key");

        let extra: StructuredValue = json!({"name": "Ania", "age": "25", "x": 1}).into();
        assert_eq!(expected.first_difference(&extra).unwrap(), "$.x: unexpected key");

        let changed: StructuredValue = json!({"name": "Bob", "age": "25"}).into();
        assert_eq!(
            expected.first_difference(&changed).unwrap(),
            r#"$.name: expected "Ania", got "Bob""#
        );
    }

    #[test]
    fn difference_reports_type_mismatch() {
        let expected: StructuredValue = json!({"age": "25"}).into();
        let actual: StructuredValue = json!({"age": 25}).into();
        assert_eq!(
            expected.first_difference(&actual).unwrap(),
            r#"$.age: expected "25", got 25"#
        );
    }

    #[test]
    fn lookup_follows_echo_paths() {
        let body: StructuredValue = json!({
            "args": {"name": "User42"},
            "headers": {"User-Agent": "MyTestAgent/1.0"},
            "json": {"items": [{"id": 1}, {"id": 2}]}
        })
        .into();

        assert_eq!(
            body.lookup("args.name").unwrap().and_then(StructuredValue::as_str),
            Some("User42")
        );
        assert_eq!(
            body.lookup("$.json.items[1].id").unwrap(),
            Some(&StructuredValue::from(2))
        );
        assert_eq!(body.lookup("$").unwrap(), Some(&body));
        assert_eq!(body.lookup("json.items[5]").unwrap(), None);
        assert_eq!(body.lookup("args.missing").unwrap(), None);
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive_keys() {
        let body: StructuredValue = json!({"headers": {"user-agent": "curl"}}).into();
        assert_eq!(
            body.lookup("headers.User-Agent").unwrap().and_then(StructuredValue::as_str),
            Some("curl")
        );
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse("items[").is_err());
        assert!(FieldPath::parse("items[x]").is_err());
        assert_eq!(
            FieldPath::parse("a[0][1]").unwrap().segments(),
            &[
                PathSegment::Key("a".to_string()),
                PathSegment::Index(0),
                PathSegment::Index(1)
            ]
        );
    }

    #[test]
    fn serde_goes_through_json_value() {
        let value: StructuredValue = serde_json::from_str(r#"{"b": [true, null], "a": 1.5}"#).unwrap();
        assert_eq!(value.to_string(), r#"{"a":1.5,"b":[true,null]}"#);
    }
}
