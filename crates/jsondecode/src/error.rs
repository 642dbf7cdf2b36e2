//! Decoding failures.
use core::fmt;
use std::{error::Error, sync::Arc};

use serde::{ser::SerializeStruct, Serialize, Serializer};
use serde_json::Value;

use crate::history::History;

/// Result of fail-fast decoding.
pub type DecodeResult<T> = Result<T, DecodingFailure>;
/// Result of error-accumulating decoding.
pub type AccumulatingResult<T> = Result<T, Failures>;

/// Why decoding failed.
#[derive(Debug, Clone)]
pub enum Reason {
    /// The value had a different shape than the decoder expects.
    WrongTypeExpectation {
        expected: &'static str,
        actual: Value,
    },
    /// A required object field is absent.
    MissingField,
    /// A user-provided message.
    CustomReason(String),
    /// An error raised by a fallible user function.
    ParsingFailure(Arc<dyn Error + Send + Sync>),
}

impl Reason {
    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::WrongTypeExpectation { expected, actual } => {
                write!(f, "Got value '{actual}' with wrong type, expecting {expected}")
            }
            Reason::MissingField => f.write_str("Missing required field"),
            Reason::CustomReason(message) => f.write_str(message),
            Reason::ParsingFailure(error) => write!(f, "{error}"),
        }
    }
}

impl PartialEq for Reason {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Reason::WrongTypeExpectation { expected, actual },
                Reason::WrongTypeExpectation {
                    expected: other_expected,
                    actual: other_actual,
                },
            ) => expected == other_expected && actual == other_actual,
            (Reason::MissingField, Reason::MissingField) => true,
            (Reason::CustomReason(left), Reason::CustomReason(right)) => left == right,
            (Reason::ParsingFailure(left), Reason::ParsingFailure(right)) => {
                Arc::ptr_eq(left, right) || left.to_string() == right.to_string()
            }
            _ => false,
        }
    }
}

/// A single decoding failure together with the navigation history leading to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodingFailure {
    repr: Box<FailureRepr>,
}

#[derive(Debug, Clone, PartialEq)]
struct FailureRepr {
    reason: Reason,
    /// Steps taken from the document root up to the failing position.
    history: History,
}

impl DecodingFailure {
    #[must_use]
    pub fn new(reason: Reason, history: History) -> DecodingFailure {
        DecodingFailure {
            repr: Box::new(FailureRepr { reason, history }),
        }
    }

    #[must_use]
    pub fn missing_field(history: History) -> DecodingFailure {
        DecodingFailure::new(Reason::MissingField, history)
    }

    #[must_use]
    pub fn wrong_type(expected: &'static str, actual: &Value, history: History) -> DecodingFailure {
        DecodingFailure::new(
            Reason::WrongTypeExpectation {
                expected,
                actual: actual.clone(),
            },
            history,
        )
    }

    pub fn custom(message: impl Into<String>, history: History) -> DecodingFailure {
        DecodingFailure::new(Reason::CustomReason(message.into()), history)
    }

    /// Convert an arbitrary error into a failure.
    ///
    /// An error that already is a [`DecodingFailure`] is returned as-is; anything else
    /// becomes a [`Reason::ParsingFailure`] at the given history.
    pub fn from_error(
        error: impl Into<Box<dyn Error + Send + Sync>>,
        history: History,
    ) -> DecodingFailure {
        let error: Box<dyn Error + Send + Sync> = error.into();
        match error.downcast::<DecodingFailure>() {
            Ok(failure) => *failure,
            Err(other) => DecodingFailure::new(Reason::ParsingFailure(Arc::from(other)), history),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &Reason {
        &self.repr.reason
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.repr.history
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.repr.reason.message()
    }

    /// Selection path of the failing position, e.g. `.a[0].b`.
    #[must_use]
    pub fn path(&self) -> String {
        self.repr.history.path()
    }

    /// JSON Pointer of the failing position, e.g. `/a/0/b`.
    #[must_use]
    pub fn pointer(&self) -> String {
        self.repr.history.pointer()
    }

    #[must_use]
    pub fn with_reason(mut self, reason: Reason) -> DecodingFailure {
        self.repr.reason = reason;
        self
    }

    #[must_use]
    pub fn with_message(self, message: impl Into<String>) -> DecodingFailure {
        self.with_reason(Reason::CustomReason(message.into()))
    }

    #[must_use]
    pub fn with_history(mut self, history: History) -> DecodingFailure {
        self.repr.history = history;
        self
    }

    #[must_use]
    pub fn into_parts(self) -> (Reason, History) {
        let FailureRepr { reason, history } = *self.repr;
        (reason, history)
    }
}

impl fmt::Display for DecodingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repr.history.is_empty() {
            write!(f, "DecodingFailure: {}", self.repr.reason)
        } else {
            write!(
                f,
                "DecodingFailure at {}: {}",
                self.repr.history, self.repr.reason
            )
        }
    }
}

impl Error for DecodingFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.repr.reason {
            Reason::ParsingFailure(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl Serialize for DecodingFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DecodingFailure", 3)?;
        state.serialize_field("instanceLocation", &self.pointer())?;
        state.serialize_field("path", &self.path())?;
        state.serialize_field("error", &self.message())?;
        state.end()
    }
}

/// A non-empty, ordered collection of failures produced by accumulating decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Failures {
    first: DecodingFailure,
    rest: Vec<DecodingFailure>,
}

impl Failures {
    #[must_use]
    pub fn new(first: DecodingFailure) -> Failures {
        Failures {
            first,
            rest: Vec::new(),
        }
    }

    /// `None` when `failures` is empty.
    #[must_use]
    pub fn from_vec(failures: Vec<DecodingFailure>) -> Option<Failures> {
        let mut iter = failures.into_iter();
        let first = iter.next()?;
        Some(Failures {
            first,
            rest: iter.collect(),
        })
    }

    /// The earliest recorded failure.
    #[must_use]
    pub fn first(&self) -> &DecodingFailure {
        &self.first
    }

    #[must_use]
    pub fn into_first(self) -> DecodingFailure {
        self.first
    }

    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn push(&mut self, failure: DecodingFailure) {
        self.rest.push(failure);
    }

    /// Append all failures of `other`, keeping their order.
    pub fn append(&mut self, other: Failures) {
        self.rest.reserve(other.len());
        self.rest.push(other.first);
        self.rest.extend(other.rest);
    }

    /// Rewrite every failure, keeping their order.
    #[must_use]
    pub fn map<F>(self, mut f: F) -> Failures
    where
        F: FnMut(DecodingFailure) -> DecodingFailure,
    {
        let first = f(self.first);
        Failures {
            first,
            rest: self.rest.into_iter().map(f).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodingFailure> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<DecodingFailure> {
        let mut failures = Vec::with_capacity(self.len());
        failures.push(self.first);
        failures.extend(self.rest);
        failures
    }

    /// A serializable report in the JSON Schema "basic" output shape.
    #[must_use]
    pub fn basic_output(&self) -> BasicOutput<'_> {
        BasicOutput {
            valid: false,
            errors: self.iter().collect(),
        }
    }
}

/// Merge an optional accumulator with new failures.
pub(crate) fn accumulate(target: &mut Option<Failures>, failures: Failures) {
    match target {
        Some(existing) => existing.append(failures),
        None => *target = Some(failures),
    }
}

impl From<DecodingFailure> for Failures {
    fn from(failure: DecodingFailure) -> Self {
        Failures::new(failure)
    }
}

impl IntoIterator for Failures {
    type Item = DecodingFailure;
    type IntoIter = std::vec::IntoIter<DecodingFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, failure) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl Error for Failures {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.first)
    }
}

/// Flat list of failures, serialized as
/// `{"valid": false, "errors": [{"instanceLocation": ..., "path": ..., "error": ...}]}`.
#[derive(Debug, Serialize)]
pub struct BasicOutput<'a> {
    valid: bool,
    errors: Vec<&'a DecodingFailure>,
}

impl<'a> BasicOutput<'a> {
    /// Output for a successful decode.
    #[must_use]
    pub fn valid() -> BasicOutput<'a> {
        BasicOutput {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Output for any accumulating result.
    #[must_use]
    pub fn from_result<T>(result: &'a AccumulatingResult<T>) -> BasicOutput<'a> {
        match result {
            Ok(_) => BasicOutput::valid(),
            Err(failures) => failures.basic_output(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodingFailure, Failures, Reason};
    use crate::history::{CursorOp, History};
    use serde_json::json;
    use std::error::Error;

    fn at(fields: &[&str]) -> History {
        fields
            .iter()
            .map(|name| CursorOp::DownField((*name).to_string()))
            .collect()
    }

    #[test]
    fn display() {
        let failure = DecodingFailure::missing_field(at(&["a", "b"]));
        assert_eq!(
            failure.to_string(),
            "DecodingFailure at .a.b: Missing required field"
        );
        let failure = DecodingFailure::wrong_type("string", &json!(1), History::new());
        assert_eq!(
            failure.to_string(),
            "DecodingFailure: Got value '1' with wrong type, expecting string"
        );
    }

    #[test]
    fn from_error_keeps_decoding_failures() {
        let original = DecodingFailure::custom("inner", at(&["x"]));
        let converted = DecodingFailure::from_error(original.clone(), at(&["y"]));
        assert_eq!(converted, original);
    }

    #[test]
    fn from_error_wraps_other_errors() {
        let error = "abc".parse::<i32>().expect_err("Not a number");
        let failure = DecodingFailure::from_error(error, at(&["n"]));
        assert!(matches!(failure.reason(), Reason::ParsingFailure(_)));
        assert_eq!(failure.message(), "invalid digit found in string");
        assert!(failure.source().is_some());
    }

    #[test]
    fn failures_keep_order() {
        let mut failures = Failures::new(DecodingFailure::custom("a", History::new()));
        failures.push(DecodingFailure::custom("b", History::new()));
        let mut other = Failures::new(DecodingFailure::custom("c", History::new()));
        other.push(DecodingFailure::custom("d", History::new()));
        failures.append(other);
        let messages: Vec<_> = failures.iter().map(DecodingFailure::message).collect();
        assert_eq!(messages, ["a", "b", "c", "d"]);
        assert_eq!(failures.len(), 4);
        assert!(Failures::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn basic_output() {
        let mut failures = Failures::new(DecodingFailure::missing_field(at(&["a"])));
        failures.push(DecodingFailure::custom("Too small", at(&["b"])));
        let output = serde_json::to_value(failures.basic_output()).expect("Serializable");
        assert_eq!(
            output,
            json!({
                "valid": false,
                "errors": [
                    {"instanceLocation": "/a", "path": ".a", "error": "Missing required field"},
                    {"instanceLocation": "/b", "path": ".b", "error": "Too small"}
                ]
            })
        );
    }
}
