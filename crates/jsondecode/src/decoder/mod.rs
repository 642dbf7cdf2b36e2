//! The decoding protocol and the [`Decoder`] handle.
//!
//! A decoder runs in one of two modes. Fail-fast decoding stops at the first failure.
//! Accumulating decoding keeps going wherever independent parts of the input can be
//! checked without a valid intermediate value (product fields, container elements,
//! chained refinements) and reports every failure in traversal order.
mod alternatives;
mod combinators;
mod recursive;
mod refine;

use std::{error::Error, sync::Arc};

use serde_json::Value;

use crate::{
    cursor::Cursor,
    error::{AccumulatingResult, DecodeResult, DecodingFailure, Failures},
};

pub use alternatives::Either;

/// A decoding step.
///
/// Only [`Decode::decode_cursor`] is required. The accumulating variant defaults to
/// lifting the fail-fast failure into a singleton collection, which is correct for any
/// decoder that has no independent sub-parts. Decoders that do (products, containers)
/// override it to report every failing part.
pub trait Decode<T>: Send + Sync {
    /// Decode in fail-fast mode.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered.
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T>;

    /// Decode in accumulating mode.
    ///
    /// # Errors
    ///
    /// Returns every independent failure, in traversal order.
    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.decode_cursor(cursor).map_err(Failures::from)
    }

    /// Decode in accumulating mode, keeping the decoded value when only refinements
    /// (`ensure`, `validate`) rejected it, so that later refinements still run.
    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        Checked::from(self.decode_cursor_accumulating(cursor))
    }
}

/// Outcome of accumulating decoding before refinement failures are folded in.
#[derive(Debug)]
pub enum Checked<T> {
    /// Decoded and accepted by every refinement.
    Valid(T),
    /// Decoded, but rejected by at least one refinement.
    Refuted(T, Failures),
    /// Could not be decoded.
    Invalid(Failures),
}

impl<T> Checked<T> {
    /// # Errors
    ///
    /// Returns the refinement or decoding failures.
    pub fn into_result(self) -> AccumulatingResult<T> {
        match self {
            Checked::Valid(value) => Ok(value),
            Checked::Refuted(_, failures) | Checked::Invalid(failures) => Err(failures),
        }
    }
}

impl<T> From<AccumulatingResult<T>> for Checked<T> {
    fn from(result: AccumulatingResult<T>) -> Self {
        match result {
            Ok(value) => Checked::Valid(value),
            Err(failures) => Checked::Invalid(failures),
        }
    }
}

/// A shareable decoder producing values of type `T`.
///
/// Cloning is cheap: clones share the same underlying decoding step. Decoders hold no
/// mutable state and can be used from many threads at once.
pub struct Decoder<T> {
    inner: Arc<dyn Decode<T>>,
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Decoder {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Decoder<T> {
    pub fn new(decode: impl Decode<T> + 'static) -> Decoder<T> {
        Decoder {
            inner: Arc::new(decode),
        }
    }

    /// Decode at the cursor, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn decode(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.inner.decode_cursor(cursor)
    }

    /// Decode at the cursor, collecting every independent failure.
    ///
    /// # Errors
    ///
    /// Returns all failures in traversal order.
    pub fn decode_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.inner.decode_cursor_accumulating(cursor)
    }

    /// See [`Decode::decode_checked`].
    #[must_use]
    pub fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        self.inner.decode_checked(cursor)
    }

    /// Decode a whole document, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn decode_json(&self, value: &Value) -> DecodeResult<T> {
        self.decode(&Cursor::new(value))
    }

    /// Decode a whole document, collecting every independent failure.
    ///
    /// # Errors
    ///
    /// Returns all failures in traversal order.
    pub fn decode_json_accumulating(&self, value: &Value) -> AccumulatingResult<T> {
        self.decode_accumulating(&Cursor::new(value))
    }

    /// Lift a plain function into a decoder.
    pub fn instance<F>(f: F) -> Decoder<T>
    where
        F: Fn(&Cursor<'_>) -> DecodeResult<T> + Send + Sync + 'static,
    {
        Decoder::new(Instance(f))
    }

    /// Lift a fallible function into a decoder. Its errors become
    /// [`Reason::ParsingFailure`](crate::Reason::ParsingFailure) failures at the cursor's
    /// position, unless they already are [`DecodingFailure`]s.
    pub fn instance_try<F, E>(f: F) -> Decoder<T>
    where
        F: Fn(&Cursor<'_>) -> Result<T, E> + Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Decoder::instance(move |cursor| {
            f(cursor).map_err(|error| DecodingFailure::from_error(error, cursor.history().clone()))
        })
    }

    /// Always succeed with `value`, ignoring the input.
    pub fn const_(value: T) -> Decoder<T>
    where
        T: Clone + Send + Sync,
    {
        Decoder::new(Const(value))
    }

    /// Always fail with `failure`.
    #[must_use]
    pub fn failed(failure: DecodingFailure) -> Decoder<T> {
        Decoder::new(Failed(failure))
    }

    /// Always fail with a custom message at the cursor's position.
    pub fn failed_with_message(message: impl Into<String>) -> Decoder<T> {
        Decoder::new(FailedWithMessage(message.into()))
    }
}

struct Instance<F>(F);

impl<T, F> Decode<T> for Instance<F>
where
    F: Fn(&Cursor<'_>) -> DecodeResult<T> + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        (self.0)(cursor)
    }
}

struct Const<T>(T);

impl<T: Clone + Send + Sync> Decode<T> for Const<T> {
    fn decode_cursor(&self, _: &Cursor<'_>) -> DecodeResult<T> {
        Ok(self.0.clone())
    }
}

struct Failed(DecodingFailure);

impl<T> Decode<T> for Failed {
    fn decode_cursor(&self, _: &Cursor<'_>) -> DecodeResult<T> {
        Err(self.0.clone())
    }
}

struct FailedWithMessage(String);

impl<T> Decode<T> for FailedWithMessage {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        Err(DecodingFailure::custom(
            self.0.clone(),
            cursor.history().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::{
        cursor::Cursor,
        error::{DecodingFailure, Reason},
        history::{CursorOp, History},
    };
    use serde_json::json;
    use std::error::Error;

    #[test]
    fn const_ignores_input() {
        let decoder = Decoder::const_(42_u32);
        assert_eq!(decoder.decode_json(&json!("anything")), Ok(42));
        assert_eq!(decoder.decode_json_accumulating(&json!(null)), Ok(42));
    }

    #[test]
    fn failed_with_message_uses_cursor_history() {
        let decoder: Decoder<u8> = Decoder::failed_with_message("nope");
        let document = json!({"a": 1});
        let cursor = Cursor::new(&document).down_field("a");
        let failure = decoder.decode(&cursor).expect_err("Always fails");
        assert_eq!(failure.reason(), &Reason::CustomReason("nope".to_string()));
        assert_eq!(
            failure.history().to_vec(),
            vec![CursorOp::DownField("a".to_string())]
        );
    }

    #[test]
    fn failed_returns_the_given_failure() {
        let failure = DecodingFailure::custom("fixed", History::new());
        let decoder: Decoder<u8> = Decoder::failed(failure.clone());
        let failures = decoder
            .decode_json_accumulating(&json!(1))
            .expect_err("Always fails");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.first(), &failure);
    }

    #[test]
    fn instance_try_converts_errors() {
        let decoder = Decoder::instance_try(
            |cursor: &Cursor<'_>| -> Result<i64, Box<dyn Error + Send + Sync>> {
                let text = cursor.decode_as::<String>()?;
                Ok(text.parse::<i64>()?)
            },
        );
        assert_eq!(decoder.decode_json(&json!("12")), Ok(12));
        let failure = decoder.decode_json(&json!("x")).expect_err("Not a number");
        assert!(matches!(failure.reason(), Reason::ParsingFailure(_)));
        // A failure raised by a nested decoder is kept unchanged.
        let failure = decoder.decode_json(&json!(1)).expect_err("Not a string");
        assert!(matches!(
            failure.reason(),
            Reason::WrongTypeExpectation {
                expected: "string",
                ..
            }
        ));
    }
}
