//! Refinements: checks that run after a successful decode.
//!
//! In accumulating mode refinements are chained through [`Checked`]: a value rejected by
//! one refinement is still handed to the next, so every failing check is reported. A
//! value that could not be decoded at all is never checked.
use std::sync::Arc;

use crate::{
    cursor::Cursor,
    error::{AccumulatingResult, DecodeResult, DecodingFailure, Failures},
};

use super::{Checked, Decode, Decoder};

type ValueCheck<T> = Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>;
type CursorCheck = Arc<dyn Fn(&Cursor<'_>) -> Vec<String> + Send + Sync>;

enum Check<T> {
    Value(ValueCheck<T>),
    Cursor(CursorCheck),
}

impl<T> Check<T> {
    fn run(&self, value: &T, cursor: &Cursor<'_>) -> Vec<String> {
        match self {
            Check::Value(check) => check(value),
            Check::Cursor(check) => check(cursor),
        }
    }
}

impl<T: 'static> Decoder<T> {
    /// Fail with `message` when `predicate` rejects the decoded value.
    pub fn ensure<P>(self, predicate: P, message: impl Into<String>) -> Decoder<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.ensure_all(move |value| {
            if predicate(value) {
                Vec::new()
            } else {
                vec![message.clone()]
            }
        })
    }

    /// Check the decoded value; every returned message becomes one failure.
    pub fn ensure_all<F>(self, errors: F) -> Decoder<T>
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        Decoder::new(Refine {
            inner: self,
            check: Check::Value(Arc::new(errors)),
        })
    }

    /// Fail with `message` when `predicate` rejects the cursor the decoder ran at.
    ///
    /// The check runs once, after the inner decoder succeeded.
    pub fn validate<P>(self, predicate: P, message: impl Into<String>) -> Decoder<T>
    where
        P: Fn(&Cursor<'_>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.validate_all(move |cursor| {
            if predicate(cursor) {
                Vec::new()
            } else {
                vec![message.clone()]
            }
        })
    }

    /// Check the cursor the decoder ran at; every returned message becomes one failure.
    pub fn validate_all<F>(self, errors: F) -> Decoder<T>
    where
        F: Fn(&Cursor<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        Decoder::new(Refine {
            inner: self,
            check: Check::Cursor(Arc::new(errors)),
        })
    }
}

struct Refine<T> {
    inner: Decoder<T>,
    check: Check<T>,
}

impl<T: 'static> Refine<T> {
    fn failures(&self, value: &T, cursor: &Cursor<'_>) -> Option<Failures> {
        let failures = self
            .check
            .run(value, cursor)
            .into_iter()
            .map(|message| DecodingFailure::custom(message, cursor.history().clone()))
            .collect();
        Failures::from_vec(failures)
    }
}

impl<T: 'static> Decode<T> for Refine<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let value = self.inner.decode(cursor)?;
        match self.failures(&value, cursor) {
            None => Ok(value),
            Some(failures) => Err(failures.into_first()),
        }
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.decode_checked(cursor).into_result()
    }

    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        match self.inner.decode_checked(cursor) {
            Checked::Valid(value) => match self.failures(&value, cursor) {
                None => Checked::Valid(value),
                Some(failures) => Checked::Refuted(value, failures),
            },
            Checked::Refuted(value, mut failures) => {
                if let Some(more) = self.failures(&value, cursor) {
                    failures.append(more);
                }
                Checked::Refuted(value, failures)
            }
            invalid @ Checked::Invalid(_) => invalid,
        }
    }
}
