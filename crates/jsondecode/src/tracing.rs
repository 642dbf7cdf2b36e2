//! Observing decoder evaluation.
use std::{fmt, sync::Arc};

use crate::{
    cursor::Cursor,
    decoder::{Checked, Decode, Decoder},
    error::{AccumulatingResult, DecodeResult},
    history::History,
};

/// Context passed to tracing callbacks after a traced decoder ran.
#[derive(Debug, Clone)]
pub struct TracingContext<'c> {
    /// Where in the document the decoder ran.
    pub history: &'c History,
    pub mode: DecodeMode,
    pub result: EvaluationResult,
}

impl<'c> TracingContext<'c> {
    pub fn new(history: &'c History, mode: DecodeMode, result: impl Into<EvaluationResult>) -> Self {
        Self {
            history,
            mode,
            result: result.into(),
        }
    }

    /// Call the tracing callback with this context
    pub fn call(self, callback: &TracingCallback) {
        callback(self);
    }
}

/// Which decoding entry point evaluated the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    FailFast,
    Accumulating,
}

/// Result of evaluating a decoder at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationResult {
    Valid,
    Invalid,
}

impl From<bool> for EvaluationResult {
    fn from(value: bool) -> Self {
        if value {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// Callback invoked after each evaluation of a traced decoder.
pub type TracingCallback = dyn Fn(TracingContext<'_>) + Send + Sync;

impl<T: 'static> Decoder<T> {
    /// Report every evaluation of this decoder to `callback`.
    pub fn traced<F>(self, callback: F) -> Decoder<T>
    where
        F: Fn(TracingContext<'_>) + Send + Sync + 'static,
    {
        Decoder::new(Traced {
            inner: self,
            callback: Arc::new(callback),
        })
    }
}

struct Traced<T> {
    inner: Decoder<T>,
    callback: Arc<TracingCallback>,
}

impl<T> Traced<T> {
    fn report(&self, cursor: &Cursor<'_>, mode: DecodeMode, valid: bool) {
        TracingContext::new(cursor.history(), mode, valid).call(&*self.callback);
    }
}

impl<T: 'static> Decode<T> for Traced<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let result = self.inner.decode(cursor);
        self.report(cursor, DecodeMode::FailFast, result.is_ok());
        result
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.decode_checked(cursor).into_result()
    }

    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        let checked = self.inner.decode_checked(cursor);
        self.report(
            cursor,
            DecodeMode::Accumulating,
            matches!(checked, Checked::Valid(_)),
        );
        checked
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecodeMode::FailFast => "fail-fast",
            DecodeMode::Accumulating => "accumulating",
        })
    }
}
