//! Sequential decoding of object fields with tracking of consumed keys.
//!
//! A [`StateDecoder`] is a step over a [`FieldState`]: it reads fields from the focused
//! object and records which keys it used, so that [`StateDecoder::require_empty`] can
//! reject objects carrying unexpected keys. Steps compose like decoders; the first
//! failing step ends the run.
use std::sync::Arc;

use ahash::AHashSet;

use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    decoders::FromJson,
    error::{DecodeResult, DecodingFailure},
};

const ALREADY_COMPLETED: &str = "Field decoding already completed";

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Collecting,
    Done,
    Failed(DecodingFailure),
}

/// The object being decoded and the keys read from it so far.
///
/// Once a read fails or `require_empty` succeeds, the state is final: a failed state
/// repeats its failure for every later call.
#[derive(Debug)]
pub struct FieldState<'a> {
    cursor: Cursor<'a>,
    consumed: AHashSet<String>,
    phase: Phase,
}

impl<'a> FieldState<'a> {
    #[must_use]
    pub fn new(cursor: Cursor<'a>) -> FieldState<'a> {
        FieldState {
            cursor,
            consumed: AHashSet::new(),
            phase: Phase::Collecting,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    /// Whether [`StateDecoder::require_empty`] already succeeded.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// The failure that ended decoding, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&DecodingFailure> {
        match &self.phase {
            Phase::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed.contains(key)
    }

    /// Keys of the object not read yet, in document order.
    #[must_use]
    pub fn leftover_keys(&self) -> Vec<&'a str> {
        self.cursor
            .keys()
            .map(|keys| keys.filter(|key| !self.consumed.contains(*key)).collect())
            .unwrap_or_default()
    }

    fn fail<T>(&mut self, failure: DecodingFailure) -> DecodeResult<T> {
        self.phase = Phase::Failed(failure.clone());
        Err(failure)
    }

    /// Decode the field `name` and mark it as consumed.
    ///
    /// # Errors
    ///
    /// Fails when the field cannot be decoded, after `require_empty` completed, or with
    /// the earlier failure once any step failed.
    pub fn decode_field<T: 'static>(&mut self, name: &str, decoder: &Decoder<T>) -> DecodeResult<T> {
        match &self.phase {
            Phase::Collecting => {}
            Phase::Done => {
                return Err(DecodingFailure::custom(
                    ALREADY_COMPLETED,
                    self.cursor.history().clone(),
                ))
            }
            Phase::Failed(failure) => return Err(failure.clone()),
        }
        let field = self.cursor.down_field(name);
        match decoder.decode(&field) {
            Ok(value) => {
                self.consumed.insert(name.to_string());
                Ok(value)
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Finish decoding, failing when unread keys remain.
    ///
    /// # Errors
    ///
    /// Fails with `Leftover keys: k1, k2` listing the unread keys in document order, or
    /// with the earlier failure once any step failed.
    pub fn require_empty(&mut self) -> DecodeResult<()> {
        match &self.phase {
            Phase::Collecting => {}
            Phase::Done => return Ok(()),
            Phase::Failed(failure) => return Err(failure.clone()),
        }
        let leftover = self.leftover_keys();
        if leftover.is_empty() {
            self.phase = Phase::Done;
            Ok(())
        } else {
            let failure = DecodingFailure::custom(
                format!("Leftover keys: {}", leftover.join(", ")),
                self.cursor.history().clone(),
            );
            self.fail(failure)
        }
    }
}

type Step<T> = Arc<dyn for<'a> Fn(&mut FieldState<'a>) -> DecodeResult<T> + Send + Sync>;

/// A composable step of field decoding.
pub struct StateDecoder<T> {
    step: Step<T>,
}

impl<T> Clone for StateDecoder<T> {
    fn clone(&self) -> Self {
        StateDecoder {
            step: Arc::clone(&self.step),
        }
    }
}

impl<T> std::fmt::Debug for StateDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDecoder")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> StateDecoder<T> {
    pub fn new<F>(step: F) -> StateDecoder<T>
    where
        F: for<'a> Fn(&mut FieldState<'a>) -> DecodeResult<T> + Send + Sync + 'static,
    {
        StateDecoder {
            step: Arc::new(step),
        }
    }

    /// Read the field `name` with the default decoder of `T`.
    #[must_use]
    pub fn decode_field(name: impl Into<String>) -> StateDecoder<T>
    where
        T: FromJson,
    {
        StateDecoder::decode_field_with(name, T::decoder())
    }

    /// Read the field `name` with `decoder`.
    pub fn decode_field_with(name: impl Into<String>, decoder: Decoder<T>) -> StateDecoder<T> {
        let name = name.into();
        StateDecoder::new(move |state| state.decode_field(&name, &decoder))
    }

    /// Succeed with `value` without touching the state.
    pub fn pure(value: T) -> StateDecoder<T>
    where
        T: Clone + Send + Sync,
    {
        StateDecoder::new(move |_| Ok(value.clone()))
    }

    #[must_use]
    pub fn map<U, F>(self, f: F) -> StateDecoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        StateDecoder::new(move |state| (self.step)(state).map(&f))
    }

    #[must_use]
    pub fn and_then<U, F>(self, f: F) -> StateDecoder<U>
    where
        U: 'static,
        F: Fn(T) -> StateDecoder<U> + Send + Sync + 'static,
    {
        StateDecoder::new(move |state| {
            let value = (self.step)(state)?;
            (f(value).step)(state)
        })
    }

    /// Run `next` after this step, keeping only its value.
    #[must_use]
    pub fn then<U: 'static>(self, next: StateDecoder<U>) -> StateDecoder<U> {
        StateDecoder::new(move |state| {
            (self.step)(state)?;
            (next.step)(state)
        })
    }

    /// Run `other` after this step, keeping both values.
    #[must_use]
    pub fn zip<U: 'static>(self, other: StateDecoder<U>) -> StateDecoder<(T, U)> {
        StateDecoder::new(move |state| Ok(((self.step)(state)?, (other.step)(state)?)))
    }

    /// Run against the object focused by `cursor`.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first failing step.
    pub fn run(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let mut state = FieldState::new(cursor.clone());
        (self.step)(&mut state)
    }
}

impl StateDecoder<()> {
    /// Fail when the object has keys no earlier step read.
    #[must_use]
    pub fn require_empty() -> StateDecoder<()> {
        StateDecoder::new(|state| state.require_empty())
    }
}

impl<T: 'static> Decoder<T> {
    /// A decoder running `state` against the focused object.
    #[must_use]
    pub fn from_state(state: StateDecoder<T>) -> Decoder<T> {
        Decoder::new(FromState(state))
    }
}

struct FromState<T>(StateDecoder<T>);

impl<T: 'static> Decode<T> for FromState<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.0.run(cursor)
    }
}
