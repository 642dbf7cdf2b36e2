//! Transformations of decoded values and of the cursor a decoder sees.
use std::error::Error;

use crate::{
    cursor::Cursor,
    error::{AccumulatingResult, DecodeResult, DecodingFailure, Failures},
};

use super::{Checked, Decode, Decoder};

impl<T: 'static> Decoder<T> {
    /// Transform the decoded value. Failures pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Decoder::new(Map { inner: self, f })
    }

    /// Post-process the decoded value with a function that may reject it.
    ///
    /// A rejection becomes a custom failure at the decoder's own position; no step is
    /// added to the history.
    pub fn emap<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
    {
        Decoder::new(Emap { inner: self, f })
    }

    /// Like [`Decoder::emap`], for functions returning arbitrary errors. Errors become
    /// parsing failures at the decoder's position.
    pub fn emap_try<U, E, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        Decoder::new(Emap {
            inner: self,
            f: move |value| f(value).map_err(ErrorRejection),
        })
    }

    /// Choose the next decoder from the decoded value and run it at the same position.
    ///
    /// The second decoder needs the first one's value, so in accumulating mode a failure
    /// of the first decoder is reported alone.
    pub fn and_then<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> Decoder<U> + Send + Sync + 'static,
    {
        Decoder::new(AndThen { inner: self, f })
    }

    /// Transform the cursor before decoding.
    pub fn prepare<F>(self, f: F) -> Decoder<T>
    where
        F: for<'a> Fn(&Cursor<'a>) -> Cursor<'a> + Send + Sync + 'static,
    {
        Decoder::new(Prepare { inner: self, f })
    }

    /// Decode the field `key` of the focused object.
    pub fn at(self, key: impl Into<String>) -> Decoder<T> {
        let key = key.into();
        self.prepare(move |cursor| cursor.down_field(&key))
    }

    /// Decode two values at the same position. In accumulating mode failures of both
    /// sides are reported, left side first.
    pub fn product<U: 'static>(self, other: Decoder<U>) -> Decoder<(T, U)> {
        Decoder::new(Product {
            left: self,
            right: other,
        })
    }

    /// Rewrite every failure this decoder produces.
    pub fn map_failure<F>(self, f: F) -> Decoder<T>
    where
        F: Fn(DecodingFailure) -> DecodingFailure + Send + Sync + 'static,
    {
        Decoder::new(MapFailure { inner: self, f })
    }

    /// Replace the reason of every failure with a custom message, keeping its history.
    pub fn with_error_message(self, message: impl Into<String>) -> Decoder<T> {
        let message = message.into();
        self.map_failure(move |failure| failure.with_message(message.clone()))
    }
}

struct Map<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, U, F> Decode<U> for Map<T, F>
where
    T: 'static,
    F: Fn(T) -> U + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<U> {
        self.inner.decode(cursor).map(&self.f)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<U> {
        self.inner.decode_accumulating(cursor).map(&self.f)
    }
}

struct Emap<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, U, R, F> Decode<U> for Emap<T, F>
where
    T: 'static,
    F: Fn(T) -> Result<U, R> + Send + Sync,
    R: Rejection,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<U> {
        let value = self.inner.decode(cursor)?;
        (self.f)(value).map_err(|rejection| rejection.into_failure(cursor))
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<U> {
        let value = self.inner.decode_accumulating(cursor)?;
        (self.f)(value).map_err(|rejection| Failures::new(rejection.into_failure(cursor)))
    }
}

/// Anything an [`Emap`] function may reject a value with.
trait Rejection {
    fn into_failure(self, cursor: &Cursor<'_>) -> DecodingFailure;
}

impl Rejection for String {
    fn into_failure(self, cursor: &Cursor<'_>) -> DecodingFailure {
        DecodingFailure::custom(self, cursor.history().clone())
    }
}

struct ErrorRejection<E>(E);

impl<E: Into<Box<dyn Error + Send + Sync>>> Rejection for ErrorRejection<E> {
    fn into_failure(self, cursor: &Cursor<'_>) -> DecodingFailure {
        DecodingFailure::from_error(self.0, cursor.history().clone())
    }
}

struct AndThen<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, U, F> Decode<U> for AndThen<T, F>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> Decoder<U> + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<U> {
        let value = self.inner.decode(cursor)?;
        (self.f)(value).decode(cursor)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<U> {
        let value = self.inner.decode_accumulating(cursor)?;
        (self.f)(value).decode_accumulating(cursor)
    }
}

struct Prepare<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, F> Decode<T> for Prepare<T, F>
where
    T: 'static,
    F: for<'a> Fn(&Cursor<'a>) -> Cursor<'a> + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.inner.decode(&(self.f)(cursor))
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.inner.decode_accumulating(&(self.f)(cursor))
    }

    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        self.inner.decode_checked(&(self.f)(cursor))
    }
}

struct Product<T, U> {
    left: Decoder<T>,
    right: Decoder<U>,
}

impl<T: 'static, U: 'static> Decode<(T, U)> for Product<T, U> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<(T, U)> {
        Ok((self.left.decode(cursor)?, self.right.decode(cursor)?))
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<(T, U)> {
        match (
            self.left.decode_accumulating(cursor),
            self.right.decode_accumulating(cursor),
        ) {
            (Ok(left), Ok(right)) => Ok((left, right)),
            (Err(mut failures), Err(more)) => {
                failures.append(more);
                Err(failures)
            }
            (Err(failures), Ok(_)) | (Ok(_), Err(failures)) => Err(failures),
        }
    }
}

struct MapFailure<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, F> Decode<T> for MapFailure<T, F>
where
    T: 'static,
    F: Fn(DecodingFailure) -> DecodingFailure + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.inner.decode(cursor).map_err(&self.f)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.inner
            .decode_accumulating(cursor)
            .map_err(|failures| failures.map(&self.f))
    }
}
