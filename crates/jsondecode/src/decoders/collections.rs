//! Sequences and sets decoded from JSON arrays.
use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

use serde_json::Value;

use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    error::{accumulate, AccumulatingResult, DecodeResult, DecodingFailure, Failures},
};

use super::FromJson;

/// Decode every element of an array into a `Vec`.
#[must_use]
pub fn vec<T: 'static>(element: Decoder<T>) -> Decoder<Vec<T>> {
    collection(element)
}

/// Decode every element of an array and collect them into `C`.
#[must_use]
pub fn collection<T, C>(element: Decoder<T>) -> Decoder<C>
where
    T: 'static,
    C: FromIterator<T> + 'static,
{
    Decoder::new(Sequence {
        element,
        _collection: PhantomData,
    })
}

struct Sequence<T, C> {
    element: Decoder<T>,
    _collection: PhantomData<fn() -> C>,
}

/// The items of the focused array.
///
/// # Errors
///
/// Fails when the cursor has no focus or the focus is not an array.
pub(crate) fn items<'a>(cursor: &Cursor<'a>) -> DecodeResult<&'a [Value]> {
    let value = cursor.focused()?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(DecodingFailure::wrong_type(
            "array",
            value,
            cursor.history().clone(),
        )),
    }
}

/// Cursors over the first `len` elements of the focused array, walked left to right.
///
/// The first element is reached with `down_array` and every later one with `right`, so
/// element `n` carries `n + 1` steps on top of the array's own history.
fn elements<'a>(cursor: &Cursor<'a>, len: usize) -> Elements<'a> {
    Elements {
        parent: cursor.clone(),
        current: None,
        remaining: len,
    }
}

struct Elements<'a> {
    parent: Cursor<'a>,
    current: Option<Cursor<'a>>,
    remaining: usize,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Cursor<'a>;

    fn next(&mut self) -> Option<Cursor<'a>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = match &self.current {
            Some(current) => current.right(),
            None => self.parent.down_array(),
        };
        self.current = Some(next.clone());
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Collect results in order, keeping every failure.
pub(crate) fn collect_all<T, C>(
    results: impl Iterator<Item = AccumulatingResult<T>>,
) -> AccumulatingResult<C>
where
    C: FromIterator<T>,
{
    let mut values = Vec::new();
    let mut failures: Option<Failures> = None;
    for result in results {
        match result {
            Ok(value) if failures.is_none() => values.push(value),
            Ok(_) => {}
            Err(more) => accumulate(&mut failures, more),
        }
    }
    match failures {
        Some(failures) => Err(failures),
        None => Ok(values.into_iter().collect()),
    }
}

impl<T: 'static, C: FromIterator<T>> Decode<C> for Sequence<T, C> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<C> {
        let len = items(cursor)?.len();
        elements(cursor, len)
            .map(|element| self.element.decode(&element))
            .collect()
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<C> {
        let len = items(cursor)?.len();
        collect_all(
            elements(cursor, len).map(|element| self.element.decode_accumulating(&element)),
        )
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn decoder() -> Decoder<Self> {
        vec(T::decoder())
    }
}

impl<T: FromJson> FromJson for VecDeque<T> {
    fn decoder() -> Decoder<Self> {
        collection(T::decoder())
    }
}

impl<T: FromJson + Ord> FromJson for BTreeSet<T> {
    fn decoder() -> Decoder<Self> {
        collection(T::decoder())
    }
}

impl<T, S> FromJson for HashSet<T, S>
where
    T: FromJson + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn decoder() -> Decoder<Self> {
        collection(T::decoder())
    }
}
