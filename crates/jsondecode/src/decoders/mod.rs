//! Decoders for primitive values and standard containers.
//!
//! [`FromJson`] maps a type to its default decoder. The free functions build the same
//! decoders explicitly, which is how decoders for element types without a [`FromJson`]
//! implementation are plugged into containers.
mod collections;
mod maps;
mod numeric;
mod tuples;

use std::{marker::PhantomData, sync::Arc};

use serde_json::Value;

use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

pub use collections::{collection, vec};
pub use maps::{map, map_with, FromJsonKey};
pub use numeric::{
    f32, f64, i128, i16, i32, i64, i8, isize, u128, u16, u32, u64, u8, usize,
};

/// Types with a default decoder.
pub trait FromJson: Sized + 'static {
    fn decoder() -> Decoder<Self>;
}

/// A decoder that inspects only the focused value.
struct Primitive<T> {
    expected: &'static str,
    extract: fn(&Value) -> Option<T>,
}

impl<T> Decode<T> for Primitive<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let value = cursor.focused()?;
        (self.extract)(value).ok_or_else(|| {
            DecodingFailure::wrong_type(self.expected, value, cursor.history().clone())
        })
    }
}

pub(crate) fn primitive<T: 'static>(
    expected: &'static str,
    extract: fn(&Value) -> Option<T>,
) -> Decoder<T> {
    Decoder::new(Primitive { expected, extract })
}

/// The focused value itself.
#[must_use]
pub fn value() -> Decoder<Value> {
    primitive("json", |value| Some(value.clone()))
}

#[must_use]
pub fn bool() -> Decoder<bool> {
    primitive("bool", Value::as_bool)
}

#[must_use]
pub fn string() -> Decoder<String> {
    primitive("string", |value| value.as_str().map(str::to_string))
}

/// A string of exactly one character.
#[must_use]
pub fn char() -> Decoder<char> {
    primitive("char", |value| {
        let mut chars = value.as_str()?.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    })
}

/// `null`.
#[must_use]
pub fn unit() -> Decoder<()> {
    primitive("null", Value::as_null)
}

/// `null` or an absent field decode to `None`; anything else goes to `inner`.
#[must_use]
pub fn option<T: 'static>(inner: Decoder<T>) -> Decoder<Option<T>> {
    Decoder::new(OptionDecoder { inner })
}

struct OptionDecoder<T> {
    inner: Decoder<T>,
}

impl<T> OptionDecoder<T> {
    fn is_absent(cursor: &Cursor<'_>) -> bool {
        match cursor.value() {
            Some(value) => value.is_null(),
            None => cursor.is_missing_field(),
        }
    }
}

impl<T: 'static> Decode<Option<T>> for OptionDecoder<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<Option<T>> {
        if Self::is_absent(cursor) {
            return Ok(None);
        }
        self.inner.decode(cursor).map(Some)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<Option<T>> {
        if Self::is_absent(cursor) {
            return Ok(None);
        }
        self.inner.decode_accumulating(cursor).map(Some)
    }
}

/// Wraps the decoder of `T` into a smart pointer.
struct Wrap<T, P> {
    inner: Decoder<T>,
    _pointer: PhantomData<fn() -> P>,
}

impl<T, P> Decode<P> for Wrap<T, P>
where
    T: 'static,
    P: From<T>,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<P> {
        self.inner.decode(cursor).map(P::from)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<P> {
        self.inner.decode_accumulating(cursor).map(P::from)
    }
}

fn wrap<T: 'static, P: From<T> + 'static>(inner: Decoder<T>) -> Decoder<P> {
    Decoder::new(Wrap {
        inner,
        _pointer: PhantomData,
    })
}

impl FromJson for Value {
    fn decoder() -> Decoder<Self> {
        value()
    }
}

impl FromJson for bool {
    fn decoder() -> Decoder<Self> {
        bool()
    }
}

impl FromJson for String {
    fn decoder() -> Decoder<Self> {
        string()
    }
}

impl FromJson for char {
    fn decoder() -> Decoder<Self> {
        char()
    }
}

impl FromJson for () {
    fn decoder() -> Decoder<Self> {
        unit()
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn decoder() -> Decoder<Self> {
        option(T::decoder())
    }
}

impl<T: FromJson> FromJson for Box<T> {
    fn decoder() -> Decoder<Self> {
        wrap(T::decoder())
    }
}

impl<T: FromJson> FromJson for Arc<T> {
    fn decoder() -> Decoder<Self> {
        wrap(T::decoder())
    }
}
