//! Numeric decoders.
//!
//! Integral decoders never truncate or clamp: a number is accepted only when it is a
//! whole value that fits the target type exactly. Float decoders also accept numbers
//! written as JSON strings.
use num_traits::NumCast;
use serde_json::{Number, Value};

use crate::decoder::Decoder;

use super::{primitive, FromJson};

/// Convert a JSON number to `T` without losing information.
#[allow(clippy::float_cmp)]
fn whole<T: NumCast>(number: &Number) -> Option<T> {
    if let Some(value) = number.as_i64() {
        return <T as NumCast>::from(value);
    }
    if let Some(value) = number.as_u64() {
        return <T as NumCast>::from(value);
    }
    let value = number.as_f64()?;
    if value.fract() == 0.0 {
        <T as NumCast>::from(value)
    } else {
        None
    }
}

fn integral<T: NumCast>(value: &Value) -> Option<T> {
    match value {
        Value::Number(number) => whole(number),
        _ => None,
    }
}

macro_rules! integral_decoders {
    ($($ty:ident),* $(,)?) => {
        $(
            #[doc = concat!("Whole JSON numbers in the range of `", stringify!($ty), "`.")]
            #[must_use]
            pub fn $ty() -> Decoder<$ty> {
                primitive(stringify!($ty), integral::<$ty>)
            }

            impl FromJson for $ty {
                fn decoder() -> Decoder<Self> {
                    $ty()
                }
            }
        )*
    };
}

integral_decoders!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Parse a string holding a JSON number. Rust-only float syntax (`NaN`, `inf`, `.5`,
/// `+1`) is rejected.
fn number_text<T: std::str::FromStr>(text: &str) -> Option<T> {
    if text.trim() != text || serde_json::from_str::<Number>(text).is_err() {
        return None;
    }
    text.parse().ok()
}

/// JSON numbers, or strings holding a JSON number.
#[must_use]
pub fn f64() -> Decoder<f64> {
    primitive("f64", |value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => number_text(text),
        _ => None,
    })
}

/// Like [`f64()`]. Strings are rounded to `f32` directly from their decimal text.
///
/// Numbers are rounded once from the value the document holds. With the
/// `arbitrary-precision` feature that is the original decimal text; otherwise it is the
/// parsed `f64`.
#[must_use]
pub fn f32() -> Decoder<f32> {
    primitive("f32", |value| match value {
        Value::Number(number) => narrow(number),
        Value::String(text) => number_text(text),
        _ => None,
    })
}

#[cfg(feature = "arbitrary-precision")]
fn narrow(number: &Number) -> Option<f32> {
    number.to_string().parse().ok()
}

#[cfg(not(feature = "arbitrary-precision"))]
#[allow(clippy::cast_possible_truncation)]
fn narrow(number: &Number) -> Option<f32> {
    number.as_f64().map(|value| value as f32)
}

impl FromJson for f64 {
    fn decoder() -> Decoder<Self> {
        f64()
    }
}

impl FromJson for f32 {
    fn decoder() -> Decoder<Self> {
        f32()
    }
}
