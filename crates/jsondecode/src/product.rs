//! Decoders for records and tagged unions built from labelled fields.
//!
//! These are the building blocks for decoders of user-defined types. Fields are decoded
//! independently, so in accumulating mode every failing field is reported, in label order.
//!
//! ```rust
//! use jsondecode::{product, Decoder};
//! use serde_json::json;
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     age: u8,
//! }
//!
//! let decoder: Decoder<User> =
//!     product::for_product2(["name", "age"], |name, age| User { name, age });
//! assert_eq!(
//!     decoder.decode_json(&json!({"name": "Ann", "age": 31})),
//!     Ok(User { name: "Ann".to_string(), age: 31 })
//! );
//! let failures = decoder
//!     .decode_json_accumulating(&json!({"name": 1, "age": "x"}))
//!     .unwrap_err();
//! assert_eq!(failures.len(), 2);
//! ```
use std::{fmt, sync::Arc};

use ahash::AHashSet;

use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    decoders::FromJson,
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

type NameTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How labels map to JSON member names, and whether unknown members are rejected.
#[derive(Clone)]
pub struct Configuration {
    member_names: Option<NameTransform>,
    strict: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("transforms_member_names", &self.member_names.is_some())
            .field("strict", &self.strict)
            .finish()
    }
}

impl Configuration {
    /// Labels are used as member names as-is; unknown members are ignored.
    #[must_use]
    pub fn new() -> Configuration {
        Configuration {
            member_names: None,
            strict: false,
        }
    }

    /// Derive member names from labels with `transform`, e.g. [`snake_case`].
    #[must_use]
    pub fn with_member_names(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Configuration {
        self.member_names = Some(Arc::new(transform));
        self
    }

    /// Reject objects with members no label maps to.
    #[must_use]
    pub fn with_strict_decoding(mut self, strict: bool) -> Configuration {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn member_name(&self, label: &str) -> String {
        match &self.member_names {
            Some(transform) => transform(label),
            None => label.to_string(),
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn finish<T: 'static, const N: usize>(
        &self,
        decoder: Decoder<T>,
        names: [String; N],
    ) -> Decoder<T> {
        if self.strict {
            Decoder::new(Strict {
                inner: decoder,
                known: names.into_iter().collect(),
            })
        } else {
            decoder
        }
    }
}

/// Split a label into words at separators and case changes: `HTTPServer_url` gives
/// `HTTP`, `Server`, `url`.
fn words(label: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = label.char_indices().collect();
    let mut start = None;
    for (position, &(offset, ch)) in chars.iter().enumerate() {
        if matches!(ch, '_' | '-' | ' ') {
            if let Some(begin) = start.take() {
                words.push(&label[begin..offset]);
            }
            continue;
        }
        if let Some(begin) = start {
            let previous = chars[position - 1].1;
            let next = chars.get(position + 1).map(|&(_, ch)| ch);
            let boundary = ch.is_uppercase()
                && (previous.is_lowercase()
                    || previous.is_ascii_digit()
                    || (previous.is_uppercase() && next.is_some_and(char::is_lowercase)));
            if boundary {
                words.push(&label[begin..offset]);
                start = Some(offset);
            }
        } else {
            start = Some(offset);
        }
    }
    if let Some(begin) = start {
        words.push(&label[begin..]);
    }
    words
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `userName` → `user_name`
#[must_use]
pub fn snake_case(label: &str) -> String {
    words(label)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `userName` → `user-name`
#[must_use]
pub fn kebab_case(label: &str) -> String {
    words(label)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// `userName` → `USER_NAME`
#[must_use]
pub fn screaming_snake_case(label: &str) -> String {
    words(label)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `user_name` → `UserName`
#[must_use]
pub fn pascal_case(label: &str) -> String {
    words(label).iter().map(|word| capitalized(word)).collect()
}

/// `user_name` → `userName`
#[must_use]
pub fn camel_case(label: &str) -> String {
    let mut output = String::with_capacity(label.len());
    for (idx, word) in words(label).iter().enumerate() {
        if idx == 0 {
            output.push_str(&word.to_lowercase());
        } else {
            output.push_str(&capitalized(word));
        }
    }
    output
}

/// Rejects members outside the known set once the wrapped decoder ran.
struct Strict<T> {
    inner: Decoder<T>,
    known: AHashSet<String>,
}

impl<T> Strict<T> {
    fn leftover(&self, cursor: &Cursor<'_>) -> DecodeResult<()> {
        let Some(keys) = cursor.keys() else {
            return Ok(());
        };
        let leftover: Vec<&str> = keys.filter(|key| !self.known.contains(*key)).collect();
        if leftover.is_empty() {
            Ok(())
        } else {
            Err(DecodingFailure::custom(
                format!("Leftover keys: {}", leftover.join(", ")),
                cursor.history().clone(),
            ))
        }
    }
}

impl<T: 'static> Decode<T> for Strict<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let value = self.inner.decode(cursor)?;
        self.leftover(cursor)?;
        Ok(value)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        let result = self.inner.decode_accumulating(cursor);
        match (result, self.leftover(cursor)) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(failure)) => Err(failure.into()),
            (Err(failures), Ok(())) => Err(failures),
            (Err(mut failures), Err(failure)) => {
                failures.push(failure);
                Err(failures)
            }
        }
    }
}

macro_rules! for_products {
    ($($name:ident, $name_with:ident, $len:literal: ($($ty:ident $idx:tt),+) as $nested:pat_param => ($($arg:ident),+);)+) => {
        $(
            #[doc = concat!("Decode an object with ", stringify!($len), " labelled fields and combine them with `constructor`.")]
            pub fn $name<$($ty,)+ Out, Ctor>(labels: [&str; $len], constructor: Ctor) -> Decoder<Out>
            where
                $($ty: FromJson,)+
                Out: 'static,
                Ctor: Fn($($ty),+) -> Out + Send + Sync + 'static,
            {
                $name_with(&Configuration::new(), labels, constructor)
            }

            #[doc = concat!("Like [`", stringify!($name), "`], with member names and strictness taken from `config`.")]
            pub fn $name_with<$($ty,)+ Out, Ctor>(
                config: &Configuration,
                labels: [&str; $len],
                constructor: Ctor,
            ) -> Decoder<Out>
            where
                $($ty: FromJson,)+
                Out: 'static,
                Ctor: Fn($($ty),+) -> Out + Send + Sync + 'static,
            {
                let names = labels.map(|label| config.member_name(label));
                let fields = product!($($ty::decoder().at(names[$idx].clone())),+);
                config.finish(fields.map(move |$nested| constructor($($arg),+)), names)
            }
        )+
    };
}

for_products! {
    for_product1, for_product1_with, 1: (T1 0) as a => (a);
    for_product2, for_product2_with, 2: (T1 0, T2 1) as (a, b) => (a, b);
    for_product3, for_product3_with, 3: (T1 0, T2 1, T3 2) as ((a, b), c) => (a, b, c);
    for_product4, for_product4_with, 4: (T1 0, T2 1, T3 2, T4 3)
        as (((a, b), c), d) => (a, b, c, d);
    for_product5, for_product5_with, 5: (T1 0, T2 1, T3 2, T4 3, T5 4)
        as ((((a, b), c), d), e) => (a, b, c, d, e);
    for_product6, for_product6_with, 6: (T1 0, T2 1, T3 2, T4 3, T5 4, T6 5)
        as (((((a, b), c), d), e), f) => (a, b, c, d, e, f);
    for_product7, for_product7_with, 7: (T1 0, T2 1, T3 2, T4 3, T5 4, T6 5, T7 6)
        as ((((((a, b), c), d), e), f), g) => (a, b, c, d, e, f, g);
    for_product8, for_product8_with, 8: (T1 0, T2 1, T3 2, T4 3, T5 4, T6 5, T7 6, T8 7)
        as (((((((a, b), c), d), e), f), g), h) => (a, b, c, d, e, f, g, h);
}

/// Decode an externally tagged union: an object whose single member names the variant.
///
/// Variants are tried in the given order; the first one present in the object is
/// decoded from that member.
#[must_use]
pub fn tagged<T: 'static>(variants: Vec<(&str, Decoder<T>)>) -> Decoder<T> {
    tagged_with(&Configuration::new(), variants)
}

/// Like [`tagged`], with variant names mapped through `config`.
#[must_use]
pub fn tagged_with<T: 'static>(config: &Configuration, variants: Vec<(&str, Decoder<T>)>) -> Decoder<T> {
    Decoder::new(Tagged {
        variants: variants
            .into_iter()
            .map(|(name, decoder)| (config.member_name(name), decoder))
            .collect(),
    })
}

struct Tagged<T> {
    variants: Vec<(String, Decoder<T>)>,
}

impl<T> Tagged<T> {
    fn select<'a>(&self, cursor: &Cursor<'a>) -> DecodeResult<(&Decoder<T>, Cursor<'a>)> {
        let value = cursor.focused()?;
        let Some(object) = value.as_object() else {
            return Err(DecodingFailure::wrong_type(
                "object",
                value,
                cursor.history().clone(),
            ));
        };
        self.variants
            .iter()
            .find(|(name, _)| object.contains_key(name))
            .map(|(name, decoder)| (decoder, cursor.down_field(name)))
            .ok_or_else(|| {
                let names: Vec<&str> = self.variants.iter().map(|(name, _)| name.as_str()).collect();
                DecodingFailure::custom(
                    format!("No known variant present, expected one of: {}", names.join(", ")),
                    cursor.history().clone(),
                )
            })
    }
}

impl<T: 'static> Decode<T> for Tagged<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        let (decoder, variant) = self.select(cursor)?;
        decoder.decode(&variant)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        let (decoder, variant) = self.select(cursor)?;
        decoder.decode_accumulating(&variant)
    }
}
