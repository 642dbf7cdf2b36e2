//! Maps decoded from JSON objects.
use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
    sync::Arc,
};

use serde_json::{Map, Value};

use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

use super::{collections::collect_all, FromJson};

/// Types that can be parsed from an object key.
pub trait FromJsonKey: Sized + 'static {
    fn from_key(key: &str) -> Option<Self>;
}

impl FromJsonKey for String {
    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

impl FromJsonKey for char {
    fn from_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

macro_rules! parsed_keys {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromJsonKey for $ty {
                fn from_key(key: &str) -> Option<Self> {
                    key.parse().ok()
                }
            }
        )*
    };
}

parsed_keys!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

type KeyParser<K> = Arc<dyn Fn(&str) -> Option<K> + Send + Sync>;

/// Decode an object into `M`, parsing keys with [`FromJsonKey`].
#[must_use]
pub fn map<K, V, M>(values: Decoder<V>) -> Decoder<M>
where
    K: FromJsonKey,
    V: 'static,
    M: FromIterator<(K, V)> + 'static,
{
    map_with(K::from_key, values)
}

/// Decode an object into `M`, parsing keys with `keys`.
///
/// A key that `keys` rejects fails with `Could not decode key: <key>` at that entry.
pub fn map_with<K, V, M, F>(keys: F, values: Decoder<V>) -> Decoder<M>
where
    K: 'static,
    V: 'static,
    M: FromIterator<(K, V)> + 'static,
    F: Fn(&str) -> Option<K> + Send + Sync + 'static,
{
    Decoder::new(Entries {
        keys: Arc::new(keys),
        values,
        _map: PhantomData,
    })
}

struct Entries<K, V, M> {
    keys: KeyParser<K>,
    values: Decoder<V>,
    _map: PhantomData<fn() -> M>,
}

fn object<'a>(cursor: &Cursor<'a>) -> DecodeResult<&'a Map<String, Value>> {
    let value = cursor.focused()?;
    value.as_object().ok_or_else(|| {
        DecodingFailure::wrong_type("object", value, cursor.history().clone())
    })
}

impl<K: 'static, V: 'static, M> Entries<K, V, M> {
    fn key(&self, key: &str, entry: &Cursor<'_>) -> DecodeResult<K> {
        (self.keys)(key).ok_or_else(|| {
            DecodingFailure::custom(
                format!("Could not decode key: {key}"),
                entry.history().clone(),
            )
        })
    }

    fn entry(&self, key: &str, entry: &Cursor<'_>) -> DecodeResult<(K, V)> {
        Ok((self.key(key, entry)?, self.values.decode(entry)?))
    }

    fn entry_accumulating(&self, key: &str, entry: &Cursor<'_>) -> AccumulatingResult<(K, V)> {
        let key = self.key(key, entry)?;
        Ok((key, self.values.decode_accumulating(entry)?))
    }
}

impl<K, V, M> Decode<M> for Entries<K, V, M>
where
    K: 'static,
    V: 'static,
    M: FromIterator<(K, V)>,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<M> {
        object(cursor)?
            .keys()
            .map(|key| self.entry(key, &cursor.down_field(key)))
            .collect()
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<M> {
        collect_all(
            object(cursor)?
                .keys()
                .map(|key| self.entry_accumulating(key, &cursor.down_field(key))),
        )
    }
}

impl<K: FromJsonKey + Ord, V: FromJson> FromJson for BTreeMap<K, V> {
    fn decoder() -> Decoder<Self> {
        map(V::decoder())
    }
}

impl<K, V, S> FromJson for HashMap<K, V, S>
where
    K: FromJsonKey + Eq + Hash,
    V: FromJson,
    S: BuildHasher + Default + 'static,
{
    fn decoder() -> Decoder<Self> {
        map(V::decoder())
    }
}
