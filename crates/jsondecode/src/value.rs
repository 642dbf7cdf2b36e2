//! The JSON document model consumed by decoders.
//!
//! Documents are plain [`serde_json::Value`] trees built with the `preserve_order` feature:
//! objects iterate in insertion order while equality ignores key order.
use core::fmt;

pub use serde_json::{Map, Number, Value};

/// The kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl JsonType {
    /// Kind of the given value. Whole numbers stored as `i64`/`u64` report [`JsonType::Integer`].
    #[must_use]
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(number) => {
                if number.is_f64() {
                    JsonType::Number
                } else {
                    JsonType::Integer
                }
            }
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn null() -> Value {
    Value::Null
}

#[must_use]
pub fn from_bool(value: bool) -> Value {
    Value::Bool(value)
}

pub fn from_string(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

#[must_use]
pub fn from_i64(value: i64) -> Value {
    Value::Number(value.into())
}

#[must_use]
pub fn from_u64(value: u64) -> Value {
    Value::Number(value.into())
}

/// Build a number from a float. JSON has no representation for NaN or the infinities,
/// so those yield `None`.
#[must_use]
pub fn from_f64(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

/// Like [`from_f64`], but maps non-finite floats to `null`.
#[must_use]
pub fn from_f64_or_null(value: f64) -> Value {
    from_f64(value).unwrap_or(Value::Null)
}

/// Build an object from key/value pairs. Later duplicates replace earlier ones while
/// keeping the position of the first occurrence.
pub fn obj<K, I>(fields: I) -> Value
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.into(), value);
    }
    Value::Object(map)
}

pub fn arr<I>(items: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    Value::Array(items.into_iter().collect())
}
