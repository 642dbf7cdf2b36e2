//! Immutable, history-tracking navigation over a JSON document.
use core::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::{
    decoder::Decoder,
    decoders::FromJson,
    error::{DecodeResult, DecodingFailure},
    history::{CursorOp, History},
    value::JsonType,
};

const FAILED_CURSOR: &str = "Attempt to decode value on failed cursor";

/// A pointer into a borrowed JSON document together with the steps taken to reach it.
///
/// Every navigation method returns a new cursor and records its step, whether or not the
/// target exists. Navigating away from a failed cursor keeps the original failure and
/// keeps recording steps, so the history always describes the full attempted path.
#[derive(Clone)]
pub struct Cursor<'a> {
    focus: Focus<'a>,
    history: History,
}

#[derive(Clone)]
enum Focus<'a> {
    Value {
        value: &'a Value,
        frame: Option<Rc<Frame<'a>>>,
    },
    Failed(Fault<'a>),
}

/// Position of a focused value inside its parent container.
struct Frame<'a> {
    container: &'a Value,
    slot: Slot<'a>,
    parent: Option<Rc<Frame<'a>>>,
}

#[derive(Clone, Copy)]
enum Slot<'a> {
    Key(&'a str),
    Index(usize),
}

/// Why the cursor lost its focus.
#[derive(Clone, Copy)]
enum Fault<'a> {
    MissingField,
    ExpectedObject(&'a Value),
    ExpectedArray(&'a Value),
    InvalidMove,
}

impl<'a> Cursor<'a> {
    /// A cursor focused on the root of `value`.
    #[must_use]
    pub fn new(value: &'a Value) -> Cursor<'a> {
        Cursor {
            focus: Focus::Value { value, frame: None },
            history: History::new(),
        }
    }

    /// The focused value, or `None` for a failed cursor.
    #[must_use]
    pub fn value(&self) -> Option<&'a Value> {
        match &self.focus {
            Focus::Value { value, .. } => Some(*value),
            Focus::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn focus(&self) -> Option<&'a Value> {
        self.value()
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.focus, Focus::Value { .. })
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The focused value, or the failure describing why there is none.
    ///
    /// # Errors
    ///
    /// Returns the cursor's failure if it lost its focus.
    pub fn focused(&self) -> DecodeResult<&'a Value> {
        match &self.focus {
            Focus::Value { value, .. } => Ok(*value),
            Focus::Failed(fault) => Err(self.fault_to_failure(*fault)),
        }
    }

    /// Describe a failed cursor. `None` if the cursor has a focus.
    #[must_use]
    pub fn failure(&self) -> Option<DecodingFailure> {
        match &self.focus {
            Focus::Value { .. } => None,
            Focus::Failed(fault) => Some(self.fault_to_failure(*fault)),
        }
    }

    /// Whether the cursor failed because a field was absent from an object.
    #[must_use]
    pub fn is_missing_field(&self) -> bool {
        matches!(self.focus, Focus::Failed(Fault::MissingField))
    }

    fn fault_to_failure(&self, fault: Fault<'a>) -> DecodingFailure {
        let history = self.history.clone();
        match fault {
            Fault::MissingField => DecodingFailure::missing_field(history),
            Fault::ExpectedObject(actual) => DecodingFailure::wrong_type("object", actual, history),
            Fault::ExpectedArray(actual) => DecodingFailure::wrong_type("array", actual, history),
            Fault::InvalidMove => DecodingFailure::custom(FAILED_CURSOR, history),
        }
    }

    /// Keys of the focused object in document order.
    #[must_use]
    pub fn keys(&self) -> Option<impl Iterator<Item = &'a str>> {
        match self.value()? {
            Value::Object(map) => Some(map.keys().map(String::as_str)),
            _ => None,
        }
    }

    /// Position of the focus inside its parent array.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match &self.focus {
            Focus::Value {
                frame: Some(frame), ..
            } => match frame.slot {
                Slot::Index(index) => Some(index),
                Slot::Key(_) => None,
            },
            _ => None,
        }
    }

    /// Name of the focus inside its parent object.
    #[must_use]
    pub fn key(&self) -> Option<&'a str> {
        match &self.focus {
            Focus::Value {
                frame: Some(frame), ..
            } => match frame.slot {
                Slot::Key(key) => Some(key),
                Slot::Index(_) => None,
            },
            _ => None,
        }
    }

    fn step<F>(&self, op: CursorOp, navigate: F) -> Cursor<'a>
    where
        F: FnOnce(&'a Value, &Option<Rc<Frame<'a>>>) -> Result<Focus<'a>, Fault<'a>>,
    {
        let history = self.history.with(op);
        let focus = match &self.focus {
            Focus::Value { value, frame } => navigate(*value, frame).unwrap_or_else(Focus::Failed),
            Focus::Failed(fault) => Focus::Failed(*fault),
        };
        Cursor { focus, history }
    }

    #[must_use]
    pub fn down_field(&self, name: &str) -> Cursor<'a> {
        self.step(CursorOp::DownField(name.to_string()), |value, frame| {
            match value {
                Value::Object(map) => match map.get_key_value(name) {
                    Some((key, child)) => Ok(Focus::Value {
                        value: child,
                        frame: Some(Rc::new(Frame {
                            container: value,
                            slot: Slot::Key(key.as_str()),
                            parent: frame.clone(),
                        })),
                    }),
                    None => Err(Fault::MissingField),
                },
                _ => Err(Fault::ExpectedObject(value)),
            }
        })
    }

    #[must_use]
    pub fn down_array(&self) -> Cursor<'a> {
        self.step(CursorOp::DownArray, |value, frame| {
            element(value, frame.clone(), 0)
        })
    }

    #[must_use]
    pub fn down_n(&self, n: usize) -> Cursor<'a> {
        self.step(CursorOp::DownN(n), |value, frame| {
            element(value, frame.clone(), n)
        })
    }

    #[must_use]
    pub fn up(&self) -> Cursor<'a> {
        self.step(CursorOp::MoveUp, |_, frame| match frame {
            Some(frame) => Ok(Focus::Value {
                value: frame.container,
                frame: frame.parent.clone(),
            }),
            None => Err(Fault::InvalidMove),
        })
    }

    #[must_use]
    pub fn left(&self) -> Cursor<'a> {
        self.step(CursorOp::MoveLeft, |_, frame| match frame.as_deref() {
            Some(frame) => match frame.slot {
                Slot::Index(index) if index > 0 => {
                    element(frame.container, frame.parent.clone(), index - 1)
                }
                _ => Err(Fault::InvalidMove),
            },
            None => Err(Fault::InvalidMove),
        })
    }

    #[must_use]
    pub fn right(&self) -> Cursor<'a> {
        self.step(CursorOp::MoveRight, |_, frame| match frame.as_deref() {
            Some(frame) => match frame.slot {
                Slot::Index(index) => element(frame.container, frame.parent.clone(), index + 1),
                Slot::Key(_) => Err(Fault::InvalidMove),
            },
            None => Err(Fault::InvalidMove),
        })
    }

    /// Move to a sibling field of the current object member.
    #[must_use]
    pub fn field(&self, name: &str) -> Cursor<'a> {
        self.step(CursorOp::Field(name.to_string()), |_, frame| {
            let Some(frame) = frame.as_deref() else {
                return Err(Fault::InvalidMove);
            };
            let (Slot::Key(_), Value::Object(map)) = (frame.slot, frame.container) else {
                return Err(Fault::InvalidMove);
            };
            match map.get_key_value(name) {
                Some((key, child)) => Ok(Focus::Value {
                    value: child,
                    frame: Some(Rc::new(Frame {
                        container: frame.container,
                        slot: Slot::Key(key.as_str()),
                        parent: frame.parent.clone(),
                    })),
                }),
                None => Err(Fault::MissingField),
            }
        })
    }

    /// Move to the root of the document.
    #[must_use]
    pub fn root(&self) -> Cursor<'a> {
        self.step(CursorOp::MoveRoot, |value, frame| {
            let mut top = value;
            let mut current = frame.as_deref();
            while let Some(frame) = current {
                top = frame.container;
                current = frame.parent.as_deref();
            }
            Ok(Focus::Value {
                value: top,
                frame: None,
            })
        })
    }

    /// Apply a decoder at this position.
    ///
    /// # Errors
    ///
    /// Returns the decoder's failure.
    pub fn decode_with<T: 'static>(&self, decoder: &Decoder<T>) -> DecodeResult<T> {
        decoder.decode(self)
    }

    /// Decode the focus with the default decoder of `T`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's failure.
    pub fn decode_as<T: FromJson>(&self) -> DecodeResult<T> {
        T::decoder().decode(self)
    }

    /// Decode the field `name` of the focused object.
    ///
    /// # Errors
    ///
    /// Returns the decoder's failure, including a missing field.
    pub fn get<T: FromJson>(&self, name: &str) -> DecodeResult<T> {
        self.down_field(name).decode_as()
    }

    /// Decode the field `name`, falling back to `default` when it is absent or `null`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's failure for a present, non-null field.
    pub fn get_or_else<T: FromJson>(&self, name: &str, default: impl FnOnce() -> T) -> DecodeResult<T> {
        Ok(self.get::<Option<T>>(name)?.unwrap_or_else(default))
    }
}

fn element<'a>(
    container: &'a Value,
    parent: Option<Rc<Frame<'a>>>,
    index: usize,
) -> Result<Focus<'a>, Fault<'a>> {
    match container {
        Value::Array(items) => match items.get(index) {
            Some(item) => Ok(Focus::Value {
                value: item,
                frame: Some(Rc::new(Frame {
                    container,
                    slot: Slot::Index(index),
                    parent,
                })),
            }),
            None => Err(Fault::InvalidMove),
        },
        _ => Err(Fault::ExpectedArray(container)),
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("focus", &self.value().map(JsonType::of))
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;
    use crate::{
        error::Reason,
        history::{CursorOp, History},
    };
    use serde_json::json;

    #[test]
    fn navigation_records_every_step() {
        let document = json!({"a": [1, 2, {"b": true}]});
        let cursor = Cursor::new(&document)
            .down_field("a")
            .down_array()
            .right()
            .right()
            .down_field("b");
        assert_eq!(cursor.value(), Some(&json!(true)));
        assert_eq!(
            cursor.history().to_vec(),
            vec![
                CursorOp::DownField("a".to_string()),
                CursorOp::DownArray,
                CursorOp::MoveRight,
                CursorOp::MoveRight,
                CursorOp::DownField("b".to_string()),
            ]
        );
        assert_eq!(cursor.history().path(), ".a[2].b");
    }

    #[test]
    fn up_left_and_root() {
        let document = json!({"a": [1, 2, 3]});
        let cursor = Cursor::new(&document).down_field("a").down_n(2);
        assert_eq!(cursor.index(), Some(2));
        assert_eq!(cursor.left().value(), Some(&json!(2)));
        assert_eq!(cursor.up().value(), Some(&json!([1, 2, 3])));
        assert_eq!(cursor.up().key(), Some("a"));
        assert_eq!(cursor.root().value(), Some(&document));
        assert!(cursor.right().failed());
        assert!(Cursor::new(&document).up().failed());
    }

    #[test]
    fn sibling_fields() {
        let document = json!({"a": 1, "b": 2});
        let cursor = Cursor::new(&document).down_field("a").field("b");
        assert_eq!(cursor.value(), Some(&json!(2)));
        assert_eq!(cursor.history().path(), ".b");
        assert!(Cursor::new(&document).down_field("a").field("c").is_missing_field());
    }

    #[test]
    fn failed_cursor_keeps_failure_and_history() {
        let document = json!({"a": {}});
        let cursor = Cursor::new(&document)
            .down_field("a")
            .down_field("missing")
            .down_array()
            .down_field("deeper");
        assert!(cursor.failed());
        assert!(cursor.is_missing_field());
        assert_eq!(cursor.history().len(), 4);
        let failure = cursor.failure().expect("Failed cursor");
        assert_eq!(failure.reason(), &Reason::MissingField);
        assert_eq!(failure.path(), ".a.missing[0].deeper");
    }

    #[test]
    fn wrong_shapes() {
        let document = json!({"a": 1});
        let failure = Cursor::new(&document)
            .down_field("a")
            .down_field("b")
            .failure()
            .expect("Failed cursor");
        assert_eq!(
            failure.reason(),
            &Reason::WrongTypeExpectation {
                expected: "object",
                actual: json!(1)
            }
        );
        let failure = Cursor::new(&document)
            .down_array()
            .failure()
            .expect("Failed cursor");
        assert_eq!(
            failure.reason(),
            &Reason::WrongTypeExpectation {
                expected: "array",
                actual: json!({"a": 1})
            }
        );
    }

    #[test]
    fn out_of_bounds() {
        let document = json!([]);
        let cursor = Cursor::new(&document).down_array();
        let failure = cursor.failure().expect("Failed cursor");
        assert_eq!(
            failure.reason(),
            &Reason::CustomReason("Attempt to decode value on failed cursor".to_string())
        );
        assert!(Cursor::new(&json!([1])).down_n(1).failed());
    }

    #[test]
    fn navigation_never_changes_the_document() {
        let document = json!({"a": [1]});
        let root = Cursor::new(&document);
        let _ = root.down_field("a").down_array().right();
        assert_eq!(root.value(), Some(&document));
        assert_eq!(root.history(), &History::new());
    }

    #[test]
    fn typed_access() {
        let document = json!({"name": "x", "age": null});
        let cursor = Cursor::new(&document);
        assert_eq!(cursor.get::<String>("name"), Ok("x".to_string()));
        assert_eq!(cursor.get_or_else("age", || 7_u8), Ok(7));
        assert_eq!(cursor.get_or_else("other", || 8_u8), Ok(8));
        assert!(cursor.get::<u8>("name").is_err());
    }

    #[test]
    fn debug_shows_kind_of_focus() {
        let document = json!({"a": [1]});
        let cursor = Cursor::new(&document).down_field("a");
        assert_eq!(
            format!("{cursor:?}"),
            "Cursor { focus: Some(Array), history: [DownField(\"a\")] }"
        );
        assert_eq!(
            format!("{:?}", cursor.down_field("b")),
            "Cursor { focus: None, history: [DownField(\"a\"), DownField(\"b\")] }"
        );
    }
}
