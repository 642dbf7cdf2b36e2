//! Navigation history recorded by cursors.
//!
//! A [`History`] is a persistent singly linked list of [`CursorOp`]s, most recent first.
//! Cursors derived from the same parent share the common prefix, so recording a step is
//! a single allocation regardless of how long the history already is.
use core::fmt;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A single navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CursorOp {
    /// Move into the named field of an object.
    DownField(String),
    /// Move to the first element of an array.
    DownArray,
    /// Move to the n-th element of an array.
    DownN(usize),
    /// Move to the previous array element.
    MoveLeft,
    /// Move to the next array element.
    MoveRight,
    /// Move to the parent value.
    MoveUp,
    /// Move to a sibling field of the current object member.
    Field(String),
    /// Move to the document root.
    MoveRoot,
}

impl fmt::Display for CursorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorOp::DownField(name) => write!(f, "DownField({name})"),
            CursorOp::DownArray => f.write_str("DownArray"),
            CursorOp::DownN(n) => write!(f, "DownN({n})"),
            CursorOp::MoveLeft => f.write_str("MoveLeft"),
            CursorOp::MoveRight => f.write_str("MoveRight"),
            CursorOp::MoveUp => f.write_str("MoveUp"),
            CursorOp::Field(name) => write!(f, "Field({name})"),
            CursorOp::MoveRoot => f.write_str("MoveRoot"),
        }
    }
}

struct Node {
    op: CursorOp,
    prev: Option<Arc<Node>>,
}

/// Ordered log of navigation steps from the document root, most recent first.
#[derive(Clone, Default)]
pub struct History {
    head: Option<Arc<Node>>,
    len: usize,
}

impl History {
    #[must_use]
    pub const fn new() -> History {
        History { head: None, len: 0 }
    }

    /// Record a step in place. The previous steps stay shared with any clones.
    pub fn push(&mut self, op: CursorOp) {
        let prev = self.head.take();
        self.head = Some(Arc::new(Node { op, prev }));
        self.len += 1;
    }

    /// A copy of this history with one more step.
    #[must_use]
    pub fn with(&self, op: CursorOp) -> History {
        let mut history = self.clone();
        history.push(op);
        history
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recent step.
    #[must_use]
    pub fn last(&self) -> Option<&CursorOp> {
        self.head.as_deref().map(|node| &node.op)
    }

    /// Iterate over steps, most recent first.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    /// Steps in the order they were taken.
    #[must_use]
    pub fn to_vec(&self) -> Vec<CursorOp> {
        let mut ops: Vec<CursorOp> = self.iter().cloned().collect();
        ops.reverse();
        ops
    }

    /// Render the history as a selection path, e.g. `.outer[0].missing`.
    ///
    /// Steps that do not select anything (like `MoveLeft` before the first element) are
    /// rendered as `{MoveLeft}`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut output = String::new();
        let mut buffer = itoa::Buffer::new();
        for selection in self.selections() {
            match selection {
                Selection::Field(name) => {
                    output.push('.');
                    output.push_str(name);
                }
                Selection::Index(index) => {
                    output.push('[');
                    output.push_str(buffer.format(index));
                    output.push(']');
                }
                Selection::Op(op) => {
                    output.push('{');
                    output.push_str(&op.to_string());
                    output.push('}');
                }
            }
        }
        output
    }

    /// Render the history as a JSON Pointer (RFC 6901), e.g. `/outer/0/missing`.
    ///
    /// Steps that do not select anything are skipped.
    #[must_use]
    pub fn pointer(&self) -> String {
        let mut output = String::new();
        let mut buffer = itoa::Buffer::new();
        for selection in self.selections() {
            match selection {
                Selection::Field(name) => {
                    output.push('/');
                    write_escaped(&mut output, name);
                }
                Selection::Index(index) => {
                    output.push('/');
                    output.push_str(buffer.format(index));
                }
                Selection::Op(_) => {}
            }
        }
        output
    }

    fn selections(&self) -> Vec<Selection<'_>> {
        let mut chronological: Vec<&CursorOp> = self.iter().collect();
        chronological.reverse();
        let mut selections: Vec<Selection<'_>> = Vec::with_capacity(chronological.len());
        for op in chronological {
            match op {
                CursorOp::DownField(name) => selections.push(Selection::Field(name)),
                CursorOp::DownArray => selections.push(Selection::Index(0)),
                CursorOp::DownN(n) => selections.push(Selection::Index(*n)),
                CursorOp::MoveRight => match selections.last_mut() {
                    Some(Selection::Index(index)) => *index += 1,
                    _ => selections.push(Selection::Op(op)),
                },
                CursorOp::MoveLeft => match selections.last_mut() {
                    Some(Selection::Index(index)) if *index > 0 => *index -= 1,
                    _ => selections.push(Selection::Op(op)),
                },
                CursorOp::MoveUp => {
                    if selections.pop().is_none() {
                        selections.push(Selection::Op(op));
                    }
                }
                CursorOp::Field(name) => {
                    if matches!(selections.last(), Some(Selection::Field(_))) {
                        selections.pop();
                        selections.push(Selection::Field(name));
                    } else {
                        selections.push(Selection::Op(op));
                    }
                }
                CursorOp::MoveRoot => selections.clear(),
            }
        }
        selections
    }
}

enum Selection<'h> {
    Field(&'h str),
    Index(usize),
    Op(&'h CursorOp),
}

fn write_escaped(output: &mut String, segment: &str) {
    for ch in segment.chars() {
        match ch {
            '~' => output.push_str("~0"),
            '/' => output.push_str("~1"),
            _ => output.push(ch),
        }
    }
}

// Long histories would otherwise be dropped through one nested call per node.
impl Drop for History {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let mut left = self.head.as_ref();
        let mut right = other.head.as_ref();
        while let (Some(l), Some(r)) = (left, right) {
            if Arc::ptr_eq(l, r) {
                return true;
            }
            if l.op != r.op {
                return false;
            }
            left = l.prev.as_ref();
            right = r.prev.as_ref();
        }
        true
    }
}

impl Eq for History {}

impl Hash for History {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for op in self {
            op.hash(state);
        }
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Builds a history from steps given in the order they were taken.
impl FromIterator<CursorOp> for History {
    fn from_iter<I: IntoIterator<Item = CursorOp>>(iter: I) -> Self {
        let mut history = History::new();
        for op in iter {
            history.push(op);
        }
        history
    }
}

impl<'h> IntoIterator for &'h History {
    type Item = &'h CursorOp;
    type IntoIter = Iter<'h>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`History`], most recent step first.
pub struct Iter<'h> {
    next: Option<&'h Node>,
    remaining: usize,
}

impl<'h> Iterator for Iter<'h> {
    type Item = &'h CursorOp;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.prev.as_deref();
        self.remaining -= 1;
        Some(&node.op)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
