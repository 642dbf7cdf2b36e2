//! Self-referential decoders.
use std::sync::{Arc, OnceLock, Weak};

use crate::{
    cursor::Cursor,
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

use super::{Checked, Decode, Decoder};

type Build<T> = Box<dyn Fn(Decoder<T>) -> Decoder<T> + Send + Sync>;

/// Lazily built decoder shared by the outer handle and every self reference.
struct Cell<T> {
    decoder: OnceLock<Decoder<T>>,
    build: Build<T>,
}

impl<T: 'static> Decoder<T> {
    /// The fixpoint of `f`: a decoder that may refer to itself.
    ///
    /// `f` receives a handle to the decoder being defined and is called exactly once, on
    /// first use, no matter how deep the decoded data nests or how many threads decode
    /// concurrently. The self reference does not keep the decoder alive.
    pub fn recursive<F>(f: F) -> Decoder<T>
    where
        F: Fn(Decoder<T>) -> Decoder<T> + Send + Sync + 'static,
    {
        Decoder::new(Recursive {
            cell: Arc::new(Cell {
                decoder: OnceLock::new(),
                build: Box::new(f),
            }),
        })
    }
}

struct Recursive<T> {
    cell: Arc<Cell<T>>,
}

impl<T: 'static> Recursive<T> {
    fn resolve(&self) -> &Decoder<T> {
        self.cell.decoder.get_or_init(|| {
            let this = Decoder::new(SelfReference {
                cell: Arc::downgrade(&self.cell),
            });
            (self.cell.build)(this)
        })
    }
}

impl<T: 'static> Decode<T> for Recursive<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.resolve().decode(cursor)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.resolve().decode_accumulating(cursor)
    }

    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        self.resolve().decode_checked(cursor)
    }
}

struct SelfReference<T> {
    cell: Weak<Cell<T>>,
}

impl<T: 'static> SelfReference<T> {
    fn with_decoder<R>(
        &self,
        cursor: &Cursor<'_>,
        f: impl FnOnce(&Decoder<T>) -> R,
    ) -> Result<R, DecodingFailure> {
        let cell = self.cell.upgrade();
        match cell.as_deref().and_then(|cell| cell.decoder.get()) {
            Some(decoder) => Ok(f(decoder)),
            None => Err(DecodingFailure::custom(
                "Recursive decoder is not available",
                cursor.history().clone(),
            )),
        }
    }
}

impl<T: 'static> Decode<T> for SelfReference<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.with_decoder(cursor, |decoder| decoder.decode(cursor))?
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.with_decoder(cursor, |decoder| decoder.decode_accumulating(cursor))?
    }

    fn decode_checked(&self, cursor: &Cursor<'_>) -> Checked<T> {
        match self.with_decoder(cursor, |decoder| decoder.decode_checked(cursor)) {
            Ok(checked) => checked,
            Err(failure) => Checked::Invalid(failure.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use crate::{
        decoder::Decoder,
        decoders::{self, FromJson},
    };
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Node {
        value: u32,
        children: Vec<Node>,
    }

    fn tree(counter: &Arc<AtomicUsize>) -> Decoder<Node> {
        let counter = Arc::clone(counter);
        Decoder::recursive(move |node| {
            counter.fetch_add(1, Ordering::SeqCst);
            u32::decoder()
                .at("value")
                .product(decoders::vec(node).at("children"))
                .map(|(value, children)| Node { value, children })
        })
    }

    #[test]
    fn built_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let decoder = tree(&counter);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let document = json!({
            "value": 1,
            "children": [
                {"value": 2, "children": [{"value": 3, "children": []}]},
                {"value": 4, "children": []}
            ]
        });
        let node = decoder.decode_json(&document).expect("Valid tree");
        assert_eq!(node.children[0].children[0].value, 3);
        assert!(decoder.decode_json_accumulating(&document).is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn nested_failures_have_full_paths() {
        let counter = Arc::new(AtomicUsize::new(0));
        let decoder = tree(&counter);
        let document = json!({
            "value": 1,
            "children": [{"value": "x", "children": [{"children": []}]}]
        });
        let failures = decoder
            .decode_json_accumulating(&document)
            .expect_err("Invalid tree");
        let paths: Vec<_> = failures.iter().map(|failure| failure.path()).collect();
        assert_eq!(
            paths,
            [".children[0].value", ".children[0].children[0].value"]
        );
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let decoder = tree(&counter);
        let document = json!({"value": 1, "children": [{"value": 2, "children": []}]});
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert!(decoder.decode_json(&document).is_ok());
                });
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
