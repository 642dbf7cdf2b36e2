//! Fallbacks and recovery.
//!
//! Every alternative is tried on the cursor the combined decoder was given, never on a
//! cursor some failed branch navigated to.
use crate::{
    cursor::Cursor,
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

use super::{Decode, Decoder};

/// One of two decoded alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R> Either<L, R> {
    #[must_use]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    #[must_use]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    pub fn left(self) -> Option<L> {
        match self {
            Either::Left(value) => Some(value),
            Either::Right(_) => None,
        }
    }

    pub fn right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(value) => Some(value),
        }
    }
}

impl<T: 'static> Decoder<T> {
    /// Try this decoder, then `fallback` on the same cursor. When both fail, the
    /// fallback's failure is reported.
    #[must_use]
    pub fn or(self, fallback: Decoder<T>) -> Decoder<T> {
        Decoder::new(Or {
            primary: self,
            fallback,
        })
    }

    /// Try this decoder, then `other` on the same cursor, tagging which one succeeded.
    #[must_use]
    pub fn either<U: 'static>(self, other: Decoder<U>) -> Decoder<Either<T, U>> {
        self.map(Either::Left).or(other.map(Either::Right))
    }

    /// On failure, decode the same cursor with the decoder `f` picks for that failure.
    ///
    /// In accumulating mode `f` receives the first failure.
    pub fn handle_error_with<F>(self, f: F) -> Decoder<T>
    where
        F: Fn(DecodingFailure) -> Decoder<T> + Send + Sync + 'static,
    {
        Decoder::new(HandleErrorWith { inner: self, f })
    }
}

struct Or<T> {
    primary: Decoder<T>,
    fallback: Decoder<T>,
}

impl<T: 'static> Decode<T> for Or<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.primary
            .decode(cursor)
            .or_else(|_| self.fallback.decode(cursor))
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.primary
            .decode_accumulating(cursor)
            .or_else(|_| self.fallback.decode_accumulating(cursor))
    }
}

struct HandleErrorWith<T, F> {
    inner: Decoder<T>,
    f: F,
}

impl<T, F> Decode<T> for HandleErrorWith<T, F>
where
    T: 'static,
    F: Fn(DecodingFailure) -> Decoder<T> + Send + Sync,
{
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.inner
            .decode(cursor)
            .or_else(|failure| (self.f)(failure).decode(cursor))
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.inner
            .decode_accumulating(cursor)
            .or_else(|failures| (self.f)(failures.into_first()).decode_accumulating(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::Either;
    use crate::{
        decoder::Decoder,
        decoders::{self, FromJson},
        error::Reason,
    };
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(1), Ok(1))]
    #[test_case(json!("2"), Ok(2))]
    #[test_case(json!("x"), Err(()))]
    fn or_falls_back(input: serde_json::Value, expected: Result<i64, ()>) {
        let decoder = i64::decoder().or(decoders::string().emap(|text| {
            text.parse::<i64>().map_err(|error| error.to_string())
        }));
        assert_eq!(decoder.decode_json(&input).map_err(|_| ()), expected);
    }

    #[test]
    fn or_retries_on_original_cursor() {
        // The primary decoder fails after descending; the fallback must see the root.
        let decoder = u8::decoder().at("missing").or(u8::decoder().at("present"));
        assert_eq!(decoder.decode_json(&json!({"present": 3})), Ok(3));
        assert_eq!(
            decoder.decode_json_accumulating(&json!({"present": 4})),
            Ok(4)
        );
    }

    #[test]
    fn or_reports_fallback_failure() {
        let decoder = u8::decoder().at("a").or(u8::decoder().at("b"));
        let failure = decoder.decode_json(&json!({})).expect_err("Neither field");
        assert_eq!(failure.path(), ".b");
        assert_eq!(failure.reason(), &Reason::MissingField);
    }

    #[test]
    fn either_tags_alternatives() {
        let decoder = bool::decoder().either(String::decoder());
        assert_eq!(decoder.decode_json(&json!(true)), Ok(Either::Left(true)));
        assert_eq!(
            decoder.decode_json(&json!("x")),
            Ok(Either::Right("x".to_string()))
        );
        assert!(decoder.decode_json(&json!(1)).is_err());
        let value: Either<bool, String> = Either::Right("y".to_string());
        assert!(value.is_right());
        assert_eq!(value.right(), Some("y".to_string()));
    }

    #[test]
    fn handle_error_with_recovers() {
        let decoder = u8::decoder().handle_error_with(|failure| {
            if failure.reason() == &Reason::MissingField {
                Decoder::const_(0)
            } else {
                Decoder::failed(failure)
            }
        });
        let decoder = decoder.at("n");
        assert_eq!(decoder.decode_json(&json!({})), Ok(0));
        assert_eq!(decoder.decode_json_accumulating(&json!({})), Ok(0));
        assert_eq!(decoder.decode_json(&json!({"n": 5})), Ok(5));
        let failure = decoder
            .decode_json(&json!({"n": "x"}))
            .expect_err("Wrong type");
        assert_eq!(failure.path(), ".n");
    }
}
