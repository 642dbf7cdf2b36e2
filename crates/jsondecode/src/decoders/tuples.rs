//! Tuples decoded from arrays of exactly matching length.
use crate::{
    cursor::Cursor,
    decoder::{Decode, Decoder},
    error::{AccumulatingResult, DecodeResult, DecodingFailure},
};

use super::{collections::items, FromJson};

struct Tuple<T> {
    len: usize,
    elements: Decoder<T>,
}

impl<T> Tuple<T> {
    fn check_len(&self, cursor: &Cursor<'_>) -> DecodeResult<()> {
        let len = items(cursor)?.len();
        if len == self.len {
            Ok(())
        } else {
            Err(DecodingFailure::custom(
                format!("Expected an array of {} elements, got {len}", self.len),
                cursor.history().clone(),
            ))
        }
    }
}

impl<T: 'static> Decode<T> for Tuple<T> {
    fn decode_cursor(&self, cursor: &Cursor<'_>) -> DecodeResult<T> {
        self.check_len(cursor)?;
        self.elements.decode(cursor)
    }

    fn decode_cursor_accumulating(&self, cursor: &Cursor<'_>) -> AccumulatingResult<T> {
        self.check_len(cursor)?;
        self.elements.decode_accumulating(cursor)
    }
}

macro_rules! tuple_decoders {
    ($($len:literal: ($($ty:ident $idx:tt),+) as $nested:pat_param => $flat:expr;)+) => {
        $(
            impl<$($ty: FromJson),+> FromJson for ($($ty,)+) {
                fn decoder() -> Decoder<Self> {
                    let elements = product!($(
                        $ty::decoder().prepare(|cursor| cursor.down_n($idx))
                    ),+);
                    Decoder::new(Tuple {
                        len: $len,
                        elements: elements.map(|$nested| $flat),
                    })
                }
            }
        )+
    };
}

tuple_decoders! {
    1: (A 0) as a => (a,);
    2: (A 0, B 1) as (a, b) => (a, b);
    3: (A 0, B 1, C 2) as ((a, b), c) => (a, b, c);
    4: (A 0, B 1, C 2, D 3) as (((a, b), c), d) => (a, b, c, d);
    5: (A 0, B 1, C 2, D 3, E 4) as ((((a, b), c), d), e) => (a, b, c, d, e);
    6: (A 0, B 1, C 2, D 3, E 4, F 5) as (((((a, b), c), d), e), f) => (a, b, c, d, e, f);
}
