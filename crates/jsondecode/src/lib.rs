//! # jsondecode
//!
//! Cursor-based decoding of JSON documents into Rust values.
//!
//! A [`Decoder`] reads a value through a [`Cursor`], which records every navigation step
//! in a [`History`]. Each decoder can run in two modes:
//!
//! - **Fail-fast** ([`Decoder::decode_json`]) stops at the first failure.
//! - **Accumulating** ([`Decoder::decode_json_accumulating`]) reports every independent
//!   failure: all failing fields of a record, all failing elements of an array, all
//!   failing refinements of a value.
//!
//! Every [`DecodingFailure`] carries the path to the position that failed.
//!
//! ```rust
//! use jsondecode::{decoders, Decoder, FromJson};
//! use serde_json::json;
//!
//! let decoder: Decoder<Vec<u8>> = decoders::vec(u8::decoder().ensure(|n| *n > 0, "Must be positive"))
//!     .at("values");
//!
//! assert_eq!(decoder.decode_json(&json!({"values": [1, 2]})), Ok(vec![1, 2]));
//!
//! let failures = decoder
//!     .decode_json_accumulating(&json!({"values": [0, "x", 3]}))
//!     .unwrap_err();
//! let paths: Vec<String> = failures.iter().map(|failure| failure.path()).collect();
//! assert_eq!(paths, [".values[0]", ".values[1]"]);
//! ```

/// Combine decoders pairwise from the left: `a.product(b).product(c)`.
macro_rules! product {
    ($first:expr $(, $rest:expr)*) => {
        $first $(.product($rest))*
    };
}

mod cursor;
mod decoder;
pub mod decoders;
mod error;
mod history;
pub mod product;
mod state;
pub mod tracing;
pub mod value;

pub use cursor::Cursor;
pub use decoder::{Checked, Decode, Decoder, Either};
pub use decoders::{FromJson, FromJsonKey};
pub use error::{AccumulatingResult, BasicOutput, DecodeResult, DecodingFailure, Failures, Reason};
pub use history::{CursorOp, History};
pub use product::Configuration;
pub use serde_json::Value;
pub use state::{FieldState, StateDecoder};

#[cfg(test)]
pub(crate) mod tests_util;
