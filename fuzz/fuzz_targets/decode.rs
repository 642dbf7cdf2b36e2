#![no_main]
use std::collections::BTreeMap;

use jsondecode::{decoders, product::for_product3, Decoder, FromJson};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

#[derive(Debug, PartialEq)]
enum Node {
    Number(f64),
    Text(String),
    List(Vec<Node>),
}

fn node() -> Decoder<Node> {
    Decoder::recursive(|node| {
        f64::decoder()
            .map(Node::Number)
            .or(String::decoder().map(Node::Text))
            .or(decoders::vec(node).map(Node::List))
    })
}

type Record = (Option<u32>, Vec<i16>, BTreeMap<String, bool>);

fn record() -> Decoder<Record> {
    for_product3(["id", "values", "flags"], |id, values, flags| (id, values, flags))
}

fn check<T: std::fmt::Debug + PartialEq + 'static>(decoder: &Decoder<T>, value: &Value) {
    let fail_fast = decoder.decode_json(value);
    let accumulating = decoder.decode_json_accumulating(value);
    match (fail_fast, accumulating) {
        (Ok(left), Ok(right)) => assert_eq!(left, right),
        (Err(failure), Err(failures)) => assert_eq!(&failure, failures.first()),
        (left, right) => panic!("Modes disagree: {left:?} vs {right:?}"),
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        check(&node(), &value);
        check(&record(), &value);
    }
});
