use crate::{decoder::Decoder, error::Failures};
use serde_json::Value;

#[track_caller]
fn accumulated<T: std::fmt::Debug + 'static>(decoder: &Decoder<T>, instance: &Value) -> Failures {
    match decoder.decode_json_accumulating(instance) {
        Ok(value) => panic!("{instance} should not decode, got {value:?}"),
        Err(failures) => failures,
    }
}

/// Assert the paths of all accumulated failures, in order.
#[track_caller]
pub(crate) fn assert_failure_paths<T: std::fmt::Debug + 'static>(
    decoder: &Decoder<T>,
    instance: &Value,
    expected: &[&str],
) {
    let paths: Vec<String> = accumulated(decoder, instance)
        .iter()
        .map(|failure| failure.path())
        .collect();
    assert_eq!(paths, expected, "Failure paths for {instance}");
}

/// Assert the messages of all accumulated failures, in order.
#[track_caller]
pub(crate) fn assert_messages<T: std::fmt::Debug + 'static>(
    decoder: &Decoder<T>,
    instance: &Value,
    expected: &[&str],
) {
    let messages: Vec<String> = accumulated(decoder, instance)
        .iter()
        .map(|failure| failure.message())
        .collect();
    assert_eq!(messages, expected, "Failure messages for {instance}");
}

/// Assert that fail-fast decoding reports the first accumulated failure.
#[track_caller]
pub(crate) fn assert_modes_agree<T: std::fmt::Debug + PartialEq + 'static>(
    decoder: &Decoder<T>,
    instance: &Value,
) {
    match (
        decoder.decode_json(instance),
        decoder.decode_json_accumulating(instance),
    ) {
        (Ok(left), Ok(right)) => assert_eq!(left, right),
        (Err(failure), Err(failures)) => assert_eq!(&failure, failures.first()),
        (left, right) => panic!("Modes disagree on {instance}: {left:?} vs {right:?}"),
    }
}
