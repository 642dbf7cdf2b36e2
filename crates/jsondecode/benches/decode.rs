use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jsondecode::{decoders, product::for_product3, Decoder, FromJson};
use serde_json::{json, Value};

#[derive(Debug)]
#[allow(dead_code)]
struct Item {
    id: u64,
    name: String,
    tags: Vec<String>,
}

fn item() -> Decoder<Item> {
    for_product3(["id", "name", "tags"], |id, name, tags| Item { id, name, tags })
}

fn items(count: usize, valid: bool) -> Value {
    Value::Array(
        (0..count)
            .map(|id| {
                if valid || id % 10 != 0 {
                    json!({"id": id, "name": format!("item-{id}"), "tags": ["a", "b"]})
                } else {
                    json!({"id": -1, "name": null, "tags": [1]})
                }
            })
            .collect(),
    )
}

fn bench_decode(c: &mut Criterion, name: &str, decoder: &Decoder<Vec<Item>>, instance: &Value) {
    c.bench_with_input(
        BenchmarkId::new("decode", name),
        instance,
        |b, instance| {
            b.iter_with_large_drop(|| decoder.decode_json(instance));
        },
    );
    c.bench_with_input(
        BenchmarkId::new("decode_accumulating", name),
        instance,
        |b, instance| {
            b.iter_with_large_drop(|| decoder.decode_json_accumulating(instance));
        },
    );
}

fn run_benchmarks(c: &mut Criterion) {
    let decoder = decoders::vec(item());
    for count in [10, 1_000] {
        bench_decode(c, &format!("valid/{count}"), &decoder, &items(count, true));
        bench_decode(c, &format!("invalid/{count}"), &decoder, &items(count, false));
    }
}

fn bench_recursive(c: &mut Criterion) {
    let mut document = json!(1);
    for _ in 0..64 {
        document = json!([document, 2]);
    }
    let decoder = Decoder::recursive(|nested: Decoder<u64>| {
        u64::decoder().or(decoders::vec(nested).map(|values| values.iter().sum()))
    });
    c.bench_function("recursive/nested", |b| {
        b.iter(|| decoder.decode_json(&document));
    });
}

criterion_group!(benches, run_benchmarks, bench_recursive);
criterion_main!(benches);
