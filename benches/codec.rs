use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transit::{from_str, to_string, transit, Value};

fn sample_document() -> Value {
    let row = transit!({
        "name" => "JW",
        "town" => "Enschede",
        "status" => "active",
        "score" => 97.5
    });
    Value::Array((0..100).map(|_| row.clone()).collect())
}

fn bench_write(c: &mut Criterion) {
    let doc = sample_document();
    c.bench_function("write_cached_document", |b| {
        b.iter(|| to_string(black_box(&doc)).unwrap())
    });

    let keywords = Value::Array((0..500).map(|i| Value::keyword(format!("kw{i}"))).collect());
    c.bench_function("write_keywords", |b| {
        b.iter(|| to_string(black_box(&keywords)).unwrap())
    });
}

fn bench_read(c: &mut Criterion) {
    let json = to_string(&sample_document()).unwrap();
    c.bench_function("read_cached_document", |b| {
        b.iter(|| from_str(black_box(&json)).unwrap())
    });
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
