use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prism_core::{fingerprint, viz, Column, DataType, QueryResult, Value};

fn bench_fingerprint(c: &mut Criterion) {
    c.bench_function("fingerprint", |b| {
        b.iter(|| {
            fingerprint(
                black_box("what were total sales by region last quarter?"),
                black_box("sales"),
                black_box(42),
            )
        })
    });
}

fn bench_select(c: &mut Criterion) {
    let columns = vec![
        Column::new("region", DataType::Text),
        Column::new("amount", DataType::Integer),
        Column::new("product", DataType::Text),
    ];
    let rows: Vec<Vec<Value>> = (0..1_000)
        .map(|i| {
            vec![
                Value::Text(format!("region-{}", i % 7)),
                Value::Integer(i),
                Value::Text(format!("product-{}", i % 31)),
            ]
        })
        .collect();
    let result = QueryResult::ok("SELECT 1", columns, rows);

    c.bench_function("select_wide_mixed", |b| {
        b.iter(|| viz::select(black_box(&result), black_box("sales by region")))
    });
}

criterion_group!(benches, bench_fingerprint, bench_select);
criterion_main!(benches);
