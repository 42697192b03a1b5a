use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tablrs::functions::{col, count_all, dense_rank, desc, lit, sum};
use tablrs::{ColumnType, JoinSpec, Schema, SortKey, Table, Value, WindowSpec};

const CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Furniture", "Grocery"];
const CITIES: [&str; 5] = ["Bangalore", "Mumbai", "Delhi", "Chennai", "Pune"];

fn orders(rows: usize) -> Table {
    let schema = Schema::from_pairs(&[
        ("order_id", ColumnType::Int64),
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
        ("city", ColumnType::String),
    ])
    .unwrap();
    let data = (0..rows)
        .map(|i| {
            vec![
                Value::from(i as i64),
                Value::from(CATEGORIES[i % CATEGORIES.len()]),
                Value::from(((i * 7919) % 5000) as i64),
                Value::from(CITIES[(i / 3) % CITIES.len()]),
            ]
        })
        .collect();
    Table::from_rows(schema, data).unwrap()
}

fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");
    for size in [1_000, 100_000] {
        let table = orders(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, t| {
            b.iter(|| {
                t.group_by(&["category"])
                    .agg(vec![sum("amount"), count_all()])
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let table = orders(100_000);
    let running = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![SortKey::asc("order_id")])
        .rows_to_current_row();
    let ranking = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![desc("amount")]);

    c.bench_function("window_running_sum_100k", |b| {
        b.iter(|| {
            table
                .with_window_column("running_total", sum("amount"), black_box(&running))
                .unwrap()
        })
    });
    c.bench_function("window_dense_rank_100k", |b| {
        b.iter(|| {
            table
                .with_window_column("rank", dense_rank(), black_box(&ranking))
                .unwrap()
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let table = orders(100_000);
    let predicate = col("amount").gt(lit(2000));
    c.bench_function("filter_100k", |b| {
        b.iter(|| table.filter(black_box(&predicate)).unwrap())
    });
}

fn bench_self_join(c: &mut Criterion) {
    let table = orders(2_000);
    let spec = JoinSpec::new()
        .on("city", "city")
        .aliases("a", "b")
        .exclude(col("a.order_id").eq(col("b.order_id")));
    c.bench_function("self_join_2k", |b| {
        b.iter(|| table.self_join(black_box(&spec)).unwrap())
    });
}

criterion_group!(benches, bench_group_by, bench_window, bench_filter, bench_self_join);
criterion_main!(benches);
