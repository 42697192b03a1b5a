//! The full sales analysis pipeline over the sample orders

mod common;

use common::{int_column, str_column};
use tablrs::functions::{avg, col, count_all, dense_rank, desc, lit, sum, to_date};
use tablrs::{ColumnType, JoinSpec, Schema, SortKey, Table, Value, WindowSpec};

fn raw_orders() -> Table {
    let schema = Schema::from_pairs(&[
        ("order_id", ColumnType::Int64),
        ("order_date", ColumnType::String),
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
        ("city", ColumnType::String),
    ])
    .unwrap();
    let rows = vec![
        (1, "2024-01-01", "Electronics", 2000, "Bangalore"),
        (2, "2024-01-02", "Clothing", 1500, "Mumbai"),
        (3, "2024-01-03", "Electronics", 3000, "Bangalore"),
        (4, "2024-01-04", "Furniture", 4000, "Delhi"),
        (5, "2024-01-05", "Clothing", 1200, "Mumbai"),
        (6, "2024-01-06", "Electronics", 2500, "Delhi"),
    ]
    .into_iter()
    .map(|(id, day, category, amount, city)| {
        vec![
            Value::from(id),
            Value::from(day),
            Value::from(category),
            Value::from(amount),
            Value::from(city),
        ]
    })
    .collect();
    Table::from_rows(schema, rows).unwrap()
}

#[test]
fn test_sales_pipeline() {
    let orders = raw_orders()
        .with_column("order_date", &to_date("order_date", "%Y-%m-%d"))
        .unwrap();
    assert_eq!(
        orders.schema().column_type("order_date").unwrap(),
        ColumnType::Date
    );

    // aggregation
    let aggregated = orders
        .group_by(&["category"])
        .agg(vec![
            sum("amount").alias("total_sales"),
            avg("amount").alias("avg_sales"),
            count_all().alias("order_count"),
        ])
        .unwrap();
    let expected_aggregated = "\
+-----------+-----------+---------+-----------+
|   category|total_sales|avg_sales|order_count|
+-----------+-----------+---------+-----------+
|Electronics|       7500|   2500.0|          3|
|   Clothing|       2700|   1350.0|          2|
|  Furniture|       4000|   4000.0|          1|
+-----------+-----------+---------+-----------+
";
    assert_eq!(aggregated.to_string(), expected_aggregated);

    // running total and dense rank
    let running = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![SortKey::asc("order_date")])
        .rows_to_current_row();
    let ranking = WindowSpec::new()
        .partition_by(&["category"])
        .order_by(vec![desc("amount")]);
    let enriched = orders
        .with_window_column("running_total", sum("amount"), &running)
        .unwrap()
        .with_window_column("rank_in_category", dense_rank(), &ranking)
        .unwrap();

    assert_eq!(
        enriched.column_names(),
        vec![
            "order_id",
            "order_date",
            "category",
            "amount",
            "city",
            "running_total",
            "rank_in_category"
        ]
    );
    assert_eq!(
        int_column(&enriched, "running_total"),
        vec![2000, 1500, 5000, 4000, 2700, 7500]
    );
    assert_eq!(
        int_column(&enriched, "rank_in_category"),
        vec![3, 1, 1, 1, 2, 2]
    );

    // high value orders
    let high_value = enriched.filter(&col("amount").gt(lit(2000))).unwrap();
    assert_eq!(int_column(&high_value, "order_id"), vec![3, 4, 6]);
    assert_eq!(high_value.column_count(), 7);

    // same-city pairs
    let same_city = enriched
        .self_join(
            &JoinSpec::new()
                .on("city", "city")
                .aliases("a", "b")
                .exclude(col("a.order_id").eq(col("b.order_id"))),
        )
        .unwrap()
        .select_as(&[
            ("a.order_id", "order1"),
            ("b.order_id", "order2"),
            ("a.city", "city"),
        ])
        .unwrap();
    assert_eq!(int_column(&same_city, "order1"), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(int_column(&same_city, "order2"), vec![3, 5, 1, 6, 2, 4]);
    assert_eq!(
        str_column(&same_city, "city"),
        vec!["Bangalore", "Mumbai", "Bangalore", "Delhi", "Mumbai", "Delhi"]
    );
}
