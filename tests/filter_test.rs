mod common;

use common::{date, int_column, orders, sales};
use tablrs::functions::{col, lit};
use tablrs::{ColumnType, Error, Filter, Schema, Table, Value};

#[test]
fn test_high_value_orders() {
    let table = orders();
    let high = table.filter(&col("amount").gt(lit(2000))).unwrap();

    assert_eq!(int_column(&high, "order_id"), vec![3, 4, 6]);
    assert_eq!(high.schema(), table.schema());
}

#[test]
fn test_filter_boundary_is_exclusive() {
    let high = orders().filter(&col("amount").gt(lit(2000))).unwrap();
    assert!(!int_column(&high, "amount").contains(&2000));

    let inclusive = orders().filter(&col("amount").gt_eq(lit(2000))).unwrap();
    assert_eq!(int_column(&inclusive, "order_id"), vec![1, 3, 4, 6]);
}

#[test]
fn test_filter_is_idempotent() {
    let predicate = col("amount").gt(lit(2000));
    let once = orders().filter(&predicate).unwrap();
    let twice = once.filter(&predicate).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_compound_predicates() {
    let table = orders();
    let delhi_electronics = table
        .filter(
            &col("city")
                .eq(lit("Delhi"))
                .and(col("category").eq(lit("Electronics"))),
        )
        .unwrap();
    assert_eq!(int_column(&delhi_electronics, "order_id"), vec![6]);

    let either = table
        .filter(&col("amount").lt(lit(1300)).or(col("amount").gt(lit(3500))))
        .unwrap();
    assert_eq!(int_column(&either, "order_id"), vec![4, 5]);

    let not_mumbai = table.filter(&!col("city").eq(lit("Mumbai"))).unwrap();
    assert_eq!(not_mumbai.row_count(), 4);
}

#[test]
fn test_filter_on_dates_and_floats() {
    let table = orders();
    let january_later = table
        .filter(&col("order_date").gt_eq(lit(date("2024-01-04"))))
        .unwrap();
    assert_eq!(int_column(&january_later, "order_id"), vec![4, 5, 6]);

    // integer column against a float literal
    let above = table.filter(&col("amount").gt(lit(2999.5))).unwrap();
    assert_eq!(int_column(&above, "order_id"), vec![3, 4]);
}

#[test]
fn test_rlike_predicate() {
    let table = orders();
    let cities = table
        .filter(&col("city").rlike("^(Delhi|Mumbai)$").unwrap())
        .unwrap();
    assert_eq!(int_column(&cities, "order_id"), vec![2, 4, 5, 6]);

    assert!(matches!(
        col("city").rlike("(unclosed"),
        Err(Error::InvalidRegex(_))
    ));
}

#[test]
fn test_null_predicate_drops_row() {
    let table = sales(&[("A", Some(5000)), ("A", None), ("B", Some(10))]);
    let high = table.filter(&col("amount").gt(lit(2000))).unwrap();
    assert_eq!(high.row_count(), 1);

    let missing = table.filter(&col("amount").is_null()).unwrap();
    assert_eq!(missing.row_count(), 1);
    assert_eq!(missing.value(0, "category").unwrap(), &Value::from("A"));
}

#[test]
fn test_filter_with_closure() {
    let table = orders();
    let even = table
        .filter_by(|row| Ok(row.get("order_id")?.as_i64().unwrap_or(0) % 2 == 0))
        .unwrap();
    assert_eq!(int_column(&even, "order_id"), vec![2, 4, 6]);
}

#[test]
fn test_filter_errors() {
    let table = orders();

    let missing = table.filter(&col("price").gt(lit(1))).unwrap_err();
    assert!(missing.is_schema_error());

    let not_boolean = Filter::new(col("amount") + lit(1)).execute(&table).unwrap_err();
    assert!(not_boolean.is_type_error());

    let bad_compare = table.filter(&col("city").gt(lit(1))).unwrap_err();
    assert!(bad_compare.is_type_error());
}

#[test]
fn test_filter_empty_table() {
    let table = sales(&[]);
    let result = table.filter(&col("amount").gt(lit(0))).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.schema(), table.schema());
}

#[test]
fn test_negative_zero_matches_zero() {
    let schema = Schema::from_pairs(&[("x", ColumnType::Float64)]).unwrap();
    let table = Table::from_rows(
        schema,
        vec![vec![Value::Float64(-0.0)], vec![Value::Float64(0.0)]],
    )
    .unwrap();
    assert_eq!(table.filter(&col("x").eq(lit(0.0))).unwrap().row_count(), 2);
    assert_eq!(table.filter(&col("x").eq(lit(0))).unwrap().row_count(), 2);
}

#[test]
fn test_large_int_compares_exactly_with_float() {
    let schema = Schema::from_pairs(&[("n", ColumnType::Int64)]).unwrap();
    let table = Table::from_rows(schema, vec![vec![Value::Int64(9_007_199_254_740_993)]]).unwrap();
    let above = table
        .filter(&col("n").gt(lit(9_007_199_254_740_992.0)))
        .unwrap();
    assert_eq!(above.row_count(), 1);
    let equal = table
        .filter(&col("n").eq(lit(9_007_199_254_740_992.0)))
        .unwrap();
    assert!(equal.is_empty());
}
