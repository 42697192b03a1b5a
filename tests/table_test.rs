mod common;

use common::{date, int_column, orders, orders_schema, str_column};
use tablrs::functions::{col, lit, to_date};
use tablrs::{ColumnType, Error, Row, Schema, SortKey, Table, Value};

#[test]
fn test_table_creation() {
    let table = orders();
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.column_count(), 5);
    assert_eq!(
        table.column_names(),
        vec!["order_id", "order_date", "category", "amount", "city"]
    );
    assert_eq!(table.value(3, "city").unwrap(), &Value::from("Delhi"));
    assert_eq!(
        table.value(0, "order_date").unwrap(),
        &Value::Date(date("2024-01-01"))
    );
}

#[test]
fn test_duplicate_column_name_rejected() {
    let result = Schema::from_pairs(&[("a", ColumnType::Int64), ("a", ColumnType::String)]);
    assert!(matches!(result, Err(Error::DuplicateColumnName(name)) if name == "a"));
}

#[test]
fn test_row_width_checked() {
    let result = Table::new(orders_schema(), vec![Row::new(vec![Value::from(1)])]);
    assert!(matches!(
        result,
        Err(Error::InconsistentRowCount {
            expected: 5,
            found: 1
        })
    ));
}

#[test]
fn test_cell_type_checked() {
    let schema = Schema::from_pairs(&[("amount", ColumnType::Int64)]).unwrap();
    let result = Table::from_rows(schema, vec![vec![Value::from("lots")]]);
    let err = result.unwrap_err();
    assert!(err.is_type_error());
    assert!(matches!(err, Error::ColumnTypeMismatch { ref name, .. } if name == "amount"));
}

#[test]
fn test_nulls_allowed_in_any_column() {
    let schema = Schema::from_pairs(&[("a", ColumnType::Date), ("b", ColumnType::String)]).unwrap();
    let table = Table::from_rows(schema, vec![vec![Value::Null, Value::Null]]).unwrap();
    assert!(table.value(0, "a").unwrap().is_null());
}

#[test]
fn test_missing_column_is_schema_error() {
    let table = orders();
    let err = table.column_values("price").unwrap_err();
    assert!(err.is_schema_error());
    assert!(table.value(10, "amount").is_err());
}

#[test]
fn test_select_and_select_as() {
    let table = orders();
    let projected = table.select(&["city", "order_id"]).unwrap();
    assert_eq!(projected.column_names(), vec!["city", "order_id"]);
    assert_eq!(int_column(&projected, "order_id"), vec![1, 2, 3, 4, 5, 6]);

    let renamed = table.select_as(&[("order_id", "id"), ("amount", "total")]).unwrap();
    assert_eq!(renamed.column_names(), vec!["id", "total"]);
    assert_eq!(renamed.schema().column_type("total").unwrap(), ColumnType::Int64);

    assert!(table.select(&["nope"]).is_err());
}

#[test]
fn test_rename_column() {
    let table = orders().rename_column("amount", "price").unwrap();
    assert!(table.contains_column("price"));
    assert!(!table.contains_column("amount"));
    assert!(matches!(
        orders().rename_column("amount", "city"),
        Err(Error::DuplicateColumnName(_))
    ));
}

#[test]
fn test_with_column_appends_and_replaces() {
    let table = orders();
    let doubled = table
        .with_column("double_amount", &(col("amount") * lit(2)))
        .unwrap();
    assert_eq!(doubled.column_count(), 6);
    assert_eq!(
        int_column(&doubled, "double_amount"),
        vec![4000, 3000, 6000, 8000, 2400, 5000]
    );

    let replaced = table.with_column("amount", &(col("amount") + lit(1))).unwrap();
    assert_eq!(replaced.column_names(), table.column_names());
    assert_eq!(int_column(&replaced, "amount")[0], 2001);
}

#[test]
fn test_to_date_conversion() {
    let schema = Schema::from_pairs(&[("d", ColumnType::String)]).unwrap();
    let raw = Table::from_rows(
        schema,
        vec![vec![Value::from("2024-01-05")], vec![Value::from("not a date")]],
    )
    .unwrap();

    let converted = raw.with_column("d", &to_date("d", "%Y-%m-%d")).unwrap();
    assert_eq!(converted.schema().column_type("d").unwrap(), ColumnType::Date);
    assert_eq!(converted.value(0, "d").unwrap(), &Value::Date(date("2024-01-05")));
    assert!(converted.value(1, "d").unwrap().is_null());
}

#[test]
fn test_sort_by_is_stable() {
    let table = orders();
    let sorted = table
        .sort_by(&[SortKey::asc("category"), SortKey::desc("amount")])
        .unwrap();
    assert_eq!(int_column(&sorted, "order_id"), vec![2, 5, 3, 6, 1, 4]);

    let by_city = table.sort_by(&[SortKey::asc("city")]).unwrap();
    // ties keep input order
    assert_eq!(int_column(&by_city, "order_id"), vec![1, 3, 4, 6, 2, 5]);
}

#[test]
fn test_operations_leave_input_untouched() {
    let table = orders();
    let before = table.clone();
    let _ = table.sort_by(&[SortKey::desc("amount")]).unwrap();
    let _ = table.with_column("x", &lit(1)).unwrap();
    assert_eq!(table, before);
}

#[test]
fn test_head_and_show() {
    let table = orders();
    assert_eq!(table.head(2).row_count(), 2);
    assert_eq!(table.head(100).row_count(), 6);

    let shown = table.show(2);
    assert!(shown.ends_with("only showing top 2 rows\n"));
    assert!(!table.show(6).contains("only showing"));
}

#[test]
fn test_display_layout() {
    let table = orders().select(&["order_id", "city"]).unwrap().head(1);
    let expected = "\
+--------+---------+
|order_id|     city|
+--------+---------+
|       1|Bangalore|
+--------+---------+
";
    assert_eq!(table.to_string(), expected);
}

#[test]
fn test_iter_rows() {
    let table = orders();
    let cities: Vec<String> = table
        .iter_rows()
        .map(|row| row.get("city").unwrap().to_string())
        .collect();
    assert_eq!(cities, str_column(&table, "city"));
}
