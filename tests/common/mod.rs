//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use tablrs::{ColumnType, Schema, Table, Value};

pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

pub fn orders_schema() -> Schema {
    Schema::from_pairs(&[
        ("order_id", ColumnType::Int64),
        ("order_date", ColumnType::Date),
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
        ("city", ColumnType::String),
    ])
    .unwrap()
}

/// The six sample orders used throughout the tests
pub fn orders() -> Table {
    let data = [
        (1, "2024-01-01", "Electronics", 2000, "Bangalore"),
        (2, "2024-01-02", "Clothing", 1500, "Mumbai"),
        (3, "2024-01-03", "Electronics", 3000, "Bangalore"),
        (4, "2024-01-04", "Furniture", 4000, "Delhi"),
        (5, "2024-01-05", "Clothing", 1200, "Mumbai"),
        (6, "2024-01-06", "Electronics", 2500, "Delhi"),
    ];
    let rows = data
        .iter()
        .map(|(id, day, category, amount, city)| {
            vec![
                Value::from(*id),
                Value::from(date(day)),
                Value::from(*category),
                Value::from(*amount),
                Value::from(*city),
            ]
        })
        .collect();
    Table::from_rows(orders_schema(), rows).unwrap()
}

/// `(category, amount)` pairs, dates omitted
pub fn sales(rows: &[(&str, Option<i64>)]) -> Table {
    let schema = Schema::from_pairs(&[
        ("category", ColumnType::String),
        ("amount", ColumnType::Int64),
    ])
    .unwrap();
    let rows = rows
        .iter()
        .map(|(category, amount)| vec![Value::from(*category), Value::from(*amount)])
        .collect();
    Table::from_rows(schema, rows).unwrap()
}

pub fn int_column(table: &Table, name: &str) -> Vec<i64> {
    table
        .column_values(name)
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

pub fn str_column(table: &Table, name: &str) -> Vec<String> {
    table
        .column_values(name)
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
