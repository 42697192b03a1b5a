use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::config;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::table::{Row, Table};
use crate::value::{ColumnType, Value};

/// Read a JSON array of records into a table with a declared schema
///
/// Missing keys and JSON `null` become `NULL`.
pub fn read_json<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    let json: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    from_json_value(&json, schema)
}

/// Build a table from an already parsed JSON array of records
pub fn from_json_value(json: &JsonValue, schema: &Schema) -> Result<Table> {
    let records = json
        .as_array()
        .ok_or_else(|| Error::InvalidInput("JSON input must be an array of records".to_string()))?;
    let date_format = config::global().date_format;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let object = record
            .as_object()
            .ok_or_else(|| Error::InvalidInput("every JSON record must be an object".to_string()))?;
        let mut values = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let cell = object.get(&field.name).unwrap_or(&JsonValue::Null);
            values.push(json_to_value(cell, field.column_type, &date_format, &field.name)?);
        }
        rows.push(Row::new(values));
    }

    Table::new(schema.clone(), rows)
}

fn json_to_value(cell: &JsonValue, ty: ColumnType, date_format: &str, column: &str) -> Result<Value> {
    let mismatch = || Error::Cast(format!("column {}: cannot read {} as {}", column, cell, ty));
    match (cell, ty) {
        (JsonValue::Null, _) => Ok(Value::Null),
        (JsonValue::Number(n), ColumnType::Int64) => n.as_i64().map(Value::Int64).ok_or_else(mismatch),
        (JsonValue::Number(n), ColumnType::Float64) => {
            n.as_f64().map(Value::Float64).ok_or_else(mismatch)
        }
        (JsonValue::Bool(b), ColumnType::Boolean) => Ok(Value::Boolean(*b)),
        (JsonValue::String(s), ColumnType::String) => Ok(Value::String(s.clone())),
        (JsonValue::String(s), ColumnType::Date) => Value::parse(s, ColumnType::Date, date_format),
        _ => Err(mismatch()),
    }
}

/// Render a table as a JSON array of records
pub fn to_json(table: &Table) -> Result<String> {
    Ok(serde_json::to_string(&to_json_value(table)?)?)
}

/// Render a table as a `serde_json` array of records
pub fn to_json_value(table: &Table) -> Result<JsonValue> {
    let names = table.column_names();
    let mut records = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        let mut object = Map::new();
        for (name, value) in names.iter().zip(row.values()) {
            object.insert(name.to_string(), serde_json::to_value(value)?);
        }
        records.push(JsonValue::Object(object));
    }
    Ok(JsonValue::Array(records))
}

/// Write a table to a JSON file as an array of records
pub fn write_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), &to_json_value(table)?)?;
    Ok(())
}
