use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::config;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::table::{Row, Table};
use crate::value::Value;

/// Read a CSV file into a table with a declared schema
///
/// With a header row, columns are matched by name and may appear in any
/// order; without one, they are taken positionally. Empty cells become
/// `NULL`; dates use the active configuration's `date_format`.
pub fn read_csv<P: AsRef<Path>>(path: P, schema: &Schema, has_header: bool) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    read_csv_from_reader(file, schema, has_header)
}

/// Read CSV from any reader
pub fn read_csv_from_reader<R: Read>(reader: R, schema: &Schema, has_header: bool) -> Result<Table> {
    let date_format = config::global().date_format;
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_header)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Schema column -> record position
    let positions: Vec<usize> = if has_header {
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        schema
            .fields()
            .iter()
            .map(|f| {
                headers
                    .iter()
                    .position(|h| *h == f.name)
                    .ok_or_else(|| Error::ColumnNotFound(f.name.clone()))
            })
            .collect::<Result<_>>()?
    } else {
        (0..schema.len()).collect()
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut values = Vec::with_capacity(schema.len());
        for (field, &pos) in schema.fields().iter().zip(&positions) {
            let cell = record.get(pos).ok_or(Error::InconsistentRowCount {
                expected: schema.len(),
                found: record.len(),
            })?;
            values.push(Value::parse(cell, field.column_type, &date_format)?);
        }
        rows.push(Row::new(values));
    }

    log::debug!("read_csv: {} rows, {} columns", rows.len(), schema.len());
    Table::new(schema.clone(), rows)
}

/// Write a table to a CSV file with a header row
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv_to_writer(table, file)
}

/// Write CSV to any writer; `NULL` is written as an empty cell and dates use
/// the active `date_format`
pub fn write_csv_to_writer<W: Write>(table: &Table, writer: W) -> Result<()> {
    let date_format = config::global().date_format;
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.column_names())?;

    for row in table.rows() {
        let record: Vec<String> = row
            .values()
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                Value::Date(d) => d.format(&date_format).to_string(),
                other => other.to_string(),
            })
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
