//! Immutable tables
//!
//! A [`Table`] is an ordered sequence of [`Row`]s sharing one [`Schema`].
//! Every operator in this crate returns a new table; nothing mutates a table
//! after construction, so tables can be shared freely across threads.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::schema::{Field, Schema};
use crate::value::Value;

/// Cells beyond this width are truncated by `Display`
const MAX_CELL_WIDTH: usize = 20;

/// One row; values are positional and aligned with the owning table's schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Name-addressable view of a row, handed to predicates
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn new(schema: &'a Schema, values: &'a [Value]) -> Self {
        RowView { schema, values }
    }

    /// Value of the named column
    pub fn get(&self, name: &str) -> Result<&'a Value> {
        let pos = self.schema.index_of(name)?;
        self.values.get(pos).ok_or(Error::IndexOutOfBounds {
            index: pos,
            size: self.values.len(),
        })
    }

    pub fn get_at(&self, pos: usize) -> Option<&'a Value> {
        self.values.get(pos)
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// Sort direction for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    /// Ascending, nulls first
    pub fn asc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending, nulls last
    pub fn desc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: true,
        }
    }
}

/// Compare two key tuples under per-position directions
pub(crate) fn compare_keys(a: &[Value], b: &[Value], descending: &[bool]) -> Ordering {
    for ((x, y), desc) in a.iter().zip(b.iter()).zip(descending.iter()) {
        let ord = if *desc { y.cmp(x) } else { x.cmp(y) };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Immutable table
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<Schema>,
    rows: Arc<Vec<Row>>,
}

impl Table {
    /// Create a table, checking every row against the schema
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        for row in &rows {
            if row.len() != schema.len() {
                return Err(Error::InconsistentRowCount {
                    expected: schema.len(),
                    found: row.len(),
                });
            }
            for (value, field) in row.values().iter().zip(schema.fields()) {
                if !value.conforms_to(field.column_type) {
                    return Err(Error::ColumnTypeMismatch {
                        name: field.name.clone(),
                        expected: field.column_type,
                        // conforms_to only fails for non-null values
                        found: value.column_type().unwrap_or(field.column_type),
                    });
                }
            }
        }
        Ok(Self::from_parts(schema, rows))
    }

    /// Create a table from literal value rows
    pub fn from_rows(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        Self::new(schema, rows.into_iter().map(Row::new).collect())
    }

    /// Table with a schema and no rows
    pub fn empty(schema: Schema) -> Self {
        Self::from_parts(schema, Vec::new())
    }

    // Operators build rows that conform by construction
    pub(crate) fn from_parts(schema: Schema, rows: Vec<Row>) -> Self {
        Table {
            schema: Arc::new(schema),
            rows: Arc::new(rows),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.names()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row views in table order
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows
            .iter()
            .map(move |row| RowView::new(&self.schema, row.values()))
    }

    /// View of a single row
    pub fn row(&self, idx: usize) -> Result<RowView<'_>> {
        let row = self.rows.get(idx).ok_or(Error::IndexOutOfBounds {
            index: idx,
            size: self.rows.len(),
        })?;
        Ok(RowView::new(&self.schema, row.values()))
    }

    /// Single cell
    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        self.row(row)?.get(column)
    }

    /// All values of one column in row order
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>> {
        let pos = self.schema.index_of(name)?;
        Ok(self.rows.iter().map(|r| r.values[pos].clone()).collect())
    }

    /// Project onto a subset of columns
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let pairs: Vec<(&str, &str)> = columns.iter().map(|c| (*c, *c)).collect();
        self.select_as(&pairs)
    }

    /// Project with renaming; each pair is `(source column, output name)`
    pub fn select_as(&self, columns: &[(&str, &str)]) -> Result<Table> {
        let mut positions = Vec::with_capacity(columns.len());
        let mut fields = Vec::with_capacity(columns.len());
        for (source, output) in columns {
            let pos = self.schema.index_of(source)?;
            positions.push(pos);
            fields.push(Field::new(*output, self.schema.fields()[pos].column_type));
        }
        let schema = Schema::new(fields)?;
        let rows = self
            .rows
            .iter()
            .map(|row| Row::new(positions.iter().map(|&p| row.values[p].clone()).collect()))
            .collect();
        Ok(Table::from_parts(schema, rows))
    }

    /// Rename a single column
    pub fn rename_column(&self, from: &str, to: &str) -> Result<Table> {
        let pos = self.schema.index_of(from)?;
        let mut fields = self.schema.fields().to_vec();
        fields[pos].name = to.to_string();
        Ok(Table {
            schema: Arc::new(Schema::new(fields)?),
            rows: Arc::clone(&self.rows),
        })
    }

    /// Add or replace a column computed from an expression
    ///
    /// An existing column of the same name is replaced in place, otherwise the
    /// new column is appended.
    pub fn with_column(&self, name: &str, expr: &Expr) -> Result<Table> {
        let column_type = expr.data_type(&self.schema)?.ok_or_else(|| {
            Error::InvalidInput(format!(
                "cannot infer a type for column '{}' from a NULL literal",
                name
            ))
        })?;
        let mut values = Vec::with_capacity(self.rows.len());
        for view in self.iter_rows() {
            values.push(expr.evaluate(&view)?);
        }

        let replace = self.schema.index_of(name).ok();
        let mut fields = self.schema.fields().to_vec();
        match replace {
            Some(pos) => fields[pos] = Field::new(name, column_type),
            None => fields.push(Field::new(name, column_type)),
        }
        let schema = Schema::new(fields)?;

        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut cells = row.values.clone();
                match replace {
                    Some(pos) => cells[pos] = value,
                    None => cells.push(value),
                }
                Row::new(cells)
            })
            .collect();
        Ok(Table::from_parts(schema, rows))
    }

    /// Stable sort by the given keys
    pub fn sort_by(&self, keys: &[SortKey]) -> Result<Table> {
        let names: Vec<&str> = keys.iter().map(|k| k.column.as_str()).collect();
        let positions = self.schema.indices_of(&names)?;
        let descending: Vec<bool> = keys.iter().map(|k| k.descending).collect();

        let mut keyed: Vec<(Vec<Value>, &Row)> = self
            .rows
            .iter()
            .map(|row| (positions.iter().map(|&p| row.values[p].clone()).collect(), row))
            .collect();
        keyed.sort_by(|a, b| compare_keys(&a.0, &b.0, &descending));

        let rows = keyed.into_iter().map(|(_, row)| row.clone()).collect();
        Ok(Table::from_parts(self.schema.as_ref().clone(), rows))
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        let rows = self.rows.iter().take(n).cloned().collect();
        Table::from_parts(self.schema.as_ref().clone(), rows)
    }

    /// Render the first `n` rows in the tabular layout used by `Display`
    pub fn show(&self, n: usize) -> String {
        let mut out = render(&self.schema, &self.rows[..n.min(self.rows.len())]);
        if n < self.rows.len() {
            out.push_str(&format!(
                "only showing top {} row{}\n",
                n,
                if n == 1 { "" } else { "s" }
            ));
        }
        out
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.rows == other.rows
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(&self.schema, &self.rows))
    }
}

fn truncate(cell: String) -> String {
    if cell.chars().count() > MAX_CELL_WIDTH {
        let kept: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", kept)
    } else {
        cell
    }
}

fn render(schema: &Schema, rows: &[Row]) -> String {
    let headers: Vec<String> = schema.names().into_iter().map(|n| truncate(n.to_string())).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values().iter().map(|v| truncate(v.to_string())).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(*w));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let format_line = |items: &[String]| {
        let mut line = String::from("|");
        for (item, w) in items.iter().zip(&widths) {
            line.push_str(&format!("{:>width$}|", item, width = w));
        }
        line.push('\n');
        line
    };

    let mut out = separator.clone();
    out.push_str(&format_line(&headers));
    out.push_str(&separator);
    for row in &cells {
        out.push_str(&format_line(row));
    }
    out.push_str(&separator);
    out
}
