//! Row filtering

use rayon::prelude::*;

use crate::config;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::table::{Row, RowView, Table};
use crate::value::{ColumnType, Value};

/// Keeps the rows whose predicate evaluates to `true`
///
/// `false` and `NULL` both drop the row. Relative order and schema are
/// preserved.
#[derive(Debug, Clone)]
pub struct Filter {
    predicate: Expr,
}

impl Filter {
    pub fn new(predicate: Expr) -> Self {
        Filter { predicate }
    }

    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }

    pub fn execute(&self, table: &Table) -> Result<Table> {
        match self.predicate.data_type(table.schema())? {
            None | Some(ColumnType::Boolean) => {}
            Some(other) => {
                return Err(Error::type_mismatch(
                    format!("filter predicate '{}'", self.predicate),
                    "boolean",
                    other.to_string(),
                ))
            }
        }

        let predicate = &self.predicate;
        let rows = select_rows(table, |view| {
            Ok(matches!(predicate.evaluate(view)?, Value::Boolean(true)))
        })?;

        log::debug!(
            "filter {}: {} -> {} rows",
            self.predicate,
            table.row_count(),
            rows.len()
        );
        Ok(Table::from_parts(table.schema().clone(), rows))
    }
}

// Rows for which `keep` holds, in input order; sharded over rayon for large inputs
fn select_rows<F>(table: &Table, keep: F) -> Result<Vec<Row>>
where
    F: Fn(&RowView<'_>) -> Result<bool> + Send + Sync,
{
    let cfg = config::global();
    let schema = table.schema();
    let test = |row: &Row| -> Result<Option<Row>> {
        let view = RowView::new(schema, row.values());
        Ok(if keep(&view)? { Some(row.clone()) } else { None })
    };

    let kept: Vec<Option<Row>> = if cfg.should_parallelize(table.row_count()) {
        let chunk = cfg.chunk_size(table.row_count());
        log::trace!("filter: {} rows in shards of {}", table.row_count(), chunk);
        table
            .rows()
            .par_chunks(chunk)
            .map(|shard| shard.iter().map(test).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<Vec<_>>>>()?
            .into_iter()
            .flatten()
            .collect()
    } else {
        table.rows().iter().map(test).collect::<Result<_>>()?
    };

    Ok(kept.into_iter().flatten().collect())
}

impl Table {
    /// Rows matching a predicate expression
    pub fn filter(&self, predicate: &Expr) -> Result<Table> {
        Filter::new(predicate.clone()).execute(self)
    }

    /// Rows for which a closure returns `true`
    pub fn filter_by<F>(&self, keep: F) -> Result<Table>
    where
        F: Fn(&RowView<'_>) -> Result<bool> + Send + Sync,
    {
        let rows = select_rows(self, keep)?;
        Ok(Table::from_parts(self.schema().clone(), rows))
    }
}
