//! Window functions over ordered partitions
//!
//! A window computation keeps every input row and adds one column whose value
//! is derived from the row's partition:
//! - running aggregates over the frame from the partition start to the
//!   current row
//! - ranking (`row_number`, `rank`, `dense_rank`)
//!
//! Rows inside a partition are stably sorted by the order keys, so rows with
//! equal keys keep their input order. Output rows stay in input order.

use rayon::prelude::*;

use crate::aggregate::{AggSpec, ResolvedAgg};
use crate::config;
use crate::error::{Error, Result};
use crate::groupby::{partition_rows, Group};
use crate::rank::{assign_ranks, RankKind};
use crate::schema::{Field, Schema};
use crate::table::{compare_keys, Row, SortKey, Table};
use crate::value::{ColumnType, Value};

/// Frame of a running aggregate; both end at the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFrame {
    /// Rows with the same order key are peers and share one value
    #[default]
    Range,
    /// Frame ends at the current row of the sorted partition
    Rows,
}

/// Partitioning, ordering and frame of a window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSpec {
    partition_by: Vec<String>,
    order_by: Vec<SortKey>,
    frame: WindowFrame,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.partition_by = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        self.order_by = keys;
        self
    }

    /// `ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`
    pub fn rows_to_current_row(mut self) -> Self {
        self.frame = WindowFrame::Rows;
        self
    }

    /// `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`
    pub fn range_to_current_row(mut self) -> Self {
        self.frame = WindowFrame::Range;
        self
    }

    pub fn frame(&self) -> WindowFrame {
        self.frame
    }

    pub fn partition_columns(&self) -> &[String] {
        &self.partition_by
    }

    pub fn order_keys(&self) -> &[SortKey] {
        &self.order_by
    }
}

/// A per-row window computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowFunction {
    /// Running aggregate; the `AggSpec` alias is ignored, the column name is given separately
    Aggregate(AggSpec),
    /// Ranking by the window's order keys
    Ranking(RankKind),
}

impl WindowFunction {
    pub fn sum(column: impl Into<String>) -> Self {
        WindowFunction::Aggregate(AggSpec::sum(column))
    }

    pub fn row_number() -> Self {
        WindowFunction::Ranking(RankKind::RowNumber)
    }

    pub fn rank() -> Self {
        WindowFunction::Ranking(RankKind::Rank)
    }

    pub fn dense_rank() -> Self {
        WindowFunction::Ranking(RankKind::DenseRank)
    }
}

impl From<AggSpec> for WindowFunction {
    fn from(spec: AggSpec) -> Self {
        WindowFunction::Aggregate(spec)
    }
}

// A window function bound to the input schema
enum Bound {
    Aggregate(ResolvedAgg),
    Rank(RankKind),
}

/// Evaluates window functions over a table
#[derive(Debug, Clone)]
pub struct WindowEngine {
    spec: WindowSpec,
}

impl WindowEngine {
    pub fn new(spec: WindowSpec) -> Self {
        WindowEngine { spec }
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    /// Append one column per `(name, function)` pair
    pub fn compute(&self, table: &Table, columns: &[(&str, WindowFunction)]) -> Result<Table> {
        let schema = table.schema();
        let partition_positions = schema.indices_of(&self.spec.partition_by)?;
        let order_names: Vec<&str> = self.spec.order_by.iter().map(|k| k.column.as_str()).collect();
        let order_positions = schema.indices_of(&order_names)?;
        let descending: Vec<bool> = self.spec.order_by.iter().map(|k| k.descending).collect();

        let mut bound = Vec::with_capacity(columns.len());
        let mut fields = Vec::with_capacity(columns.len());
        for (name, function) in columns {
            match function {
                WindowFunction::Ranking(kind) => {
                    if order_positions.is_empty() {
                        return Err(Error::InvalidInput(format!(
                            "window column '{}' ranks rows but the window has no order keys",
                            name
                        )));
                    }
                    fields.push(Field::new(*name, ColumnType::Int64));
                    bound.push(Bound::Rank(*kind));
                }
                WindowFunction::Aggregate(spec) => {
                    let resolved = spec.resolve(schema)?;
                    fields.push(Field::new(*name, resolved.output.column_type));
                    bound.push(Bound::Aggregate(resolved));
                }
            }
        }
        let output_schema: Schema = schema.with_fields(fields)?;

        let partitions = partition_rows(table.rows(), &partition_positions);
        let cfg = config::global();

        let evaluate = |partition: &Group| {
            evaluate_partition(
                table.rows(),
                partition,
                &order_positions,
                &descending,
                self.spec.frame,
                &bound,
            )
        };
        let results: Vec<Vec<(usize, Vec<Value>)>> = if cfg.should_parallelize(partitions.len()) {
            log::trace!("window: evaluating {} partitions in parallel", partitions.len());
            partitions.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            partitions.iter().map(evaluate).collect::<Result<_>>()?
        };

        let mut extra: Vec<Vec<Value>> = vec![Vec::new(); table.row_count()];
        for (row_idx, values) in results.into_iter().flatten() {
            extra[row_idx] = values;
        }

        let rows = table
            .rows()
            .iter()
            .zip(extra)
            .map(|(row, added)| {
                let mut values = row.values().to_vec();
                values.extend(added);
                Row::new(values)
            })
            .collect();

        log::debug!(
            "window over [{}]: {} rows in {} partitions, {} new column(s)",
            self.spec.partition_by.join(", "),
            table.row_count(),
            partitions.len(),
            columns.len()
        );

        Ok(Table::from_parts(output_schema, rows))
    }
}

// Computed values for each row of one partition, tagged with the row index
fn evaluate_partition(
    rows: &[Row],
    partition: &Group,
    order_positions: &[usize],
    descending: &[bool],
    frame: WindowFrame,
    bound: &[Bound],
) -> Result<Vec<(usize, Vec<Value>)>> {
    let mut sorted: Vec<(Vec<Value>, usize)> = partition
        .rows
        .iter()
        .map(|&idx| {
            let key = order_positions
                .iter()
                .map(|&p| rows[idx].values()[p].clone())
                .collect();
            (key, idx)
        })
        .collect();
    // stable: equal keys keep input order
    sorted.sort_by(|a, b| compare_keys(&a.0, &b.0, descending));

    let keys: Vec<Vec<Value>> = sorted.iter().map(|(k, _)| k.clone()).collect();
    let mut out: Vec<(usize, Vec<Value>)> = sorted
        .iter()
        .map(|(_, idx)| (*idx, Vec::with_capacity(bound.len())))
        .collect();

    for function in bound {
        let column = match function {
            Bound::Rank(kind) => assign_ranks(*kind, &keys)
                .into_iter()
                .map(Value::Int64)
                .collect(),
            Bound::Aggregate(agg) => running_aggregate(rows, &sorted, agg, frame)?,
        };
        for (slot, value) in out.iter_mut().zip(column) {
            slot.1.push(value);
        }
    }

    Ok(out)
}

fn running_aggregate(
    rows: &[Row],
    sorted: &[(Vec<Value>, usize)],
    agg: &ResolvedAgg,
    frame: WindowFrame,
) -> Result<Vec<Value>> {
    let mut acc = agg.accumulator();
    let mut values = Vec::with_capacity(sorted.len());

    match frame {
        WindowFrame::Rows => {
            for (_, idx) in sorted {
                acc.update(agg.input(rows[*idx].values()))?;
                values.push(acc.value());
            }
        }
        WindowFrame::Range => {
            let mut start = 0;
            while start < sorted.len() {
                let mut end = start;
                while end < sorted.len() && sorted[end].0 == sorted[start].0 {
                    acc.update(agg.input(rows[sorted[end].1].values()))?;
                    end += 1;
                }
                let peer_value = acc.value();
                values.extend(std::iter::repeat(peer_value).take(end - start));
                start = end;
            }
        }
    }

    Ok(values)
}

impl Table {
    /// Add a single window column
    ///
    /// # Arguments
    /// * `name` - output column name
    /// * `function` - running aggregate (e.g. `AggSpec::sum`) or ranking function
    /// * `spec` - partitioning, ordering and frame
    pub fn with_window_column(
        &self,
        name: &str,
        function: impl Into<WindowFunction>,
        spec: &WindowSpec,
    ) -> Result<Table> {
        WindowEngine::new(spec.clone()).compute(self, &[(name, function.into())])
    }
}
