//! Grouped aggregation
//!
//! Rows are partitioned by the tuple of grouping-key values and every
//! partition is reduced to one output row. Groups are emitted in the order
//! their key was first seen in the input.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::aggregate::{AggSpec, ResolvedAgg};
use crate::config;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::table::{Row, Table};
use crate::value::Value;

/// Row indices of one group, keyed by the grouping values
#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub key: Vec<Value>,
    pub rows: Vec<usize>,
}

/// Partition `rows` by the values found at `positions`, in first-seen order
pub(crate) fn partition_rows(rows: &[Row], positions: &[usize]) -> Vec<Group> {
    let mut slots: HashMap<Vec<Value>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let key: Vec<Value> = positions.iter().map(|&p| row.values()[p].clone()).collect();
        match slots.get(&key) {
            Some(&slot) => groups[slot].rows.push(row_idx),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    rows: vec![row_idx],
                });
            }
        }
    }

    groups
}

/// Grouped aggregation operator
#[derive(Debug, Clone)]
pub struct GroupByAggregator {
    keys: Vec<String>,
    aggregations: Vec<AggSpec>,
}

impl GroupByAggregator {
    /// Create an aggregator over the given grouping columns
    pub fn new<S: AsRef<str>>(keys: &[S], aggregations: Vec<AggSpec>) -> Self {
        GroupByAggregator {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            aggregations,
        }
    }

    /// Grouping columns
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Run the aggregation
    ///
    /// # Returns
    /// A table with the grouping columns followed by one column per aggregate
    pub fn execute(&self, table: &Table) -> Result<Table> {
        if self.keys.is_empty() {
            return Err(Error::InvalidInput(
                "group by requires at least one key column".to_string(),
            ));
        }

        let schema = table.schema();
        let key_positions = schema.indices_of(&self.keys)?;
        let resolved: Vec<ResolvedAgg> = self
            .aggregations
            .iter()
            .map(|agg| agg.resolve(schema))
            .collect::<Result<_>>()?;

        let mut fields: Vec<_> = key_positions
            .iter()
            .map(|&p| schema.fields()[p].clone())
            .collect();
        fields.extend(resolved.iter().map(|r| r.output.clone()));
        let output_schema = Schema::new(fields)?;

        let groups = partition_rows(table.rows(), &key_positions);
        let cfg = config::global();

        let reduce = |group: &Group| -> Result<Row> {
            let mut values = group.key.clone();
            for agg in &resolved {
                let mut acc = agg.accumulator();
                for &idx in &group.rows {
                    acc.update(agg.input(table.rows()[idx].values()))?;
                }
                values.push(acc.value());
            }
            Ok(Row::new(values))
        };

        let rows: Vec<Row> = if cfg.should_parallelize(groups.len()) {
            log::trace!("group by: reducing {} groups in parallel", groups.len());
            groups.par_iter().map(reduce).collect::<Result<_>>()?
        } else {
            groups.iter().map(reduce).collect::<Result<_>>()?
        };

        log::debug!(
            "group by [{}]: {} rows -> {} groups",
            self.keys.join(", "),
            table.row_count(),
            rows.len()
        );

        Ok(Table::from_parts(output_schema, rows))
    }
}

/// Grouping handle returned by [`Table::group_by`]
#[derive(Debug, Clone)]
pub struct GroupedTable<'a> {
    table: &'a Table,
    keys: Vec<String>,
}

impl<'a> GroupedTable<'a> {
    /// Apply named aggregates
    pub fn agg(&self, aggregations: Vec<AggSpec>) -> Result<Table> {
        GroupByAggregator::new(&self.keys, aggregations).execute(self.table)
    }

    /// Row count per group, in a column named `count`
    pub fn count(&self) -> Result<Table> {
        self.agg(vec![AggSpec::count_all().alias("count")])
    }

    /// Number of distinct keys
    pub fn group_count(&self) -> Result<usize> {
        let positions = self.table.schema().indices_of(&self.keys)?;
        Ok(partition_rows(self.table.rows(), &positions).len())
    }
}

impl Table {
    /// Group rows by one or more columns
    ///
    /// # Arguments
    /// * `keys` - grouping column names; checked when an aggregate runs
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> GroupedTable<'_> {
        GroupedTable {
            table: self,
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        }
    }
}
