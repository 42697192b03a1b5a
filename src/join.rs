//! Equi-joins
//!
//! Hash join: the right side is indexed by its join columns, then every left
//! row probes the index. The index is complete before probing starts; probing
//! may be sharded over rayon. An optional exclusion predicate, evaluated on
//! the joined row, rejects candidate pairs (the self-join case uses it to drop
//! a row paired with itself).

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::config;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::schema::Schema;
use crate::table::{Row, RowView, Table};
use crate::value::{ColumnType, Value};

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Only matching pairs
    #[default]
    Inner,
    /// Every left row, padded with nulls when unmatched
    Left,
    /// Every right row, padded with nulls when unmatched
    Right,
    /// Every row of both sides
    Full,
}

/// Join condition and output naming
#[derive(Debug, Clone, Default)]
pub struct JoinSpec {
    on: Vec<(String, String)>,
    exclude: Option<Expr>,
    left_alias: Option<String>,
    right_alias: Option<String>,
    join_type: JoinType,
}

impl JoinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality between a left and a right column
    pub fn on(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.on.push((left.into(), right.into()));
        self
    }

    /// Drop candidate pairs for which `predicate` is `true`
    ///
    /// The predicate sees the joined row, so it must use the aliased column
    /// names when aliases are set.
    pub fn exclude(mut self, predicate: Expr) -> Self {
        self.exclude = Some(predicate);
        self
    }

    /// Prefix output columns with `left.` and `right.`
    pub fn aliases(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_alias = Some(left.into());
        self.right_alias = Some(right.into());
        self
    }

    pub fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.on
    }
}

/// Hash equi-join operator
#[derive(Debug, Clone)]
pub struct EquiJoinExecutor {
    spec: JoinSpec,
}

// Output rows driven by one left row, plus the right rows it matched
type Probe = (Vec<Row>, Vec<usize>);

impl EquiJoinExecutor {
    pub fn new(spec: JoinSpec) -> Self {
        EquiJoinExecutor { spec }
    }

    pub fn execute(&self, left: &Table, right: &Table) -> Result<Table> {
        if self.spec.on.is_empty() {
            return Err(Error::InvalidInput(
                "equi-join requires at least one column pair".to_string(),
            ));
        }

        let mut left_keys = Vec::with_capacity(self.spec.on.len());
        let mut right_keys = Vec::with_capacity(self.spec.on.len());
        for (l, r) in &self.spec.on {
            let lp = left.schema().index_of(l)?;
            let rp = right.schema().index_of(r)?;
            let lt = left.schema().fields()[lp].column_type;
            let rt = right.schema().fields()[rp].column_type;
            if lt != rt {
                return Err(Error::type_mismatch(
                    format!("join condition {} = {}", l, r),
                    lt.to_string(),
                    rt.to_string(),
                ));
            }
            left_keys.push(lp);
            right_keys.push(rp);
        }

        let output_schema = self.output_schema(left.schema(), right.schema())?;
        if let Some(predicate) = &self.spec.exclude {
            match predicate.data_type(&output_schema)? {
                None | Some(ColumnType::Boolean) => {}
                Some(other) => {
                    return Err(Error::type_mismatch(
                        format!("join exclusion '{}'", predicate),
                        "boolean",
                        other.to_string(),
                    ))
                }
            }
        }

        // build
        let mut index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        for (idx, row) in right.rows().iter().enumerate() {
            if let Some(key) = join_key(row, &right_keys) {
                index.entry(key).or_default().push(idx);
            }
        }

        // probe
        let cfg = config::global();
        let probe = |row: &Row| self.probe(row, &left_keys, right, &index, &output_schema);
        let probes: Vec<Probe> = if cfg.should_parallelize(left.row_count()) {
            let chunk = cfg.chunk_size(left.row_count());
            log::trace!("join: probing {} rows in shards of {}", left.row_count(), chunk);
            left.rows()
                .par_chunks(chunk)
                .map(|shard| shard.iter().map(probe).collect::<Result<Vec<_>>>())
                .collect::<Result<Vec<Vec<_>>>>()?
                .into_iter()
                .flatten()
                .collect()
        } else {
            left.rows().iter().map(probe).collect::<Result<_>>()?
        };

        let right_width = right.column_count();
        let mut rows = Vec::new();
        let mut matched_right = HashSet::new();
        for ((pairs, matched), left_row) in probes.into_iter().zip(left.rows()) {
            if pairs.is_empty() && matches!(self.spec.join_type, JoinType::Left | JoinType::Full)
            {
                let mut values = left_row.values().to_vec();
                values.extend(std::iter::repeat(Value::Null).take(right_width));
                rows.push(Row::new(values));
            }
            rows.extend(pairs);
            matched_right.extend(matched);
        }

        if matches!(self.spec.join_type, JoinType::Right | JoinType::Full) {
            for (idx, right_row) in right.rows().iter().enumerate() {
                if !matched_right.contains(&idx) {
                    let mut values = vec![Value::Null; left.column_count()];
                    values.extend(right_row.values().iter().cloned());
                    rows.push(Row::new(values));
                }
            }
        }

        log::debug!(
            "{:?} join: {} x {} rows -> {} rows",
            self.spec.join_type,
            left.row_count(),
            right.row_count(),
            rows.len()
        );

        Ok(Table::from_parts(output_schema, rows))
    }

    fn output_schema(&self, left: &Schema, right: &Schema) -> Result<Schema> {
        let left = match &self.spec.left_alias {
            Some(alias) => left.qualified(alias),
            None => left.clone(),
        };
        let right = match &self.spec.right_alias {
            Some(alias) => right.qualified(alias),
            None => right.clone(),
        };
        left.with_fields(right.fields().to_vec())
    }

    fn probe(
        &self,
        left_row: &Row,
        left_keys: &[usize],
        right: &Table,
        index: &HashMap<Vec<Value>, Vec<usize>>,
        output_schema: &Schema,
    ) -> Result<Probe> {
        let candidates = match join_key(left_row, left_keys).and_then(|key| index.get(&key)) {
            Some(candidates) => candidates,
            None => return Ok((Vec::new(), Vec::new())),
        };

        let mut rows = Vec::with_capacity(candidates.len());
        let mut matched = Vec::with_capacity(candidates.len());
        for &right_idx in candidates {
            let mut values = left_row.values().to_vec();
            values.extend(right.rows()[right_idx].values().iter().cloned());
            if let Some(predicate) = &self.spec.exclude {
                let view = RowView::new(output_schema, &values);
                if matches!(predicate.evaluate(&view)?, Value::Boolean(true)) {
                    continue;
                }
            }
            rows.push(Row::new(values));
            matched.push(right_idx);
        }
        Ok((rows, matched))
    }
}

// Null keys never match
fn join_key(row: &Row, positions: &[usize]) -> Option<Vec<Value>> {
    let key: Vec<Value> = positions.iter().map(|&p| row.values()[p].clone()).collect();
    if key.iter().any(Value::is_null) {
        None
    } else {
        Some(key)
    }
}

impl Table {
    /// Join with another table
    pub fn join(&self, other: &Table, spec: &JoinSpec) -> Result<Table> {
        EquiJoinExecutor::new(spec.clone()).execute(self, other)
    }

    /// Join the table with itself; `spec` should set aliases
    pub fn self_join(&self, spec: &JoinSpec) -> Result<Table> {
        self.join(self, spec)
    }
}
