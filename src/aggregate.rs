//! Aggregate functions shared by grouped aggregation and running windows

use std::fmt;

use crate::error::{Error, Result};
use crate::schema::{Field, Schema};
use crate::value::{ColumnType, Value};

/// Aggregation operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// Sum of non-null values
    Sum,
    /// Mean of non-null values
    Mean,
    /// Number of rows, nulls included
    Count,
    /// Minimum non-null value
    Min,
    /// Maximum non-null value
    Max,
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "avg",
            AggFunc::Count => "count",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
        };
        write!(f, "{}", name)
    }
}

/// What an aggregate reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggTarget {
    /// A named column
    Column(String),
    /// The whole row (`count(*)`)
    Rows,
}

/// A named aggregate: function, input and output column name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggSpec {
    pub func: AggFunc,
    pub target: AggTarget,
    pub alias: Option<String>,
}

impl AggSpec {
    pub fn new(func: AggFunc, target: AggTarget) -> Self {
        AggSpec {
            func,
            target,
            alias: None,
        }
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(AggFunc::Sum, AggTarget::Column(column.into()))
    }

    pub fn avg(column: impl Into<String>) -> Self {
        Self::new(AggFunc::Mean, AggTarget::Column(column.into()))
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(AggFunc::Count, AggTarget::Column(column.into()))
    }

    /// `count(*)`
    pub fn count_all() -> Self {
        Self::new(AggFunc::Count, AggTarget::Rows)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(AggFunc::Min, AggTarget::Column(column.into()))
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(AggFunc::Max, AggTarget::Column(column.into()))
    }

    /// Name the output column
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    /// Output column name: the alias, or `func(column)`
    pub fn output_name(&self) -> String {
        match (&self.alias, &self.target) {
            (Some(alias), _) => alias.clone(),
            (None, AggTarget::Column(c)) => format!("{}({})", self.func, c),
            (None, AggTarget::Rows) => format!("{}(1)", self.func),
        }
    }

    /// Check the aggregate against `schema` and work out its output field
    pub(crate) fn resolve(&self, schema: &Schema) -> Result<ResolvedAgg> {
        let (position, input_type) = match &self.target {
            AggTarget::Column(name) => {
                let pos = schema.index_of(name)?;
                (Some(pos), Some(schema.fields()[pos].column_type))
            }
            AggTarget::Rows => {
                if self.func != AggFunc::Count {
                    return Err(Error::InvalidInput(format!(
                        "{} requires a column, only count accepts whole rows",
                        self.func
                    )));
                }
                (None, None)
            }
        };

        let output_type = match (self.func, input_type) {
            (AggFunc::Count, _) => ColumnType::Int64,
            (AggFunc::Sum, Some(ty)) | (AggFunc::Mean, Some(ty)) if !ty.is_numeric() => {
                return Err(Error::type_mismatch(
                    self.output_name(),
                    "numeric",
                    ty.to_string(),
                ))
            }
            (AggFunc::Mean, _) => ColumnType::Float64,
            (_, Some(ty)) => ty,
            (_, None) => ColumnType::Int64,
        };

        Ok(ResolvedAgg {
            func: self.func,
            position,
            output: Field::new(self.output_name(), output_type),
        })
    }
}

/// An aggregate bound to a concrete schema
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAgg {
    pub func: AggFunc,
    pub position: Option<usize>,
    pub output: Field,
}

impl ResolvedAgg {
    pub fn accumulator(&self) -> Accumulator {
        Accumulator::new(self.func, self.output.column_type)
    }

    /// Input cell of `row` for this aggregate; whole-row counts see a constant marker
    pub fn input<'a>(&self, row: &'a [Value]) -> &'a Value {
        const WHOLE_ROW: &Value = &Value::Boolean(true);
        match self.position {
            Some(pos) => &row[pos],
            None => WHOLE_ROW,
        }
    }
}

/// Incremental aggregate state
///
/// `value` can be read at any point, which lets running windows emit the
/// aggregate of every prefix without recomputation.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    func: AggFunc,
    output_type: ColumnType,
    rows: usize,
    valid: usize,
    int_sum: i64,
    float_sum: f64,
    extreme: Option<Value>,
}

impl Accumulator {
    pub fn new(func: AggFunc, output_type: ColumnType) -> Self {
        Accumulator {
            func,
            output_type,
            rows: 0,
            valid: 0,
            int_sum: 0,
            float_sum: 0.0,
            extreme: None,
        }
    }

    /// Fold one input value in
    ///
    /// An `Int64` sum that leaves the `i64` range is an [`Error::Overflow`].
    pub fn update(&mut self, value: &Value) -> Result<()> {
        self.rows += 1;
        if value.is_null() {
            return Ok(());
        }
        self.valid += 1;
        match self.func {
            AggFunc::Sum | AggFunc::Mean => match value {
                Value::Int64(v) => {
                    if self.func == AggFunc::Sum && self.output_type == ColumnType::Int64 {
                        self.int_sum = self.int_sum.checked_add(*v).ok_or_else(|| {
                            Error::Overflow(format!("sum of int64 values past {}", self.int_sum))
                        })?;
                    }
                    self.float_sum += *v as f64;
                }
                Value::Float64(v) => self.float_sum += v,
                // resolve() rejects non-numeric inputs
                _ => {}
            },
            AggFunc::Min => {
                if self.extreme.as_ref().map_or(true, |cur| value < cur) {
                    self.extreme = Some(value.clone());
                }
            }
            AggFunc::Max => {
                if self.extreme.as_ref().map_or(true, |cur| value > cur) {
                    self.extreme = Some(value.clone());
                }
            }
            AggFunc::Count => {}
        }
        Ok(())
    }

    pub fn value(&self) -> Value {
        match self.func {
            AggFunc::Count => Value::Int64(self.rows as i64),
            _ if self.valid == 0 => Value::Null,
            AggFunc::Sum => match self.output_type {
                ColumnType::Int64 => Value::Int64(self.int_sum),
                _ => Value::Float64(self.float_sum),
            },
            AggFunc::Mean => Value::Float64(self.float_sum / self.valid as f64),
            AggFunc::Min | AggFunc::Max => self.extreme.clone().unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_skips_nulls() {
        let mut acc = Accumulator::new(AggFunc::Mean, ColumnType::Float64);
        for v in [Value::from(10), Value::Null, Value::from(20)] {
            acc.update(&v).unwrap();
        }
        assert_eq!(acc.value(), Value::Float64(15.0));
    }

    #[test]
    fn test_count_includes_nulls() {
        let mut acc = Accumulator::new(AggFunc::Count, ColumnType::Int64);
        acc.update(&Value::Null).unwrap();
        acc.update(&Value::from(1)).unwrap();
        assert_eq!(acc.value(), Value::Int64(2));
    }

    #[test]
    fn test_all_null_sum_is_null() {
        let mut acc = Accumulator::new(AggFunc::Sum, ColumnType::Int64);
        acc.update(&Value::Null).unwrap();
        assert!(acc.value().is_null());
    }

    #[test]
    fn test_int_sum_overflow_is_an_error() {
        let mut acc = Accumulator::new(AggFunc::Sum, ColumnType::Int64);
        acc.update(&Value::Int64(i64::MAX)).unwrap();
        let err = acc.update(&Value::Int64(1)).unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }

    #[test]
    fn test_mean_does_not_overflow() {
        let mut acc = Accumulator::new(AggFunc::Mean, ColumnType::Float64);
        acc.update(&Value::Int64(i64::MAX)).unwrap();
        acc.update(&Value::Int64(i64::MAX)).unwrap();
        assert_eq!(acc.value(), Value::Float64(i64::MAX as f64));
    }

    #[test]
    fn test_default_output_names() {
        assert_eq!(AggSpec::sum("amount").output_name(), "sum(amount)");
        assert_eq!(AggSpec::count_all().output_name(), "count(1)");
        assert_eq!(
            AggSpec::avg("amount").alias("avg_sales").output_name(),
            "avg_sales"
        );
    }
}
