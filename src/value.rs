//! Typed cell values
//!
//! [`Value`] is the unit stored in every table cell. It carries two notions of
//! comparison:
//! - a total, structural ordering (`Ord`/`Eq`/`Hash`) used for grouping,
//!   partitioning, join keys and sorting
//! - SQL comparison ([`Value::compare`]) used by predicates, which coerces
//!   between `Int64` and `Float64` and rejects incompatible types

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    String,
    Boolean,
    Date,
}

impl ColumnType {
    /// Whether arithmetic aggregates accept this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    /// Whether values of `self` and `other` can be compared with each other
    pub fn is_comparable_with(&self, other: &ColumnType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// A single cell value
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    Boolean(bool),
    Date(NaiveDate),
    String(String),
}

impl Value {
    /// Type of the value, `None` for `Null`
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(ColumnType::Int64),
            Value::Float64(_) => Some(ColumnType::Float64),
            Value::String(_) => Some(ColumnType::String),
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Date(_) => Some(ColumnType::Date),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether this value may be stored in a column of type `ty`
    pub fn conforms_to(&self, ty: ColumnType) -> bool {
        match self.column_type() {
            None => true,
            Some(own) => own == ty,
        }
    }

    /// SQL comparison
    ///
    /// Returns `Ok(None)` when either side is `Null`. `Int64` and `Float64`
    /// compare numerically; any other pair of distinct types is a type error.
    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>> {
        if self.is_null() || other.is_null() {
            return Ok(None);
        }
        let ordering = match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => float_cmp(*a, *b),
            (Value::Int64(a), Value::Float64(b)) => int_float_cmp(*a, *b),
            (Value::Float64(a), Value::Int64(b)) => int_float_cmp(*b, *a).reverse(),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => {
                return Err(Error::type_mismatch(
                    "comparison",
                    self.type_name(),
                    other.type_name(),
                ))
            }
        };
        Ok(Some(ordering))
    }

    /// Parse a textual cell into a value of type `ty`
    ///
    /// Empty input becomes `Null`. Dates use `date_format` (chrono syntax).
    pub fn parse(text: &str, ty: ColumnType, date_format: &str) -> Result<Value> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let cast_err = || Error::Cast(format!("cannot parse '{}' as {}", text, ty));
        match ty {
            ColumnType::Int64 => text.parse::<i64>().map(Value::Int64).map_err(|_| cast_err()),
            ColumnType::Float64 => text.parse::<f64>().map(Value::Float64).map_err(|_| cast_err()),
            ColumnType::String => Ok(Value::String(text.to_string())),
            ColumnType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(Error::Cast(format!("cannot parse '{}' as boolean", text))),
            },
            ColumnType::Date => NaiveDate::parse_from_str(text, date_format)
                .map(Value::Date)
                .map_err(|e| Error::Cast(format!("cannot parse '{}' as date: {}", text, e))),
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self.column_type() {
            Some(ty) => ty.to_string(),
            None => "null".to_string(),
        }
    }

    // Position of the variant in the cross-type total order
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) => 2,
            Value::Float64(_) => 3,
            Value::Date(_) => 4,
            Value::String(_) => 5,
        }
    }
}

// -0.0 and 0.0 are one value
fn positive_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn float_cmp(a: f64, b: f64) -> Ordering {
    positive_zero(a).total_cmp(&positive_zero(b))
}

// Exact: no rounding of `i` to the nearest f64
fn int_float_cmp(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return (i as f64).total_cmp(&f);
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        ord => ord,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Null sorts first. Floats use IEEE total order so NaN groups with NaN.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => float_cmp(*a, *b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => positive_zero(*v).to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
