//! Row expressions
//!
//! Expressions are small ASTs evaluated against one row at a time. They back
//! filter predicates, join exclusion conditions and computed columns:
//! - column references and literals
//! - comparisons with SQL `NULL` semantics
//! - `AND` / `OR` / `NOT` with three-valued logic
//! - arithmetic on `Int64` / `Float64`
//! - `to_date` parsing and regular expression matching
//!
//! Every expression can be type-checked against a [`Schema`] with
//! [`Expr::data_type`] before any row is touched.

use std::fmt;
use std::ops;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::table::RowView;
use crate::value::{ColumnType, Value};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

/// Expression AST node types
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference
    Column(String),
    /// Literal value
    Literal(Value),
    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// String to date conversion; unparseable input yields `NULL`
    ToDate { operand: Box<Expr>, format: String },
    /// Regular expression match on a string
    RLike { operand: Box<Expr>, pattern: Regex },
}

/// Reference a column by name
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Literal value
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    fn binary(self, op: BinaryOp, other: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(other),
        }
    }

    fn unary(self, op: UnaryOp) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(self),
        }
    }

    pub fn eq(self, other: Expr) -> Expr {
        self.binary(BinaryOp::Equal, other)
    }

    pub fn not_eq(self, other: Expr) -> Expr {
        self.binary(BinaryOp::NotEqual, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        self.binary(BinaryOp::LessThan, other)
    }

    pub fn lt_eq(self, other: Expr) -> Expr {
        self.binary(BinaryOp::LessThanOrEqual, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        self.binary(BinaryOp::GreaterThan, other)
    }

    pub fn gt_eq(self, other: Expr) -> Expr {
        self.binary(BinaryOp::GreaterThanOrEqual, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        self.binary(BinaryOp::Or, other)
    }

    pub fn is_null(self) -> Expr {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Expr {
        self.unary(UnaryOp::IsNotNull)
    }

    /// Parse a string column into dates using a chrono format string
    pub fn to_date(self, format: impl Into<String>) -> Expr {
        Expr::ToDate {
            operand: Box::new(self),
            format: format.into(),
        }
    }

    /// Regular expression match
    pub fn rlike(self, pattern: &str) -> Result<Expr> {
        Ok(Expr::RLike {
            operand: Box::new(self),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Result type of the expression against `schema`
    ///
    /// `Ok(None)` means the expression is an untyped `NULL`.
    pub fn data_type(&self, schema: &Schema) -> Result<Option<ColumnType>> {
        match self {
            Expr::Column(name) => Ok(Some(schema.column_type(name)?)),
            Expr::Literal(value) => Ok(value.column_type()),
            Expr::Binary { left, op, right } => {
                let lt = left.data_type(schema)?;
                let rt = right.data_type(schema)?;
                if op.is_comparison() {
                    if let (Some(a), Some(b)) = (lt, rt) {
                        if !a.is_comparable_with(&b) {
                            return Err(Error::type_mismatch(
                                format!("'{}'", self),
                                a.to_string(),
                                b.to_string(),
                            ));
                        }
                    }
                    return Ok(Some(ColumnType::Boolean));
                }
                match op {
                    BinaryOp::And | BinaryOp::Or => {
                        expect_type(self, lt, ColumnType::Boolean)?;
                        expect_type(self, rt, ColumnType::Boolean)?;
                        Ok(Some(ColumnType::Boolean))
                    }
                    BinaryOp::Divide => {
                        expect_numeric(self, lt)?;
                        expect_numeric(self, rt)?;
                        Ok(Some(ColumnType::Float64))
                    }
                    _ => {
                        expect_numeric(self, lt)?;
                        expect_numeric(self, rt)?;
                        Ok(match (lt, rt) {
                            (None, None) => None,
                            (Some(ColumnType::Float64), _) | (_, Some(ColumnType::Float64)) => {
                                Some(ColumnType::Float64)
                            }
                            _ => Some(ColumnType::Int64),
                        })
                    }
                }
            }
            Expr::Unary { op, operand } => {
                let ty = operand.data_type(schema)?;
                match op {
                    UnaryOp::Not => {
                        expect_type(self, ty, ColumnType::Boolean)?;
                        Ok(Some(ColumnType::Boolean))
                    }
                    UnaryOp::Negate => {
                        expect_numeric(self, ty)?;
                        Ok(ty)
                    }
                    UnaryOp::IsNull | UnaryOp::IsNotNull => Ok(Some(ColumnType::Boolean)),
                }
            }
            Expr::ToDate { operand, .. } => {
                match operand.data_type(schema)? {
                    None | Some(ColumnType::String) | Some(ColumnType::Date) => {}
                    Some(other) => {
                        return Err(Error::type_mismatch(
                            format!("'{}'", self),
                            "string",
                            other.to_string(),
                        ))
                    }
                }
                Ok(Some(ColumnType::Date))
            }
            Expr::RLike { operand, .. } => {
                expect_type(self, operand.data_type(schema)?, ColumnType::String)?;
                Ok(Some(ColumnType::Boolean))
            }
        }
    }

    /// Evaluate against one row
    pub fn evaluate(&self, row: &RowView<'_>) -> Result<Value> {
        match self {
            Expr::Column(name) => Ok(row.get(name)?.clone()),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Binary { left, op, right } => match op {
                BinaryOp::And => {
                    let l = as_bool(self, left.evaluate(row)?)?;
                    if l == Some(false) {
                        return Ok(Value::Boolean(false));
                    }
                    let r = as_bool(self, right.evaluate(row)?)?;
                    Ok(match (l, r) {
                        (_, Some(false)) => Value::Boolean(false),
                        (Some(true), Some(true)) => Value::Boolean(true),
                        _ => Value::Null,
                    })
                }
                BinaryOp::Or => {
                    let l = as_bool(self, left.evaluate(row)?)?;
                    if l == Some(true) {
                        return Ok(Value::Boolean(true));
                    }
                    let r = as_bool(self, right.evaluate(row)?)?;
                    Ok(match (l, r) {
                        (_, Some(true)) => Value::Boolean(true),
                        (Some(false), Some(false)) => Value::Boolean(false),
                        _ => Value::Null,
                    })
                }
                _ => {
                    let l = left.evaluate(row)?;
                    let r = right.evaluate(row)?;
                    if op.is_comparison() {
                        compare(*op, &l, &r)
                    } else {
                        arithmetic(self, *op, &l, &r)
                    }
                }
            },
            Expr::Unary { op, operand } => {
                let v = operand.evaluate(row)?;
                match op {
                    UnaryOp::IsNull => Ok(Value::Boolean(v.is_null())),
                    UnaryOp::IsNotNull => Ok(Value::Boolean(!v.is_null())),
                    UnaryOp::Not => Ok(match as_bool(self, v)? {
                        Some(b) => Value::Boolean(!b),
                        None => Value::Null,
                    }),
                    UnaryOp::Negate => match v {
                        Value::Null => Ok(Value::Null),
                        Value::Int64(i) => i
                            .checked_neg()
                            .map(Value::Int64)
                            .ok_or_else(|| Error::Overflow(format!("'{}' at {}", self, i))),
                        Value::Float64(f) => Ok(Value::Float64(-f)),
                        other => Err(Error::type_mismatch(
                            format!("'{}'", self),
                            "numeric",
                            other.type_name(),
                        )),
                    },
                }
            }
            Expr::ToDate { operand, format } => match operand.evaluate(row)? {
                Value::Null => Ok(Value::Null),
                Value::Date(d) => Ok(Value::Date(d)),
                Value::String(s) => Ok(NaiveDate::parse_from_str(s.trim(), format)
                    .map(Value::Date)
                    .unwrap_or(Value::Null)),
                other => Err(Error::type_mismatch(
                    format!("'{}'", self),
                    "string",
                    other.type_name(),
                )),
            },
            Expr::RLike { operand, pattern } => match operand.evaluate(row)? {
                Value::Null => Ok(Value::Null),
                Value::String(s) => Ok(Value::Boolean(pattern.is_match(&s))),
                other => Err(Error::type_mismatch(
                    format!("'{}'", self),
                    "string",
                    other.type_name(),
                )),
            },
        }
    }
}

fn expect_type(expr: &Expr, actual: Option<ColumnType>, expected: ColumnType) -> Result<()> {
    match actual {
        Some(ty) if ty != expected => Err(Error::type_mismatch(
            format!("'{}'", expr),
            expected.to_string(),
            ty.to_string(),
        )),
        _ => Ok(()),
    }
}

fn expect_numeric(expr: &Expr, actual: Option<ColumnType>) -> Result<()> {
    match actual {
        Some(ty) if !ty.is_numeric() => Err(Error::type_mismatch(
            format!("'{}'", expr),
            "numeric",
            ty.to_string(),
        )),
        _ => Ok(()),
    }
}

fn as_bool(expr: &Expr, value: Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(b)),
        other => Err(Error::type_mismatch(
            format!("'{}'", expr),
            "boolean",
            other.type_name(),
        )),
    }
}

fn compare(op: BinaryOp, l: &Value, r: &Value) -> Result<Value> {
    use std::cmp::Ordering::*;

    let ord = match l.compare(r)? {
        Some(ord) => ord,
        None => return Ok(Value::Null),
    };
    let result = match op {
        BinaryOp::Equal => ord == Equal,
        BinaryOp::NotEqual => ord != Equal,
        BinaryOp::LessThan => ord == Less,
        BinaryOp::LessThanOrEqual => ord != Greater,
        BinaryOp::GreaterThan => ord == Greater,
        BinaryOp::GreaterThanOrEqual => ord != Less,
        _ => {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a comparison operator",
                op.symbol()
            )))
        }
    };
    Ok(Value::Boolean(result))
}

fn arithmetic(expr: &Expr, op: BinaryOp, l: &Value, r: &Value) -> Result<Value> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    if let (Value::Int64(a), Value::Int64(b), false) = (l, r, op == BinaryOp::Divide) {
        let result = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Subtract => a.checked_sub(*b),
            _ => a.checked_mul(*b),
        };
        return result
            .map(Value::Int64)
            .ok_or_else(|| Error::Overflow(format!("'{}' with {} and {}", expr, a, b)));
    }
    let (a, b) = match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            let found = if l.as_f64().is_none() { l } else { r };
            return Err(Error::type_mismatch(
                format!("'{}'", expr),
                "numeric",
                found.type_name(),
            ));
        }
    };
    Ok(match op {
        BinaryOp::Add => Value::Float64(a + b),
        BinaryOp::Subtract => Value::Float64(a - b),
        BinaryOp::Multiply => Value::Float64(a * b),
        // division by zero yields NULL
        _ if b == 0.0 => Value::Null,
        _ => Value::Float64(a / b),
    })
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Subtract, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Multiply, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Divide, rhs)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Negate)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(Value::String(s)) => write!(f, "'{}'", s),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "(NOT {})", operand),
                UnaryOp::Negate => write!(f, "(- {})", operand),
                UnaryOp::IsNull => write!(f, "({} IS NULL)", operand),
                UnaryOp::IsNotNull => write!(f, "({} IS NOT NULL)", operand),
            },
            Expr::ToDate { operand, format } => write!(f, "to_date({}, '{}')", operand, format),
            Expr::RLike { operand, pattern } => {
                write!(f, "({} RLIKE '{}')", operand, pattern.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn schema() -> Schema {
        Schema::from_pairs(&[
            ("amount", ColumnType::Int64),
            ("city", ColumnType::String),
            ("flag", ColumnType::Boolean),
        ])
        .unwrap()
    }

    fn eval(expr: &Expr, values: &[Value]) -> Value {
        let schema = schema();
        expr.evaluate(&RowView::new(&schema, values)).unwrap()
    }

    #[test]
    fn test_int_arithmetic_overflow() {
        let schema = schema();
        let row = [Value::Int64(i64::MAX), Value::Null, Value::Null];
        let view = RowView::new(&schema, &row);

        let sum = (col("amount") + lit(1)).evaluate(&view);
        assert!(matches!(sum, Err(Error::Overflow(_))));
        let product = (col("amount") * lit(2)).evaluate(&view);
        assert!(matches!(product, Err(Error::Overflow(_))));
        assert_eq!(eval(&(col("amount") - lit(1)), &row), Value::Int64(i64::MAX - 1));

        let row = [Value::Int64(i64::MIN), Value::Null, Value::Null];
        let negated = (-col("amount")).evaluate(&RowView::new(&schema, &row));
        assert!(matches!(negated, Err(Error::Overflow(_))));
    }

    #[test]
    fn test_three_valued_and_or() {
        let row = [Value::Null, Value::from("Delhi"), Value::Null];
        assert_eq!(eval(&col("flag").and(lit(false)), &row), Value::Boolean(false));
        assert_eq!(eval(&col("flag").and(lit(true)), &row), Value::Null);
        assert_eq!(eval(&col("flag").or(lit(true)), &row), Value::Boolean(true));
        assert_eq!(eval(&!col("flag"), &row), Value::Null);
    }

    #[test]
    fn test_comparison_with_null_is_null() {
        let row = [Value::Null, Value::from("Delhi"), Value::from(true)];
        assert_eq!(eval(&col("amount").gt(lit(2000)), &row), Value::Null);
        assert_eq!(eval(&col("amount").is_null(), &row), Value::Boolean(true));
    }

    #[test]
    fn test_arithmetic_types() {
        let row = [Value::from(10), Value::from("x"), Value::from(true)];
        assert_eq!(eval(&(col("amount") + lit(5)), &row), Value::Int64(15));
        assert_eq!(eval(&(col("amount") * lit(0.5)), &row), Value::Float64(5.0));
        assert_eq!(eval(&(col("amount") / lit(4)), &row), Value::Float64(2.5));
        assert_eq!(eval(&(col("amount") / lit(0)), &row), Value::Null);
    }

    #[test]
    fn test_data_type_rejects_bad_comparison() {
        let err = col("city").gt(lit(5)).data_type(&schema()).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_data_type_missing_column() {
        let err = col("price").gt(lit(5)).data_type(&schema()).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(ref c) if c == "price"));
    }

    #[test]
    fn test_rlike() {
        let row = [Value::from(1), Value::from("Bangalore"), Value::from(true)];
        let expr = col("city").rlike("^Ban").unwrap();
        assert_eq!(eval(&expr, &row), Value::Boolean(true));
        assert!(col("city").rlike("(").is_err());
    }

    #[test]
    fn test_to_date_unparseable_is_null() {
        let row = [Value::from(1), Value::from("not a date"), Value::from(true)];
        assert_eq!(eval(&col("city").to_date("%Y-%m-%d"), &row), Value::Null);
    }

    #[test]
    fn test_display() {
        let expr = col("a.city").eq(col("b.city")).and(col("amount").gt(lit(2000)));
        assert_eq!(expr.to_string(), "((a.city = b.city) AND (amount > 2000))");
    }
}
