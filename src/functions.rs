//! Free-function shortcuts for building queries
//!
//! ```
//! use tablrs::functions::{avg, count_all, desc, sum};
//!
//! let aggs = vec![
//!     sum("amount").alias("total_sales"),
//!     avg("amount").alias("avg_sales"),
//!     count_all().alias("order_count"),
//! ];
//! assert_eq!(aggs[2].output_name(), "order_count");
//! assert!(desc("amount").descending);
//! ```

pub use crate::expr::{col, lit};

use crate::aggregate::AggSpec;
use crate::expr::Expr;
use crate::table::SortKey;
use crate::window::WindowFunction;

pub fn sum(column: &str) -> AggSpec {
    AggSpec::sum(column)
}

pub fn avg(column: &str) -> AggSpec {
    AggSpec::avg(column)
}

/// Rows per group; the column argument only names the output
pub fn count(column: &str) -> AggSpec {
    AggSpec::count(column)
}

/// `count(*)`
pub fn count_all() -> AggSpec {
    AggSpec::count_all()
}

pub fn min(column: &str) -> AggSpec {
    AggSpec::min(column)
}

pub fn max(column: &str) -> AggSpec {
    AggSpec::max(column)
}

pub fn row_number() -> WindowFunction {
    WindowFunction::row_number()
}

pub fn rank() -> WindowFunction {
    WindowFunction::rank()
}

pub fn dense_rank() -> WindowFunction {
    WindowFunction::dense_rank()
}

pub fn asc(column: &str) -> SortKey {
    SortKey::asc(column)
}

pub fn desc(column: &str) -> SortKey {
    SortKey::desc(column)
}

/// Parse a string column into dates
pub fn to_date(column: &str, format: &str) -> Expr {
    col(column).to_date(format)
}
