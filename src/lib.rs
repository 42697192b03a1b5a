//! Single-process analytical tables
//!
//! Immutable [`Table`]s and the operators that transform them:
//! - [`GroupByAggregator`]: grouped sum / avg / count / min / max
//! - [`WindowEngine`]: running aggregates and ranking over ordered partitions
//! - [`RankAssigner`]: dense rank, rank and row number
//! - [`Filter`]: predicate filtering with [`Expr`]
//! - [`EquiJoinExecutor`]: hash equi-joins, including aliased self-joins
//!
//! Every operator returns a new table and never mutates its input.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod expr;
pub mod filter;
pub mod functions;
pub mod groupby;
pub mod io;
pub mod join;
pub mod rank;
pub mod schema;
pub mod table;
pub mod value;
pub mod window;

// Re-export commonly used types
pub use aggregate::{AggFunc, AggSpec, AggTarget};
pub use config::EngineConfig;
pub use error::{Error, ErrorKind, Result, TablrsError};
pub use expr::{col, lit, Expr};
pub use filter::Filter;
pub use groupby::{GroupByAggregator, GroupedTable};
pub use join::{EquiJoinExecutor, JoinSpec, JoinType};
pub use rank::{RankAssigner, RankKind};
pub use schema::{Field, Schema};
pub use table::{Row, RowView, SortKey, Table};
pub use value::{ColumnType, Value};
pub use window::{WindowEngine, WindowFrame, WindowFunction, WindowSpec};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
