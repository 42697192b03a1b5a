//! Ranking within ordered partitions
//!
//! Dense rank is the one that matters most here: equal order keys share a
//! rank and the next distinct key is exactly one higher, however many rows
//! shared the previous rank. `rank` (gaps after ties) and `row_number` are
//! provided alongside.

use crate::error::{Error, Result};
use crate::table::{SortKey, Table};
use crate::value::Value;
use crate::window::{WindowEngine, WindowFunction, WindowSpec};

/// Ranking flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKind {
    /// 1, 2, 3, ... in sorted order, ties broken by input order
    RowNumber,
    /// Ties share a rank, the following rank skips the tied positions
    Rank,
    /// Ties share a rank, no gaps
    DenseRank,
}

/// Ranks for one partition whose order keys are already sorted
///
/// `sorted_keys[i]` is the order-key tuple of the row at sorted position `i`.
pub fn assign_ranks(kind: RankKind, sorted_keys: &[Vec<Value>]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(sorted_keys.len());
    let mut current = 0i64;

    for (pos, key) in sorted_keys.iter().enumerate() {
        let new_peer_group = pos == 0 || sorted_keys[pos - 1] != *key;
        current = match kind {
            RankKind::RowNumber => pos as i64 + 1,
            RankKind::Rank if new_peer_group => pos as i64 + 1,
            RankKind::DenseRank if new_peer_group => current + 1,
            _ => current,
        };
        ranks.push(current);
    }

    ranks
}

/// Adds a rank column computed per partition
#[derive(Debug, Clone)]
pub struct RankAssigner {
    kind: RankKind,
    partition_by: Vec<String>,
    order_by: Vec<SortKey>,
}

impl RankAssigner {
    pub fn new<S: AsRef<str>>(kind: RankKind, partition_by: &[S], order_by: Vec<SortKey>) -> Self {
        RankAssigner {
            kind,
            partition_by: partition_by.iter().map(|s| s.as_ref().to_string()).collect(),
            order_by,
        }
    }

    /// Dense rank; direction comes from each [`SortKey`]
    pub fn dense<S: AsRef<str>>(partition_by: &[S], order_by: Vec<SortKey>) -> Self {
        Self::new(RankKind::DenseRank, partition_by, order_by)
    }

    pub fn kind(&self) -> RankKind {
        self.kind
    }

    /// Append the rank as column `output`
    pub fn assign(&self, table: &Table, output: &str) -> Result<Table> {
        if self.order_by.is_empty() {
            return Err(Error::InvalidInput(
                "ranking requires at least one order key".to_string(),
            ));
        }
        let spec = WindowSpec::new()
            .partition_by(&self.partition_by)
            .order_by(self.order_by.clone());
        WindowEngine::new(spec).compute(table, &[(output, WindowFunction::Ranking(self.kind))])
    }
}
