mod compat;
mod hash_join;
mod hashing;
mod merge_join;
mod nested_loop;
mod order;
mod probe_table;

pub use compat::{compatible, merge, merge_rows};
pub use hash_join::HashJoin;
pub use hashing::{binds_key, hash_row, FxRowHasher, RowHasher, NO_KEY_HASH};
pub use merge_join::MergeJoin;
pub use nested_loop::NestedLoopJoin;
pub use order::{FnRowOrder, NaturalRowOrder, RowOrder};
pub use probe_table::HashProbeTable;

use crate::JoinType;
use quack_common::{QuackResult, RowList};
use quack_model::{JoinKey, RowValue};

/// A join algorithm.
///
/// Implementations must produce the same multiset of rows for the same inputs. The order of the
/// output rows is implementation specific. The schema of the output is the union of both input
/// schemas.
///
/// Errors of the input producers that occur while the operator prepares the join (e.g., while
/// building a hash table) are returned directly. Errors that occur later are yielded by the
/// resulting [RowList].
pub trait JoinOperator<X: RowValue>: Send + Sync {
    /// Returns the name of the algorithm.
    fn name(&self) -> &'static str;

    /// Returns the semantics of this join.
    fn join_type(&self) -> JoinType;

    /// Joins `left` and `right` under `key`.
    fn join(&self, key: &JoinKey, left: RowList<X>, right: RowList<X>)
        -> QuackResult<RowList<X>>;
}
