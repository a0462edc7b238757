use crate::join::compatible;
use quack_common::{InternalError, QuackResult};
use quack_model::{JoinKey, Row, RowValue, Variable};
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

/// Orders rows by the values of their join key columns.
///
/// Implementors only provide an order on values. The provided methods lift it to rows.
pub trait RowOrder<X: RowValue>: Send + Sync {
    /// Compares two values bound to `variable`.
    fn compare_values(&self, variable: &Variable, left: &X, right: &X) -> Ordering;

    /// Compares two rows under `key`, as required by the merge join.
    ///
    /// Join-compatible rows are always equal. Otherwise, the first key column (in key order) with
    /// differing values decides. Rows whose key values are all equal are equal.
    ///
    /// Both rows must bind every key variable unless they are compatible. Violating this contract
    /// results in an internal error.
    fn compare(&self, key: &JoinKey, left: &Row<X>, right: &Row<X>) -> QuackResult<Ordering> {
        if compatible(left, right) {
            return Ok(Ordering::Equal);
        }

        for variable in key {
            let left_value = left
                .get(variable)
                .ok_or_else(|| InternalError::unbound_key_variable(variable.clone()))?;
            let right_value = right
                .get(variable)
                .ok_or_else(|| InternalError::unbound_key_variable(variable.clone()))?;
            match self.compare_values(variable, left_value, right_value) {
                Ordering::Equal => {}
                ordering => return Ok(ordering),
            }
        }
        Ok(Ordering::Equal)
    }

    /// A total order on the key values of rows. Unbound key values order first.
    ///
    /// This order can be used to sort the inputs of a merge join.
    fn compare_keys(&self, key: &JoinKey, left: &Row<X>, right: &Row<X>) -> Ordering {
        for variable in key {
            let ordering = match (left.get(variable), right.get(variable)) {
                (Some(left_value), Some(right_value)) => {
                    self.compare_values(variable, left_value, right_value)
                }
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts `rows` by [Self::compare_keys]. The sort is stable.
    fn sort_rows(&self, key: &JoinKey, rows: &mut [Row<X>]) {
        rows.sort_by(|left, right| self.compare_keys(key, left, right));
    }
}

/// Orders values by their [Ord] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalRowOrder;

impl<X: RowValue + Ord> RowOrder<X> for NaturalRowOrder {
    fn compare_values(&self, _variable: &Variable, left: &X, right: &X) -> Ordering {
        left.cmp(right)
    }
}

/// Orders values with a caller-supplied comparator.
#[derive(Clone)]
pub struct FnRowOrder<F> {
    comparator: F,
}

impl<F> FnRowOrder<F> {
    /// Creates a new [FnRowOrder].
    pub fn new(comparator: F) -> Self {
        Self { comparator }
    }
}

impl<X, F> RowOrder<X> for FnRowOrder<F>
where
    X: RowValue,
    F: Fn(&X, &X) -> Ordering + Send + Sync,
{
    fn compare_values(&self, _variable: &Variable, left: &X, right: &X) -> Ordering {
        (self.comparator)(left, right)
    }
}

impl<F> Debug for FnRowOrder<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRowOrder").finish_non_exhaustive()
    }
}
