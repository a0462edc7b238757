use quack_model::{Row, RowBuilder, RowValue};
use std::cmp::Ordering;

/// Returns whether `left` and `right` agree on every variable that both of them bind.
///
/// Variables that are bound by only one of the rows impose no constraint. Hence, the identity row
/// is compatible with every row. The relation is symmetric but not transitive.
pub fn compatible<X: RowValue>(left: &Row<X>, right: &Row<X>) -> bool {
    let left = left.bindings();
    let right = right.bindings();

    let (mut left_idx, mut right_idx) = (0, 0);
    while left_idx < left.len() && right_idx < right.len() {
        let (left_variable, left_value) = &left[left_idx];
        let (right_variable, right_value) = &right[right_idx];
        match left_variable.cmp(right_variable) {
            Ordering::Less => left_idx += 1,
            Ordering::Greater => right_idx += 1,
            Ordering::Equal => {
                if left_value != right_value {
                    return false;
                }
                left_idx += 1;
                right_idx += 1;
            }
        }
    }
    true
}

/// Merges two rows into a row that holds the union of their bindings.
///
/// Returns [None] iff the rows are not [compatible]. The result does not depend on the argument
/// order. `builder` is cleared before use, so it may be a recycled builder. The input rows are not
/// modified.
pub fn merge<X: RowValue>(
    left: &Row<X>,
    right: &Row<X>,
    mut builder: RowBuilder<X>,
) -> Option<Row<X>> {
    builder.clear();
    // A conflict on a shared variable is exactly an incompatibility.
    let conflict = builder
        .add_row(left)
        .and_then(|builder| builder.add_row(right))
        .is_err();
    if conflict {
        return None;
    }
    Some(builder.build())
}

/// Like [merge], with a fresh [RowBuilder] that is only allocated for compatible rows.
pub fn merge_rows<X: RowValue>(left: &Row<X>, right: &Row<X>) -> Option<Row<X>> {
    if !compatible(left, right) {
        return None;
    }
    merge(
        left,
        right,
        RowBuilder::with_capacity(left.len() + right.len()),
    )
}
