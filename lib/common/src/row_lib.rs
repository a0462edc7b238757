//! Factory functions for rows and row lists.

use crate::{QuackResult, RowList, RowListBuilder};
use quack_model::{Row, RowBuilder, RowValue, Variable};

/// Returns the identity row (no bindings).
pub fn identity_row<X: RowValue>() -> Row<X> {
    Row::identity()
}

/// Returns the row list that contains only the identity row. This is the neutral starting point of
/// a chain of joins.
pub fn identity_row_list<X: RowValue>() -> RowList<X> {
    RowList::identity()
}

/// Returns the row list without rows. Joining anything with it yields no rows.
pub fn empty_row_list<X: RowValue>() -> RowList<X> {
    RowList::empty()
}

/// Wraps an externally produced iterator and its declared schema into a [RowList] without
/// materializing it.
pub fn create_row_list<X, I>(variables: impl IntoIterator<Item = Variable>, rows: I) -> RowList<X>
where
    X: RowValue,
    I: IntoIterator<Item = QuackResult<Row<X>>>,
    I::IntoIter: Send + 'static,
{
    RowList::from_stream(variables, rows)
}

/// Returns a new, empty [RowBuilder].
pub fn create_row_builder<X: RowValue>() -> RowBuilder<X> {
    RowBuilder::new()
}

/// Returns a new, empty [RowListBuilder].
pub fn create_row_list_builder<X: RowValue>() -> RowListBuilder<X> {
    RowListBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuackError;
    use std::io;

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    #[test]
    fn identity_and_empty_lists() {
        assert!(identity_row_list::<i64>().is_identity());
        assert!(empty_row_list::<i64>().is_empty());
        assert!(identity_row::<i64>().is_empty());
    }

    #[test]
    fn create_row_list_keeps_stream_lazy() {
        let list = create_row_list::<i64, _>(
            [var("b"), var("a")],
            vec![Err(QuackError::upstream(io::Error::other("not pulled yet")))],
        );

        assert!(!list.is_materialized());
        assert_eq!(list.variables(), &[var("a"), var("b")]);
        assert!(list.materialize().is_err());
    }

    #[test]
    fn builders_produce_rows_and_lists() {
        let mut row = create_row_builder();
        row.add(var("a"), 1).unwrap();

        let mut list = create_row_list_builder();
        list.add_row(row.build()).add_row(identity_row());
        let list = list.build();

        assert_eq!(list.variables(), &[var("a")]);
        assert_eq!(list.len(), Some(2));
    }
}
