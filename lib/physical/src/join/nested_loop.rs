use crate::join::{merge_rows, JoinOperator};
use crate::JoinType;
use quack_common::{merge_variables, QuackResult, RowList, RowListIntoIter};
use quack_model::{JoinKey, Row, RowValue};

/// Joins two row lists by comparing every pair of rows.
///
/// The right side is materialized, the left side is streamed. This join does not use the key at
/// all and is the reference implementation that the other algorithms are tested against.
#[derive(Clone, Copy, Debug, Default)]
pub struct NestedLoopJoin {
    join_type: JoinType,
}

impl NestedLoopJoin {
    /// Creates a new [NestedLoopJoin].
    pub fn new(join_type: JoinType) -> Self {
        Self { join_type }
    }
}

impl<X: RowValue> JoinOperator<X> for NestedLoopJoin {
    fn name(&self) -> &'static str {
        "nested-loop"
    }

    fn join_type(&self) -> JoinType {
        self.join_type
    }

    fn join(
        &self,
        key: &JoinKey,
        left: RowList<X>,
        right: RowList<X>,
    ) -> QuackResult<RowList<X>> {
        let variables = merge_variables(left.variables(), right.variables());
        let inner = right.materialize()?;
        tracing::debug!(
            %key,
            join_type = %self.join_type,
            inner_rows = inner.len(),
            "Executing nested-loop join"
        );

        let iterator = NestedLoopJoinIterator {
            outer: left.into_iter(),
            inner,
            current: None,
            position: 0,
            matched: false,
            join_type: self.join_type,
        };
        Ok(RowList::from_stream(variables, iterator))
    }
}

/// Streams the outer side and scans the materialized inner side for every outer row.
struct NestedLoopJoinIterator<X> {
    outer: RowListIntoIter<X>,
    inner: Vec<Row<X>>,
    /// The outer row that is currently joined.
    current: Option<Row<X>>,
    /// The next inner row to compare with [Self::current].
    position: usize,
    /// Whether [Self::current] merged with any inner row.
    matched: bool,
    join_type: JoinType,
}

impl<X: RowValue> Iterator for NestedLoopJoinIterator<X> {
    type Item = QuackResult<Row<X>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                match self.outer.next()? {
                    Ok(row) => {
                        self.current = Some(row);
                        self.position = 0;
                        self.matched = false;
                    }
                    Err(error) => return Some(Err(error)),
                }
            }

            let outer = self.current.as_ref()?;
            while let Some(candidate) = self.inner.get(self.position) {
                self.position += 1;
                if let Some(merged) = merge_rows(outer, candidate) {
                    self.matched = true;
                    return Some(Ok(merged));
                }
            }

            let outer = self.current.take()?;
            if self.join_type == JoinType::LeftOuter && !self.matched {
                return Some(Ok(outer));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use itertools::Itertools;
    use quack_common::QuackError;
    use quack_model::{RowBuilder, Variable};
    use std::io;

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn row(bindings: &[(&str, i64)]) -> Row<i64> {
        let mut builder = RowBuilder::new();
        for (name, value) in bindings {
            builder.add(var(name), *value).unwrap();
        }
        builder.build()
    }

    fn list(rows: Vec<Row<i64>>) -> RowList<i64> {
        let variables = rows
            .iter()
            .flat_map(|row| row.variables().cloned().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        RowList::from_rows(variables, rows)
    }

    fn render(list: RowList<i64>) -> String {
        list.materialize()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .sorted()
            .join("\n")
    }

    #[test]
    fn joins_on_shared_variable() {
        let left = list(vec![
            row(&[("a", 1), ("b", 2)]),
            row(&[("a", 1), ("b", 3)]),
            row(&[("a", 1), ("b", 2)]),
        ]);
        let right = list(vec![row(&[("a", 0), ("d", 8)]), row(&[("a", 1), ("c", 9)])]);

        let result = NestedLoopJoin::default()
            .join(&JoinKey::empty(), left, right)
            .unwrap();

        assert_eq!(
            result.variables(),
            &[var("a"), var("b"), var("c"), var("d")]
        );
        assert_snapshot!(render(result), @r"
        ( ?a = 1 ?b = 2 ?c = 9 )
        ( ?a = 1 ?b = 2 ?c = 9 )
        ( ?a = 1 ?b = 3 ?c = 9 )
        ");
    }

    #[test]
    fn left_outer_keeps_unmatched_rows() {
        let left = list(vec![row(&[("a", 1)]), row(&[("a", 2)])]);
        let right = list(vec![row(&[("a", 1), ("c", 9)])]);

        let result = NestedLoopJoin::new(JoinType::LeftOuter)
            .join(&JoinKey::empty(), left, right)
            .unwrap();

        assert_snapshot!(render(result), @r"
        ( ?a = 1 ?c = 9 )
        ( ?a = 2 )
        ");
    }

    #[test]
    fn inner_side_error_is_returned() {
        let left = list(vec![row(&[("a", 1)])]);
        let right = RowList::from_stream(
            [var("a")],
            vec![Err(QuackError::upstream(io::Error::other("scan failed")))],
        );

        let result = NestedLoopJoin::default().join(&JoinKey::empty(), left, right);
        assert!(matches!(result, Err(QuackError::Upstream(_))));
    }

    #[test]
    fn outer_side_error_is_yielded() {
        let left = RowList::from_stream(
            [var("a")],
            vec![
                Ok(row(&[("a", 1)])),
                Err(QuackError::upstream(io::Error::other("scan failed"))),
            ],
        );
        let right = list(vec![row(&[("a", 1)])]);

        let result = NestedLoopJoin::default()
            .join(&JoinKey::empty(), left, right)
            .unwrap()
            .materialize();
        assert!(matches!(result, Err(QuackError::Upstream(_))));
    }
}
