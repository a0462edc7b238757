use crate::join::{merge_rows, FxRowHasher, HashProbeTable, JoinOperator, RowHasher};
use crate::{BuildSide, JoinType};
use quack_common::{merge_variables, QuackResult, RowList, RowListIntoIter};
use quack_model::{JoinKey, Row, RowValue};
use std::collections::VecDeque;

/// Joins two row lists by indexing one side in a [HashProbeTable] and probing it with the rows of
/// the other side.
///
/// The build side is materialized before the join returns. The probe side is streamed. With the
/// empty key, or with a key that the rows do not bind, every row lands in the no-key bucket and
/// the join degrades to a nested loop. The result is still correct.
#[derive(Clone, Debug, Default)]
pub struct HashJoin<H = FxRowHasher> {
    hasher: H,
    join_type: JoinType,
    build_side: BuildSide,
}

impl<H> HashJoin<H> {
    /// Creates a new inner [HashJoin] that builds the smaller side.
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            join_type: JoinType::Inner,
            build_side: BuildSide::Smaller,
        }
    }

    /// Sets the join type.
    #[must_use]
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Sets the build side. Ignored for left-outer joins, which always build the right side.
    #[must_use]
    pub fn with_build_side(mut self, build_side: BuildSide) -> Self {
        self.build_side = build_side;
        self
    }

    /// Decides whether the left side is built.
    fn builds_left(&self, left_len: Option<usize>, right_len: Option<usize>) -> bool {
        if self.join_type == JoinType::LeftOuter {
            return false;
        }

        match self.build_side {
            BuildSide::Left => true,
            BuildSide::Right => false,
            BuildSide::Smaller => match (left_len, right_len) {
                (Some(left_len), Some(right_len)) => left_len <= right_len,
                (None, Some(_)) => false,
                _ => true,
            },
        }
    }
}

impl<X, H> JoinOperator<X> for HashJoin<H>
where
    X: RowValue,
    H: RowHasher<X> + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "hash"
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
        let builds_left = self.builds_left(left.len(), right.len());
        let (build, probe) = if builds_left {
            (left, right)
        } else {
            (right, left)
        };

        let mut table = HashProbeTable::new(key.clone());
        for row in build {
            table.insert(&self.hasher, row?);
        }
        tracing::debug!(
            %key,
            join_type = %self.join_type,
            build_side = if builds_left { "left" } else { "right" },
            build_rows = table.len(),
            buckets = table.num_buckets(),
            no_key_rows = table.num_no_key_rows(),
            "Built hash join table"
        );

        let iterator = HashJoinIterator {
            probe: probe.into_iter(),
            table,
            hasher: self.hasher.clone(),
            join_type: self.join_type,
            pending: VecDeque::new(),
        };
        Ok(RowList::from_stream(variables, iterator))
    }
}

/// Probes the table with one row at a time and buffers the merged candidates of that row.
struct HashJoinIterator<X, H> {
    probe: RowListIntoIter<X>,
    table: HashProbeTable<X>,
    hasher: H,
    join_type: JoinType,
    pending: VecDeque<Row<X>>,
}

impl<X, H> Iterator for HashJoinIterator<X, H>
where
    X: RowValue,
    H: RowHasher<X>,
{
    type Item = QuackResult<Row<X>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(Ok(row));
            }

            let probe = match self.probe.next()? {
                Ok(probe) => probe,
                Err(error) => return Some(Err(error)),
            };
            for candidate in self.table.candidates(&self.hasher, &probe) {
                if let Some(merged) = merge_rows(&probe, candidate) {
                    self.pending.push_back(merged);
                }
            }

            if self.pending.is_empty() && self.join_type == JoinType::LeftOuter {
                return Some(Ok(probe));
            }
        }
    }
}
