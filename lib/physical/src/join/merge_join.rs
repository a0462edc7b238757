use crate::join::{binds_key, merge_rows, JoinOperator, NaturalRowOrder, NestedLoopJoin, RowOrder};
use crate::{JoinType, UnsortedInputPolicy};
use quack_common::{merge_variables, QuackError, QuackResult, RowList, RowListIntoIter};
use quack_model::{JoinKey, Row, RowValue};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Joins two row lists that are sorted by the join key in a single merge pass.
///
/// Both inputs must be sorted consistently with the [RowOrder] of the join (e.g., with
/// [RowOrder::sort_rows]). The join keeps one cursor per side and compares the current rows. The
/// smaller key-group is skipped. If both rows are equal, the key-groups of both sides are buffered
/// and their full cross merge is emitted.
///
/// What happens with unsorted input is configured with an [UnsortedInputPolicy].
#[derive(Clone, Debug, Default)]
pub struct MergeJoin<O = NaturalRowOrder> {
    order: O,
    join_type: JoinType,
    unsorted_input: UnsortedInputPolicy,
}

impl<O> MergeJoin<O> {
    /// Creates a new inner [MergeJoin] with the [UnsortedInputPolicy::Fallback] policy.
    pub fn new(order: O) -> Self {
        Self {
            order,
            join_type: JoinType::Inner,
            unsorted_input: UnsortedInputPolicy::Fallback,
        }
    }

    /// Sets the join type.
    #[must_use]
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Sets how inputs that are not sorted by the join key are handled.
    #[must_use]
    pub fn with_unsorted_input(mut self, unsorted_input: UnsortedInputPolicy) -> Self {
        self.unsorted_input = unsorted_input;
        self
    }
}

impl<X, O> JoinOperator<X> for MergeJoin<O>
where
    X: RowValue,
    O: RowOrder<X> + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "merge"
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
        tracing::debug!(
            %key,
            join_type = %self.join_type,
            unsorted_input = %self.unsorted_input,
            "Executing merge join"
        );

        if self.unsorted_input == UnsortedInputPolicy::Trust {
            let iterator = self.merge_iterator(key, left.into_iter(), right.into_iter());
            return Ok(RowList::from_stream(variables, iterator));
        }

        let left_variables = left.variables().to_vec();
        let right_variables = right.variables().to_vec();
        let left_rows = left.materialize()?;
        let right_rows = right.materialize()?;

        let sortedness = check_sorted(&self.order, key, &left_rows, "left")
            .and_then(|()| check_sorted(&self.order, key, &right_rows, "right"));
        if let Err(reason) = sortedness {
            if self.unsorted_input == UnsortedInputPolicy::Reject {
                return Err(QuackError::UnsortedInput(reason));
            }

            tracing::warn!(
                %key,
                %reason,
                "Merge join input is unsorted, using nested loop instead"
            );
            return NestedLoopJoin::new(self.join_type).join(
                key,
                RowList::from_rows(left_variables, left_rows),
                RowList::from_rows(right_variables, right_rows),
            );
        }

        let iterator = self.merge_iterator(
            key,
            RowList::from_rows(left_variables, left_rows).into_iter(),
            RowList::from_rows(right_variables, right_rows).into_iter(),
        );
        Ok(RowList::from_stream(variables, iterator))
    }
}

impl<O: Clone> MergeJoin<O> {
    fn merge_iterator<X: RowValue>(
        &self,
        key: &JoinKey,
        left: RowListIntoIter<X>,
        right: RowListIntoIter<X>,
    ) -> MergeJoinIterator<X, O> {
        MergeJoinIterator {
            key: key.clone(),
            order: self.order.clone(),
            join_type: self.join_type,
            left,
            left_head: None,
            right,
            right_head: None,
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

/// Checks that every row binds the key and that the rows are sorted by
/// [RowOrder::compare_keys].
///
/// Together, these conditions guarantee that [RowOrder::compare] never fails and that equal-key
/// rows are adjacent.
fn check_sorted<X: RowValue, O: RowOrder<X>>(
    order: &O,
    key: &JoinKey,
    rows: &[Row<X>],
    side: &str,
) -> Result<(), String> {
    if let Some(idx) = rows.iter().position(|row| !binds_key(key, row)) {
        return Err(format!("{side} row {idx} does not bind every variable of {key}"));
    }

    if let Some(idx) = rows
        .windows(2)
        .position(|pair| order.compare_keys(key, &pair[0], &pair[1]) == Ordering::Greater)
    {
        return Err(format!("{side} row {} is out of order", idx + 1));
    }

    Ok(())
}

struct MergeJoinIterator<X, O> {
    key: JoinKey,
    order: O,
    join_type: JoinType,
    left: RowListIntoIter<X>,
    /// The first row of the next left key-group.
    left_head: Option<Row<X>>,
    right: RowListIntoIter<X>,
    /// The first row of the next right key-group.
    right_head: Option<Row<X>>,
    /// Results of the last processed key-groups.
    pending: VecDeque<Row<X>>,
    finished: bool,
}

impl<X: RowValue, O: RowOrder<X>> MergeJoinIterator<X, O> {
    /// Processes the next pair of key-groups. Returns `false` once there is nothing left to join.
    fn advance(&mut self) -> QuackResult<bool> {
        fill_head(&mut self.left, &mut self.left_head)?;
        fill_head(&mut self.right, &mut self.right_head)?;

        let ordering = match (&self.left_head, &self.right_head) {
            (None, _) => return Ok(false),
            (Some(_), None) => {
                if self.join_type == JoinType::Inner {
                    return Ok(false);
                }
                // Left outer: the remaining left rows have no partner.
                if let Some(row) = self.left_head.take() {
                    self.pending.push_back(row);
                }
                return Ok(true);
            }
            (Some(left), Some(right)) => self.order.compare(&self.key, left, right)?,
        };

        match ordering {
            Ordering::Less => {
                let group =
                    next_group(&self.order, &self.key, &mut self.left, &mut self.left_head)?;
                if self.join_type == JoinType::LeftOuter {
                    self.pending.extend(group);
                }
            }
            Ordering::Greater => {
                next_group(&self.order, &self.key, &mut self.right, &mut self.right_head)?;
            }
            Ordering::Equal => {
                let left_group =
                    next_group(&self.order, &self.key, &mut self.left, &mut self.left_head)?;
                let right_group =
                    next_group(&self.order, &self.key, &mut self.right, &mut self.right_head)?;
                self.cross_merge(left_group, &right_group);
            }
        }
        Ok(true)
    }

    /// Emits the merge of every compatible pair of the two key-groups.
    fn cross_merge(&mut self, left_group: Vec<Row<X>>, right_group: &[Row<X>]) {
        for left in left_group {
            let mut matched = false;
            for right in right_group {
                if let Some(merged) = merge_rows(&left, right) {
                    matched = true;
                    self.pending.push_back(merged);
                }
            }
            if !matched && self.join_type == JoinType::LeftOuter {
                self.pending.push_back(left);
            }
        }
    }
}

impl<X: RowValue, O: RowOrder<X>> Iterator for MergeJoinIterator<X, O> {
    type Item = QuackResult<Row<X>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(Ok(row));
            }
            if self.finished {
                return None;
            }

            match self.advance() {
                Ok(true) => {}
                Ok(false) => self.finished = true,
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Pulls the next row into `head` if it is empty.
fn fill_head<X: RowValue>(
    rows: &mut RowListIntoIter<X>,
    head: &mut Option<Row<X>>,
) -> QuackResult<()> {
    if head.is_none() {
        *head = rows.next().transpose()?;
    }
    Ok(())
}

/// Consumes the key-group that starts with `head`.
///
/// Afterwards, `head` holds the first row of the following group, if any.
fn next_group<X: RowValue, O: RowOrder<X>>(
    order: &O,
    key: &JoinKey,
    rows: &mut RowListIntoIter<X>,
    head: &mut Option<Row<X>>,
) -> QuackResult<Vec<Row<X>>> {
    let Some(first) = head.take() else {
        return Ok(Vec::new());
    };

    let mut group = vec![first];
    for row in rows.by_ref() {
        let row = row?;
        if order.compare(key, &group[0], &row)? == Ordering::Equal {
            group.push(row);
        } else {
            *head = Some(row);
            break;
        }
    }
    Ok(group)
}
