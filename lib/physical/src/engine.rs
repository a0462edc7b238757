use crate::join::{
    FxRowHasher, HashJoin, JoinOperator, MergeJoin, NaturalRowOrder, NestedLoopJoin, RowHasher,
    RowOrder,
};
use crate::{JoinAlgorithm, JoinConfiguration, JoinType};
use quack_common::{merge_variables, QuackResult, RowList};
use quack_model::{JoinKey, RowValue};

/// Executes joins according to a [JoinConfiguration].
///
/// Before running the configured algorithm, the engine checks for inputs that make the join
/// trivial:
/// - Joining with an empty list yields the empty list. Left-outer joins with an empty right side
///   yield the left side.
/// - Joining with the identity list yields the other side.
///
/// The schema of the result is always the union of both input schemas.
///
/// The hasher is only used by hash joins and the order only by merge joins. Nevertheless, both
/// must support the value type.
#[derive(Clone, Debug)]
pub struct JoinEngine<H = FxRowHasher, O = NaturalRowOrder> {
    configuration: JoinConfiguration,
    hasher: H,
    order: O,
}

impl JoinEngine {
    /// Creates a new [JoinEngine] that uses [FxRowHasher] and [NaturalRowOrder].
    pub fn new(configuration: JoinConfiguration) -> Self {
        Self {
            configuration,
            hasher: FxRowHasher,
            order: NaturalRowOrder,
        }
    }
}

impl Default for JoinEngine {
    fn default() -> Self {
        Self::new(JoinConfiguration::default())
    }
}

impl<H, O> JoinEngine<H, O> {
    /// Replaces the [RowHasher] of hash joins.
    pub fn with_hasher<H2>(self, hasher: H2) -> JoinEngine<H2, O> {
        JoinEngine {
            configuration: self.configuration,
            hasher,
            order: self.order,
        }
    }

    /// Replaces the [RowOrder] of merge joins.
    pub fn with_order<O2>(self, order: O2) -> JoinEngine<H, O2> {
        JoinEngine {
            configuration: self.configuration,
            hasher: self.hasher,
            order,
        }
    }

    /// Returns the configuration that selects the join operator.
    pub fn configuration(&self) -> &JoinConfiguration {
        &self.configuration
    }

    /// Joins `left` and `right` under `key`.
    pub fn join<X>(
        &self,
        key: &JoinKey,
        left: RowList<X>,
        right: RowList<X>,
    ) -> QuackResult<RowList<X>>
    where
        X: RowValue,
        H: RowHasher<X> + Clone + 'static,
        O: RowOrder<X> + Clone + 'static,
    {
        let (left, right) = match self.shortcut(left, right) {
            Shortcut::Result(result) => return Ok(result),
            Shortcut::Join(left, right) => (left, right),
        };

        let operator = self.operator::<X>();
        tracing::debug!(
            %key,
            configuration = %self.configuration,
            algorithm = operator.name(),
            "Dispatching join"
        );
        operator.join(key, left, right)
    }

    /// Returns the operator of the configured algorithm.
    pub fn operator<X>(&self) -> Box<dyn JoinOperator<X>>
    where
        X: RowValue,
        H: RowHasher<X> + Clone + 'static,
        O: RowOrder<X> + Clone + 'static,
    {
        let join_type = self.configuration.join_type;
        match self.configuration.algorithm {
            JoinAlgorithm::NestedLoop => Box::new(NestedLoopJoin::new(join_type)),
            JoinAlgorithm::Hash => Box::new(
                HashJoin::new(self.hasher.clone())
                    .with_join_type(join_type)
                    .with_build_side(self.configuration.build_side),
            ),
            JoinAlgorithm::Merge => Box::new(
                MergeJoin::new(self.order.clone())
                    .with_join_type(join_type)
                    .with_unsorted_input(self.configuration.unsorted_input),
            ),
        }
    }

    fn shortcut<X: RowValue>(&self, left: RowList<X>, right: RowList<X>) -> Shortcut<X> {
        let variables = merge_variables(left.variables(), right.variables());
        let join_type = self.configuration.join_type;

        if left.is_empty() {
            tracing::trace!(%join_type, "Left side is empty, skipping join");
            return Shortcut::Result(RowList::empty().with_variables(variables));
        }
        if right.is_empty() {
            tracing::trace!(%join_type, "Right side is empty, skipping join");
            return Shortcut::Result(match join_type {
                JoinType::Inner => RowList::empty().with_variables(variables),
                JoinType::LeftOuter => left.with_variables(variables),
            });
        }
        if right.is_identity() {
            tracing::trace!(%join_type, "Right side is the identity, skipping join");
            return Shortcut::Result(left.with_variables(variables));
        }
        // A left-outer join with an identity left side depends on whether the right side has
        // rows, which is unknown for streams.
        if left.is_identity() && join_type == JoinType::Inner {
            tracing::trace!(%join_type, "Left side is the identity, skipping join");
            return Shortcut::Result(right.with_variables(variables));
        }

        Shortcut::Join(left, right)
    }
}

enum Shortcut<X> {
    Result(RowList<X>),
    Join(RowList<X>, RowList<X>),
}
