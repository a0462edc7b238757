use std::fmt::{Display, Formatter};

/// The algorithm that executes a join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinAlgorithm {
    /// Compares every pair of rows.
    NestedLoop,
    /// Builds a hash table on one side and probes it with the other.
    #[default]
    Hash,
    /// Merges two inputs that are sorted by the join key.
    Merge,
}

impl JoinAlgorithm {
    /// All supported algorithms.
    pub const ALL: [JoinAlgorithm; 3] = [
        JoinAlgorithm::NestedLoop,
        JoinAlgorithm::Hash,
        JoinAlgorithm::Merge,
    ];
}

impl Display for JoinAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JoinAlgorithm::NestedLoop => "nested-loop",
            JoinAlgorithm::Hash => "hash",
            JoinAlgorithm::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// The semantics of a join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// Emits the merge of every compatible pair of rows.
    #[default]
    Inner,
    /// Like [JoinType::Inner], but additionally emits every left row that is compatible with no
    /// right row. This is the join of a SPARQL `OPTIONAL`.
    LeftOuter,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => f.write_str("inner"),
            JoinType::LeftOuter => f.write_str("left outer"),
        }
    }
}

/// The side that a hash join materializes into its hash table.
///
/// Left-outer hash joins always build the right side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildSide {
    Left,
    Right,
    /// The side with the smaller known length. If neither length is known the left side is
    /// built. If only one length is known, that side is built.
    #[default]
    Smaller,
}

impl Display for BuildSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildSide::Left => f.write_str("left"),
            BuildSide::Right => f.write_str("right"),
            BuildSide::Smaller => f.write_str("smaller"),
        }
    }
}

/// What a merge join does with inputs that are not sorted by the join key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnsortedInputPolicy {
    /// Streams both inputs and trusts that they are sorted. The results of unsorted inputs are
    /// unspecified.
    Trust,
    /// Materializes both inputs and checks their order. Unsorted inputs are joined with a nested
    /// loop instead.
    #[default]
    Fallback,
    /// Materializes both inputs and checks their order. Unsorted inputs are an error.
    Reject,
}

impl Display for UnsortedInputPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsortedInputPolicy::Trust => f.write_str("trust"),
            UnsortedInputPolicy::Fallback => f.write_str("fallback"),
            UnsortedInputPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Configures how a [JoinEngine](crate::JoinEngine) executes joins.
///
/// The engine does not plan. Picking the algorithm is the job of the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JoinConfiguration {
    /// The join algorithm.
    pub algorithm: JoinAlgorithm,
    /// Inner or left-outer semantics.
    pub join_type: JoinType,
    /// The side that a hash join builds its table from.
    pub build_side: BuildSide,
    /// How a merge join handles unsorted inputs.
    pub unsorted_input: UnsortedInputPolicy,
}

impl JoinConfiguration {
    /// Creates a configuration for `algorithm` with default values otherwise.
    pub fn new(algorithm: JoinAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Sets the join type.
    #[must_use]
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Sets the build side of hash joins.
    #[must_use]
    pub fn with_build_side(mut self, build_side: BuildSide) -> Self {
        self.build_side = build_side;
        self
    }

    /// Sets the unsorted input policy of merge joins.
    #[must_use]
    pub fn with_unsorted_input(mut self, unsorted_input: UnsortedInputPolicy) -> Self {
        self.unsorted_input = unsorted_input;
        self
    }
}

impl Display for JoinConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} join", self.algorithm, self.join_type)?;
        match self.algorithm {
            JoinAlgorithm::NestedLoop => Ok(()),
            JoinAlgorithm::Hash => write!(f, " (build: {})", self.build_side),
            JoinAlgorithm::Merge => write!(f, " (unsorted input: {})", self.unsorted_input),
        }
    }
}
