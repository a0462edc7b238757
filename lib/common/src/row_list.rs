use crate::QuackResult;
use quack_model::{Row, RowValue, Variable};
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

/// A boxed, single-pass iterator of rows. Errors of the producer are yielded in place.
pub type RowIterator<X> = Box<dyn Iterator<Item = QuackResult<Row<X>>> + Send>;

/// An ordered sequence of rows that share a declared variable schema.
///
/// The schema holds every variable that *may* be bound by the rows. Individual rows can be
/// partial. A [RowList] is either materialized in memory or streamed from an iterator. Streamed
/// lists are forward-only and can be consumed exactly once.
///
/// Two lists have a special role in the join algebra:
/// - the identity list ([Self::identity]) contains a single identity row and is the neutral
///   element of joins;
/// - the empty list ([Self::empty]) contains no rows and is the absorbing element of joins.
pub struct RowList<X> {
    /// Sorted and free of duplicates.
    variables: Vec<Variable>,
    content: RowListContent<X>,
}

enum RowListContent<X> {
    Materialized(Vec<Row<X>>),
    Stream(RowIterator<X>),
}

impl<X: RowValue> RowList<X> {
    /// Returns a list that contains only the identity row.
    pub fn identity() -> Self {
        Self {
            variables: Vec::new(),
            content: RowListContent::Materialized(vec![Row::identity()]),
        }
    }

    /// Returns a list without any rows.
    pub fn empty() -> Self {
        Self {
            variables: Vec::new(),
            content: RowListContent::Materialized(Vec::new()),
        }
    }

    /// Creates a materialized list.
    pub fn from_rows(variables: impl IntoIterator<Item = Variable>, rows: Vec<Row<X>>) -> Self {
        Self {
            variables: normalize_variables(variables),
            content: RowListContent::Materialized(rows),
        }
    }

    /// Creates a list that lazily pulls its rows from `rows`.
    pub fn from_stream<I>(variables: impl IntoIterator<Item = Variable>, rows: I) -> Self
    where
        I: IntoIterator<Item = QuackResult<Row<X>>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            variables: normalize_variables(variables),
            content: RowListContent::Stream(Box::new(rows.into_iter())),
        }
    }

    /// Replaces the declared schema of this list.
    #[must_use]
    pub fn with_variables(self, variables: impl IntoIterator<Item = Variable>) -> Self {
        Self {
            variables: normalize_variables(variables),
            content: self.content,
        }
    }

    /// Returns the declared variables, sorted.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns whether this list consists of exactly one identity row.
    ///
    /// Always `false` for streamed lists, as their content is unknown.
    pub fn is_identity(&self) -> bool {
        match &self.content {
            RowListContent::Materialized(rows) => rows.len() == 1 && rows[0].is_empty(),
            RowListContent::Stream(_) => false,
        }
    }

    /// Returns whether this list contains no rows.
    ///
    /// Always `false` for streamed lists, as their content is unknown.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            RowListContent::Materialized(rows) => rows.is_empty(),
            RowListContent::Stream(_) => false,
        }
    }

    /// Returns the number of rows, if it is known without consuming the list.
    pub fn len(&self) -> Option<usize> {
        match &self.content {
            RowListContent::Materialized(rows) => Some(rows.len()),
            RowListContent::Stream(_) => None,
        }
    }

    /// Returns whether the rows are held in memory.
    pub fn is_materialized(&self) -> bool {
        matches!(self.content, RowListContent::Materialized(_))
    }

    /// Returns the rows if the list is materialized.
    pub fn rows(&self) -> Option<&[Row<X>]> {
        match &self.content {
            RowListContent::Materialized(rows) => Some(rows),
            RowListContent::Stream(_) => None,
        }
    }

    /// Consumes the list and collects its rows.
    ///
    /// Returns the first error of the producer, if any.
    pub fn materialize(self) -> QuackResult<Vec<Row<X>>> {
        match self.content {
            RowListContent::Materialized(rows) => Ok(rows),
            RowListContent::Stream(rows) => rows.collect(),
        }
    }

    /// Collects a streamed list into a materialized list with the same schema.
    pub fn into_materialized(self) -> QuackResult<Self> {
        let variables = self.variables.clone();
        let rows = self.materialize()?;
        Ok(Self {
            variables,
            content: RowListContent::Materialized(rows),
        })
    }
}

impl<X: RowValue> IntoIterator for RowList<X> {
    type Item = QuackResult<Row<X>>;
    type IntoIter = RowListIntoIter<X>;

    fn into_iter(self) -> Self::IntoIter {
        match self.content {
            RowListContent::Materialized(rows) => RowListIntoIter::Materialized(rows.into_iter()),
            RowListContent::Stream(rows) => RowListIntoIter::Stream(rows),
        }
    }
}

/// The iterator of a consumed [RowList].
pub enum RowListIntoIter<X> {
    Materialized(std::vec::IntoIter<Row<X>>),
    Stream(RowIterator<X>),
}

impl<X: RowValue> Iterator for RowListIntoIter<X> {
    type Item = QuackResult<Row<X>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowListIntoIter::Materialized(rows) => rows.next().map(Ok),
            RowListIntoIter::Stream(rows) => rows.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            RowListIntoIter::Materialized(rows) => rows.size_hint(),
            RowListIntoIter::Stream(rows) => rows.size_hint(),
        }
    }
}

impl<X: Debug> Debug for RowList<X> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RowList");
        debug.field("variables", &self.variables);
        match &self.content {
            RowListContent::Materialized(rows) => debug.field("rows", rows),
            RowListContent::Stream(_) => debug.field("rows", &"<stream>"),
        };
        debug.finish()
    }
}

/// Accumulates rows into a materialized [RowList].
///
/// The schema of the result contains the declared variables and every variable bound by one of
/// the added rows.
#[derive(Clone, Debug)]
pub struct RowListBuilder<X> {
    variables: BTreeSet<Variable>,
    rows: Vec<Row<X>>,
}

impl<X: RowValue> RowListBuilder<X> {
    /// Creates a new [RowListBuilder] with an empty schema.
    pub fn new() -> Self {
        Self {
            variables: BTreeSet::new(),
            rows: Vec::new(),
        }
    }

    /// Declares additional schema variables, even if no row binds them.
    #[must_use]
    pub fn with_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Appends a row and widens the schema with its variables.
    pub fn add_row(&mut self, row: Row<X>) -> &mut Self {
        for variable in row.variables() {
            if !self.variables.contains(variable) {
                self.variables.insert(variable.clone());
            }
        }
        self.rows.push(row);
        self
    }

    /// Returns the number of rows added so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether no row has been added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds the materialized [RowList].
    pub fn build(self) -> RowList<X> {
        RowList {
            variables: self.variables.into_iter().collect(),
            content: RowListContent::Materialized(self.rows),
        }
    }
}

impl<X: RowValue> Default for RowListBuilder<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: RowValue> Extend<Row<X>> for RowListBuilder<X> {
    fn extend<T: IntoIterator<Item = Row<X>>>(&mut self, iter: T) {
        for row in iter {
            self.add_row(row);
        }
    }
}

/// Returns the sorted union of two schemas.
pub fn merge_variables(left: &[Variable], right: &[Variable]) -> Vec<Variable> {
    normalize_variables(left.iter().chain(right.iter()).cloned())
}

fn normalize_variables(variables: impl IntoIterator<Item = Variable>) -> Vec<Variable> {
    let mut variables: Vec<Variable> = variables.into_iter().collect();
    variables.sort_unstable();
    variables.dedup();
    variables
}
