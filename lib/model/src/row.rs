use crate::{ConflictingBindingError, Variable};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// The requirements on values that can be bound in a [Row].
///
/// The engine treats values as opaque. Equality is the only operation that all join algorithms
/// need. Hashing and ordering are provided by separate components.
pub trait RowValue: Clone + Eq + Debug + Send + Sync + 'static {}

impl<T> RowValue for T where T: Clone + Eq + Debug + Send + Sync + 'static {}

/// An immutable mapping from [Variable] to values of type `X`.
///
/// A variable is either absent or bound to a value. The empty row is the identity row of the join
/// algebra: it is compatible with every row and merging it with another row yields that row.
///
/// # Representation
///
/// The bindings are stored in a shared slice that is sorted by variable. Cloning a row is cheap
/// and two rows are equal iff they bind the same variables to equal values, regardless of the
/// order in which the bindings were added.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Row<X> {
    bindings: Arc<[(Variable, X)]>,
}

impl<X: RowValue> Row<X> {
    /// Returns the identity row, a row without any bindings.
    pub fn identity() -> Self {
        Self {
            bindings: Arc::from(Vec::new()),
        }
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns whether the row has no bindings (i.e., it is the identity row).
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns whether `variable` is bound in this row.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.position(variable).is_ok()
    }

    /// Returns the value bound to `variable`, or [None] if the variable is absent.
    pub fn get(&self, variable: &Variable) -> Option<&X> {
        self.position(variable)
            .ok()
            .map(|idx| &self.bindings[idx].1)
    }

    /// Iterates over the bound variables in variable order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.bindings.iter().map(|(variable, _)| variable)
    }

    /// Iterates over the bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &X)> + '_ {
        self.bindings.iter().map(|(variable, value)| (variable, value))
    }

    /// Returns the bindings as a slice that is sorted by variable.
    pub fn bindings(&self) -> &[(Variable, X)] {
        &self.bindings
    }

    /// Derives a new row that additionally binds `variable` to `value`.
    ///
    /// If `variable` is already bound to an equal value, the result is equal to this row. Binding
    /// it to a different value is an error.
    pub fn with_binding(
        &self,
        variable: Variable,
        value: X,
    ) -> Result<Self, ConflictingBindingError> {
        match self.position(&variable) {
            Ok(idx) if self.bindings[idx].1 == value => Ok(self.clone()),
            Ok(_) => Err(ConflictingBindingError::new(variable)),
            Err(idx) => {
                let mut bindings = Vec::with_capacity(self.bindings.len() + 1);
                bindings.extend_from_slice(&self.bindings[..idx]);
                bindings.push((variable, value));
                bindings.extend_from_slice(&self.bindings[idx..]);
                Ok(Self {
                    bindings: bindings.into(),
                })
            }
        }
    }

    fn position(&self, variable: &Variable) -> Result<usize, usize> {
        self.bindings
            .binary_search_by(|(candidate, _)| candidate.cmp(variable))
    }
}

impl<X: RowValue> Default for Row<X> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<X: Debug> Debug for Row<X> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(k, v)| (k.as_str(), v)))
            .finish()
    }
}

impl<X: Display> Display for Row<X> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (variable, value) in self.bindings.iter() {
            write!(f, " {variable} = {value}")?;
        }
        f.write_str(" )")
    }
}

/// Accumulates bindings and freezes them into a [Row].
///
/// The builder keeps its bindings sorted, so [Self::build] does not need to sort again.
#[derive(Clone, Debug)]
pub struct RowBuilder<X> {
    bindings: Vec<(Variable, X)>,
}

impl<X: RowValue> RowBuilder<X> {
    /// Creates a new [RowBuilder].
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Creates a new [RowBuilder] that can hold `capacity` bindings without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: Vec::with_capacity(capacity),
        }
    }

    /// Binds `variable` to `value`.
    ///
    /// Returns an error if `variable` is already bound to a different value.
    pub fn add(
        &mut self,
        variable: Variable,
        value: X,
    ) -> Result<&mut Self, ConflictingBindingError> {
        match self
            .bindings
            .binary_search_by(|(candidate, _)| candidate.cmp(&variable))
        {
            Ok(idx) if self.bindings[idx].1 == value => {}
            Ok(_) => return Err(ConflictingBindingError::new(variable)),
            Err(idx) => self.bindings.insert(idx, (variable, value)),
        }
        Ok(self)
    }

    /// Adds all bindings of `row`.
    ///
    /// Returns an error on the first variable of `row` that is already bound to a different
    /// value. Bindings of `row` that precede the conflict remain in the builder.
    pub fn add_row(&mut self, row: &Row<X>) -> Result<&mut Self, ConflictingBindingError> {
        if self.bindings.is_empty() {
            self.bindings.extend_from_slice(row.bindings());
            return Ok(self);
        }

        for (variable, value) in row.iter() {
            self.add(variable.clone(), value.clone())?;
        }
        Ok(self)
    }

    /// Removes all bindings while keeping the allocated capacity.
    pub fn clear(&mut self) -> &mut Self {
        self.bindings.clear();
        self
    }

    /// Returns whether `variable` has been bound.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.bindings
            .binary_search_by(|(candidate, _)| candidate.cmp(variable))
            .is_ok()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns whether no binding has been added.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Freezes the bindings into a [Row].
    pub fn build(self) -> Row<X> {
        Row {
            bindings: self.bindings.into(),
        }
    }
}

impl<X: RowValue> Default for RowBuilder<X> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

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

    #[test]
    fn identity_row_has_no_bindings() {
        let identity = Row::<i64>::identity();

        assert!(identity.is_empty());
        assert_eq!(identity.get(&var("a")), None);
        assert_snapshot!(identity, @"( )");
    }

    #[test]
    fn lookup_bound_and_absent_variables() {
        let row = row(&[("b", 2), ("a", 1)]);

        assert_eq!(row.get(&var("a")), Some(&1));
        assert_eq!(row.get(&var("b")), Some(&2));
        assert_eq!(row.get(&var("c")), None);
        assert!(row.contains(&var("a")));
        assert!(!row.contains(&var("c")));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        assert_eq!(row(&[("a", 1), ("b", 2)]), row(&[("b", 2), ("a", 1)]));
        assert_ne!(row(&[("a", 1), ("b", 2)]), row(&[("a", 1), ("b", 3)]));
        assert_ne!(row(&[("a", 1)]), row(&[("a", 1), ("b", 2)]));
    }

    #[test]
    fn display_is_sorted_by_variable() {
        assert_snapshot!(row(&[("c", 9), ("a", 1)]), @"( ?a = 1 ?c = 9 )");
    }

    #[test]
    fn builder_rejects_conflicting_binding() {
        let mut builder = RowBuilder::new();
        builder.add(var("a"), 1).unwrap();

        let error = builder.add(var("a"), 2).unwrap_err();
        assert_snapshot!(error, @"Variable ?a is already bound to a different value");
    }

    #[test]
    fn cleared_builder_accepts_new_bindings() {
        let mut builder = RowBuilder::new();
        builder.add(var("a"), 1).unwrap();
        builder.clear();

        assert!(builder.is_empty());
        builder.add(var("a"), 2).unwrap();
        assert_eq!(builder.build(), row(&[("a", 2)]));
    }

    #[test]
    fn builder_accepts_rebinding_to_equal_value() {
        let mut builder = RowBuilder::new();
        builder.add(var("a"), 1).unwrap();
        builder.add(var("a"), 1).unwrap();

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.build(), row(&[("a", 1)]));
    }

    #[test]
    fn add_row_unions_bindings() {
        let mut builder = RowBuilder::new();
        builder.add_row(&row(&[("a", 1), ("b", 2)])).unwrap();
        builder.add_row(&row(&[("a", 1), ("c", 3)])).unwrap();

        assert_eq!(builder.build(), row(&[("a", 1), ("b", 2), ("c", 3)]));
    }

    #[test]
    fn with_binding_does_not_touch_parent() {
        let parent = row(&[("a", 1)]);
        let child = parent.with_binding(var("b"), 2).unwrap();

        assert_eq!(parent, row(&[("a", 1)]));
        assert_eq!(child, row(&[("a", 1), ("b", 2)]));
        assert_eq!(parent.with_binding(var("a"), 1).unwrap(), parent);
        assert!(parent.with_binding(var("a"), 5).is_err());
    }
}
