use crate::{DuplicateKeyVariableError, Variable};
use std::fmt::{Display, Formatter};

/// The columns that two rows must agree on to be joinable.
///
/// A [JoinKey] is an ordered sequence of distinct variables. The order is the insertion order of
/// the [JoinKeyBuilder] and is relevant for algorithms that order rows by key (e.g., the merge
/// join). Hashing a row under a key must not depend on this order.
///
/// The empty key is legal. Every pair of rows is then key-equal and a join degenerates into a
/// compatibility check of all row pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct JoinKey {
    variables: Vec<Variable>,
}

impl JoinKey {
    /// Returns a new [JoinKeyBuilder].
    pub fn builder() -> JoinKeyBuilder {
        JoinKeyBuilder::new()
    }

    /// Returns the key without any variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a key from the given variables, in iteration order.
    pub fn try_from_variables(
        variables: impl IntoIterator<Item = Variable>,
    ) -> Result<Self, DuplicateKeyVariableError> {
        let mut builder = JoinKeyBuilder::new();
        for variable in variables {
            builder.add(variable)?;
        }
        Ok(builder.build())
    }

    /// Creates a key from the variables that are part of both schemas.
    ///
    /// The key follows the order of `left`. Duplicates within `left` are ignored.
    pub fn from_common_variables(left: &[Variable], right: &[Variable]) -> Self {
        let mut variables: Vec<Variable> = Vec::new();
        for variable in left {
            if right.contains(variable) && !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
        Self { variables }
    }

    /// Returns the number of variables in the key.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns whether the key has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns whether `variable` is a column of this key.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.variables.contains(variable)
    }

    /// Returns the variables in insertion order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Iterates over the variables in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }
}

impl<'key> IntoIterator for &'key JoinKey {
    type Item = &'key Variable;
    type IntoIter = std::slice::Iter<'key, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for JoinKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (idx, variable) in self.variables.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{variable}")?;
        }
        f.write_str(")")
    }
}

/// Builder for [JoinKey].
///
/// Adding a variable twice is a construction error.
#[derive(Clone, Debug, Default)]
pub struct JoinKeyBuilder {
    variables: Vec<Variable>,
}

impl JoinKeyBuilder {
    /// Creates a new [JoinKeyBuilder].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `variable` as the next key column.
    pub fn add(&mut self, variable: Variable) -> Result<&mut Self, DuplicateKeyVariableError> {
        if self.variables.contains(&variable) {
            return Err(DuplicateKeyVariableError::new(variable));
        }
        self.variables.push(variable);
        Ok(self)
    }

    /// Freezes the builder into a [JoinKey].
    pub fn build(self) -> JoinKey {
        JoinKey {
            variables: self.variables,
        }
    }
}
