use crate::Variable;
use thiserror::Error;

/// Returned by [JoinKeyBuilder::add](crate::JoinKeyBuilder::add) if the variable is already a
/// column of the key.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Variable {variable} is already part of the join key")]
pub struct DuplicateKeyVariableError {
    variable: Variable,
}

impl DuplicateKeyVariableError {
    /// Creates a new [DuplicateKeyVariableError].
    pub fn new(variable: Variable) -> Self {
        Self { variable }
    }

    /// Returns the duplicated variable.
    pub fn variable(&self) -> &Variable {
        &self.variable
    }
}

/// Returned by a [RowBuilder](crate::RowBuilder) if a variable is bound a second time to a
/// different value.
///
/// Re-binding a variable to an equal value is not an error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Variable {variable} is already bound to a different value")]
pub struct ConflictingBindingError {
    variable: Variable,
}

impl ConflictingBindingError {
    /// Creates a new [ConflictingBindingError].
    pub fn new(variable: Variable) -> Self {
        Self { variable }
    }

    /// Returns the variable that was bound twice.
    pub fn variable(&self) -> &Variable {
        &self.variable
    }
}
