use quack_model::{ConflictingBindingError, DuplicateKeyVariableError, Variable};
use std::error::Error;

/// An error raised while building or joining rows.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QuackError {
    /// A join key was built with a duplicate column.
    #[error(transparent)]
    DuplicateKeyVariable(#[from] DuplicateKeyVariableError),
    /// A row was built with a variable bound to two different values.
    #[error(transparent)]
    ConflictingBinding(#[from] ConflictingBindingError),
    /// An invariant of the engine was violated. This indicates a defect, not a user error.
    #[error(transparent)]
    Internal(#[from] InternalError),
    /// The input of a merge join is not sorted by the join key.
    #[error("Merge join input is not sorted by the join key: {0}")]
    UnsortedInput(String),
    /// The producer of a row list failed (e.g., a storage scan).
    #[error("{0}")]
    Upstream(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl QuackError {
    /// Wraps an error of a row producer.
    #[inline]
    pub fn upstream(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self::Upstream(error.into())
    }

    /// Returns whether this error reports a violated invariant.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// An error that reports a violated invariant.
///
/// "A variable is absent" and "a variable is bound" are distinct states. Code that expects a
/// binding and does not find one raises an [InternalError] instead of silently continuing.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InternalError(#[from] InternalErrorKind);

#[derive(Debug, thiserror::Error)]
enum InternalErrorKind {
    #[error("Internal error: {0}")]
    Msg(String),
    #[error("Internal error: join key variable {0} is not bound")]
    UnboundKeyVariable(Variable),
}

impl InternalError {
    /// Builds an error from a printable error message.
    #[inline]
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(InternalErrorKind::Msg(msg.into()))
    }

    /// Builds an error for a key variable that a row was required to bind.
    #[inline]
    pub fn unbound_key_variable(variable: Variable) -> Self {
        Self(InternalErrorKind::UnboundKeyVariable(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::error::Error;
    use std::io;

    #[test]
    fn internal_error_names_the_variable() {
        let error = QuackError::from(InternalError::unbound_key_variable(
            Variable::new_unchecked("a"),
        ));

        assert!(error.is_internal());
        assert_snapshot!(error, @"Internal error: join key variable ?a is not bound");
    }

    #[test]
    fn internal_error_from_message() {
        let error = QuackError::from(InternalError::msg("probe table is inconsistent"));
        assert_snapshot!(error, @"Internal error: probe table is inconsistent");
    }

    #[test]
    fn model_errors_are_transparent() {
        let error = QuackError::from(ConflictingBindingError::new(Variable::new_unchecked("b")));
        assert_snapshot!(error, @"Variable ?b is already bound to a different value");
    }

    #[test]
    fn upstream_error_keeps_source() {
        let error = QuackError::upstream(io::Error::other("disk on fire"));

        assert!(!error.is_internal());
        assert!(error.source().is_some());
        assert_snapshot!(error, @"disk on fire");
    }
}
