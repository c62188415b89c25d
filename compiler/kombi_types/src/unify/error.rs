//! Unification failures.

use crate::{TypeValue, VarId};

/// Error from solving a constraint set.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum UnifyError {
    /// Two types with incompatible shapes or different names.
    #[error("type mismatch: expected `{expected}`, found `{actual}`")]
    TypeMismatch {
        /// Left-hand side of the failing equation.
        expected: TypeValue,
        /// Right-hand side of the failing equation.
        actual: TypeValue,
    },

    /// Occurs check failure: binding the variable would build an infinite type.
    #[error("circular constraint: {variable} occurs in `{within}`")]
    CircularConstraint {
        variable: VarId,
        /// The type the variable was asked to equal.
        within: TypeValue,
    },
}
