//! Error taxonomy carried by exception objects.
//!
//! Errors are plain data: once a body invocation fails, the evaluator boxes
//! the error into an exception object and the tagged handle propagates
//! through every enclosing reduction. Only the outermost consumer turns it
//! back into an `EvalError` via [`Handle::into_result`](crate::Handle::into_result).

use std::fmt;

use kombi_types::{TypeError, UnifyError};

/// Payload of an exception object.
///
/// Types are stored rendered so errors stay cheap to clone and compare
/// across threads.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum EvalError {
    // Type errors
    #[error("type mismatch: expected `{expected}`, found `{actual}`")]
    TypeMismatch { expected: String, actual: String },

    #[error("circular type constraint: {variable} occurs in `{within}`")]
    CircularConstraint { variable: String, within: String },

    // Structural evaluation errors
    #[error("cannot apply a non-function value of type `{found}`")]
    BadApply { found: String },

    #[error("too many arguments applied to `{combinator}`")]
    TooManyArguments { combinator: String },

    #[error("fix expects an unsaturated function, found `{found}`")]
    BadFix { found: String },

    #[error("fixpoint value demanded while it is being computed")]
    BlackHole,

    // Allocation
    #[error("allocation failed while reserving {requested} argument slots")]
    AllocationFailure { requested: usize },

    /// Anything raised inside a combinator body that is not one of the
    /// categories above.
    #[error("{message}")]
    Foreign { message: String },
}

impl EvalError {
    /// Wrap a host-level error, keeping only its message.
    pub fn foreign(err: impl fmt::Display) -> Self {
        EvalError::Foreign {
            message: err.to_string(),
        }
    }
}

impl From<UnifyError> for EvalError {
    fn from(err: UnifyError) -> Self {
        match err {
            UnifyError::TypeMismatch { expected, actual } => EvalError::TypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            UnifyError::CircularConstraint { variable, within } => {
                EvalError::CircularConstraint {
                    variable: variable.to_string(),
                    within: within.to_string(),
                }
            }
        }
    }
}

/// Error from declaring a combinator.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DeclError {
    #[error("combinator `{name}` must take at least one argument")]
    ZeroArity { name: String },

    #[error("combinator `{name}` declares {arity} arguments but its type `{ty}` accepts {type_arity}")]
    ArityExceedsType {
        name: String,
        arity: usize,
        ty: String,
        type_arity: usize,
    },

    #[error(transparent)]
    Type(#[from] TypeError),
}
