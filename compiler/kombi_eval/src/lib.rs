//! Graph-reduction evaluator for the Kombi runtime.
//!
//! - [`Evaluator`] reduces heap terms to weak-head-normal form with
//!   call-by-need argument passing and memoized apply-nodes.
//! - [`fix`] is the built-in fixpoint combinator.
//! - [`type_of`] reconstructs the type of a term without evaluating it.
//!
//! Reduction of one graph happens on the calling thread and runs to
//! completion; a non-terminating term does not return. Deep reductions
//! grow the native stack on demand instead of overflowing it.

mod fix;
mod options;
mod reduce;
mod stack;
mod typeck;


pub use fix::fix;
pub use options::{EvalOptions, CATCH_PANICS_VAR, CHECK_RESULTS_VAR};
pub use reduce::{evaluate, Evaluator};
pub use stack::ensure_sufficient_stack;
pub use typeck::{check, type_of};
