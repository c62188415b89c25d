//! Structural type values for the Kombi runtime.
//!
//! Every heap value and every combinator carries exactly one [`TypeValue`]:
//! a small immutable tree that is either a named value type, an arrow
//! (function) type, or a type variable. The same trees drive two things:
//!
//! - **Validation** of hand-built terms: the evaluator crate reconstructs
//!   a term's type by emitting one equation per application and solving
//!   them with [`unify`].
//! - **Polymorphic dispatch**: combinators declared with variables are
//!   instantiated per use, and the solved substitution tells the runtime
//!   what concrete type a polymorphic body is expected to produce.
//!
//! # Design
//!
//! Type values are reference counted (`Arc`) and never mutated after
//! construction, so cloning is cheap and trees can be shared freely
//! between threads. Equality checks pointer identity first and falls
//! back to structure.
//!
//! Unification is classic syntactic unification with an occurs check,
//! driven by an explicit LIFO worklist so results are reproducible for a
//! given term shape. See [`unify`] for the exact ordering rules.

mod error;
mod ty;
mod unify;

pub use error::TypeError;
pub use ty::{same_type, TypeKind, TypeName, TypeValue, VarId, MAX_TYPE_NAME_LEN};
pub use unify::{unify, Constraints, Substitution, UnifyError};
