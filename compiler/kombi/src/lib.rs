//! Kombi: a lazy graph-reduction runtime for typed combinators.
//!
//! Programs are graphs of heap objects: boxed values, closures over
//! native combinator bodies, and unevaluated apply-nodes. Building a graph
//! never evaluates anything; [`evaluate`] reduces it call-by-need, sharing
//! and memoizing every reduced node.
//!
//! ```ignore
//! use kombi::{apply, evaluate, prim};
//!
//! let sum = apply(apply(prim::add(), prim::make_int(2)), prim::make_int(3));
//! assert_eq!(prim::as_int(&evaluate(&sum)?), Some(5));
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=kombi_eval=debug`: cache hits, fixpoint ties, caught panics.
//! - `RUST_LOG=kombi_heap=trace`: every argument binding and copy.
//!
//! Output appears once [`init_tracing`] has been called.
//!
//! # Configuration
//!
//! [`evaluate`] reads [`EvalOptions::from_env`] once per process. Use an
//! [`Evaluator`] directly for explicit options.

use std::sync::{Arc, Once, OnceLock};

pub use kombi_eval::{
    check, ensure_sufficient_stack, fix, EvalOptions, Evaluator, CATCH_PANICS_VAR,
    CHECK_RESULTS_VAR,
};
pub use kombi_heap::{
    apply, apply_argument, clone_object, make_value, Args, BodyFn, Combinator, DeclError, EvalError,
    Handle, Payload, Tag,
};
pub use kombi_types::{
    same_type, unify, Constraints, Substitution, TypeError, TypeName, TypeValue, UnifyError,
    VarId, MAX_TYPE_NAME_LEN,
};

/// Primitive values and combinators.
pub mod prim {
    pub use kombi_prim::*;
}

// Construction

/// Declare a combinator and return an empty closure over it.
///
/// The arity is the number of leading arrows of `ty`.
pub fn make_closure<F>(name: impl Into<String>, ty: TypeValue, body: F) -> Result<Handle, DeclError>
where
    F: Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync + 'static,
{
    let combinator = Combinator::new(name, ty, body)?;
    Ok(Arc::new(combinator).closure())
}

/// [`make_closure`] for a combinator that takes fewer arguments than its
/// type has arrows, returning a function.
pub fn make_closure_with_arity<F>(
    name: impl Into<String>,
    ty: TypeValue,
    arity: usize,
    body: F,
) -> Result<Handle, DeclError>
where
    F: Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync + 'static,
{
    let combinator = Combinator::with_arity(name, ty, arity, body)?;
    Ok(Arc::new(combinator).closure())
}

// Evaluation

fn evaluator() -> &'static Evaluator {
    static EVALUATOR: OnceLock<Evaluator> = OnceLock::new();
    EVALUATOR.get_or_init(|| {
        let options = EvalOptions::from_env();
        tracing::debug!(?options, "evaluator configured");
        Evaluator::new(options)
    })
}

/// Reduce `handle` to weak-head-normal form.
///
/// An exception result comes back as its error; a successful result has
/// its tag cleared.
pub fn evaluate(handle: &Handle) -> Result<Handle, EvalError> {
    evaluator().evaluate_to_result(handle)
}

// Introspection

/// Reconstruct the type of `handle` without evaluating it.
pub fn type_of(handle: &Handle) -> Result<TypeValue, UnifyError> {
    kombi_eval::type_of(handle)
}

/// Render a type: names as-is, arrows as `(A -> B)`, variables as `Var[id]`.
pub fn to_string(ty: &TypeValue) -> String {
    ty.to_string()
}

// Tracing

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            if let Err(err) = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init()
            {
                tracing::debug!(%err, "keeping the installed tracing subscriber");
            }
        }
    });
}
