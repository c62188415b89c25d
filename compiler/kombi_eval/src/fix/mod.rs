//! The fixpoint combinator, `fix : ((a -> a) -> a)`.
//!
//! `fix f` reduces `f` and then ties it to itself:
//!
//! - If `f` still misses two or more arguments, the result is a copy of
//!   `f` whose next argument is the copy itself, held through a weak back
//!   edge (see [`bind_self`]). This is the usual case: `fix fib` where
//!   `fib self n` needs `n` before it can run.
//! - If `f` misses exactly one argument, binding the self reference
//!   saturates it: `fix f` is a data fixpoint `x = f x`. The self slot then
//!   holds a [`knot`] that is resolved to the body's result once it runs,
//!   so `f` runs once and every self use reaches the same value. Demanding
//!   the value from inside its own computation is a
//!   [`BlackHole`](EvalError::BlackHole).
//!
//! Either way no strong reference cycle is created, so reference counting
//! alone reclaims every closure `fix` builds.

use std::sync::OnceLock;

use kombi_heap::{apply_argument, bind_self, knot, Args, Combinator, EvalError, Handle};
use kombi_types::TypeValue;

/// The process-wide `fix` closure.
pub fn fix() -> Handle {
    static FIX: OnceLock<Handle> = OnceLock::new();
    FIX.get_or_init(declare).clone()
}

fn declare() -> Handle {
    let a = TypeValue::fresh_var();
    let ty = TypeValue::arrow(TypeValue::arrow(a.clone(), a.clone()), a);
    let combinator = Combinator::new("fix", ty, tie);
    match combinator {
        Ok(combinator) => combinator.into_static(),
        // `((a -> a) -> a)` has exactly one leading arrow.
        Err(err) => unreachable!("`fix` declaration rejected: {err}"),
    }
}

fn tie(args: &Args<'_>) -> Result<Handle, EvalError> {
    let function = args.force(0)?;
    let missing = function.as_closure().map_or(0, |closure| closure.arity());
    match missing {
        0 => Err(EvalError::BadFix {
            found: function.describe(),
        }),
        1 => {
            tracing::debug!("fix: data fixpoint");
            let knot = knot();
            let saturated = apply_argument(function, knot.clone())?;
            let value = args.evaluate(&saturated)?;
            if let Some(node) = knot.as_apply() {
                node.resolve(&value);
            }
            Ok(value)
        }
        _ => {
            tracing::debug!(missing, "fix: weak self reference");
            bind_self(&function)
        }
    }
}
