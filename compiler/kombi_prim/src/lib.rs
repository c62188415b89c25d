//! Primitive values and combinators for the Kombi runtime.
//!
//! Payloads: [`Int`] (`i64`), [`Bool`] and [`Str`], boxed under the named
//! types `Int`, `Bool` and `Str`.
//!
//! Combinators (each a process-wide static closure):
//!
//! | name              | type                                  |
//! |-------------------|---------------------------------------|
//! | `add` `sub` `mul` | `Int -> Int -> Int` (overflow raises) |
//! | `eq` `lt`         | `Int -> Int -> Bool`                  |
//! | `if_then_else`    | `Bool -> a -> a -> a`                 |
//! | `identity`        | `a -> a`                              |
//! | `constant`        | `a -> b -> a`                         |
//! | `fail`            | `Str -> a` (always raises)            |

mod arith;
mod generic;
mod logic;
mod value;

pub use arith::{add, mul, sub};
pub use generic::{constant, fail, identity};
pub use logic::{eq, if_then_else, lt};
pub use value::{
    as_bool, as_int, as_str, bool_type, int_type, make_bool, make_int, make_str, str_type, Bool,
    Int, Str,
};

use kombi_heap::{Args, Combinator, EvalError, Handle};
use kombi_types::TypeValue;

/// Declare a primitive as a static closure.
fn declare<F>(name: &'static str, ty: TypeValue, body: F) -> Handle
where
    F: Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync + 'static,
{
    match Combinator::new(name, ty, body) {
        Ok(combinator) => {
            tracing::trace!(name, "primitive declared");
            combinator.into_static()
        }
        // Every primitive type below has at least one leading arrow.
        Err(err) => unreachable!("primitive `{name}` rejected: {err}"),
    }
}

#[cfg(test)]
mod test_helpers;
