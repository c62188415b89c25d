//! Comparisons and the conditional.

use std::sync::OnceLock;

use kombi_heap::{Args, Handle};
use kombi_types::TypeValue;

use crate::value::{bool_type, int_type, make_bool, Bool, Int};

pub fn eq() -> Handle {
    static EQ: OnceLock<Handle> = OnceLock::new();
    EQ.get_or_init(|| compare("eq", |lhs, rhs| lhs == rhs)).clone()
}

pub fn lt() -> Handle {
    static LT: OnceLock<Handle> = OnceLock::new();
    LT.get_or_init(|| compare("lt", |lhs, rhs| lhs < rhs)).clone()
}

fn compare(name: &'static str, op: fn(i64, i64) -> bool) -> Handle {
    let ty = TypeValue::arrow_chain([int_type(), int_type()], bool_type());
    crate::declare(name, ty, move |args: &Args<'_>| {
        let Int(lhs) = args.value::<Int>(0)?;
        let Int(rhs) = args.value::<Int>(1)?;
        Ok(make_bool(op(lhs, rhs)))
    })
}

/// `if_then_else c t e`: forces `c`, then returns the chosen branch
/// unevaluated. The other branch is never evaluated.
pub fn if_then_else() -> Handle {
    static IF: OnceLock<Handle> = OnceLock::new();
    IF.get_or_init(|| {
        let a = TypeValue::fresh_var();
        let ty = TypeValue::arrow_chain([bool_type(), a.clone(), a.clone()], a);
        crate::declare("if_then_else", ty, |args: &Args<'_>| {
            let Bool(condition) = args.value::<Bool>(0)?;
            args.lazy(if condition { 1 } else { 2 })
        })
    })
    .clone()
}
