//! Checked integer arithmetic.

use std::sync::OnceLock;

use kombi_heap::{Args, EvalError, Handle};
use kombi_types::TypeValue;

use crate::value::{int_type, make_int, Int};

pub fn add() -> Handle {
    static ADD: OnceLock<Handle> = OnceLock::new();
    ADD.get_or_init(|| binary("add", i64::checked_add)).clone()
}

pub fn sub() -> Handle {
    static SUB: OnceLock<Handle> = OnceLock::new();
    SUB.get_or_init(|| binary("sub", i64::checked_sub)).clone()
}

pub fn mul() -> Handle {
    static MUL: OnceLock<Handle> = OnceLock::new();
    MUL.get_or_init(|| binary("mul", i64::checked_mul)).clone()
}

fn binary(name: &'static str, op: fn(i64, i64) -> Option<i64>) -> Handle {
    let ty = TypeValue::arrow_chain([int_type(), int_type()], int_type());
    crate::declare(name, ty, move |args: &Args<'_>| {
        let Int(lhs) = args.value::<Int>(0)?;
        let Int(rhs) = args.value::<Int>(1)?;
        op(lhs, rhs).map(make_int).ok_or_else(|| EvalError::Foreign {
            message: format!("integer overflow in `{name}` ({lhs}, {rhs})"),
        })
    })
}
