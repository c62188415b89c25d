//! Polymorphic helpers.

use std::sync::OnceLock;

use kombi_heap::{Args, EvalError, Handle};
use kombi_types::TypeValue;

use crate::value::{str_type, Str};

/// `identity x = x`, returned unevaluated.
pub fn identity() -> Handle {
    static IDENTITY: OnceLock<Handle> = OnceLock::new();
    IDENTITY
        .get_or_init(|| {
            let a = TypeValue::fresh_var();
            let ty = TypeValue::arrow(a.clone(), a);
            crate::declare("identity", ty, |args: &Args<'_>| args.lazy(0))
        })
        .clone()
}

/// `constant x y = x`. `y` is never evaluated.
pub fn constant() -> Handle {
    static CONSTANT: OnceLock<Handle> = OnceLock::new();
    CONSTANT
        .get_or_init(|| {
            let a = TypeValue::fresh_var();
            let b = TypeValue::fresh_var();
            let ty = TypeValue::arrow_chain([a.clone(), b], a);
            crate::declare("constant", ty, |args: &Args<'_>| args.lazy(0))
        })
        .clone()
}

/// `fail message` raises a foreign error carrying `message`.
pub fn fail() -> Handle {
    static FAIL: OnceLock<Handle> = OnceLock::new();
    FAIL.get_or_init(|| {
        let ty = TypeValue::arrow(str_type(), TypeValue::fresh_var());
        crate::declare("fail", ty, |args: &Args<'_>| {
            let Str(message) = args.value::<Str>(0)?;
            Err(EvalError::Foreign {
                message: message.to_string(),
            })
        })
    })
    .clone()
}
