//! Run a primitive body directly, without an evaluator.

#![allow(clippy::unwrap_used)]

use kombi_heap::{apply_argument, EvalError, Handle, Reduce};

/// Treats every argument as already reduced.
struct Reduced;

impl Reduce for Reduced {
    fn reduce(&self, handle: &Handle) -> Handle {
        handle.clone()
    }
}

/// Bind `arguments` into `primitive` and invoke its body once.
pub fn call(primitive: &Handle, arguments: &[Handle]) -> Result<Handle, EvalError> {
    let mut closure = primitive.clone();
    for argument in arguments {
        closure = apply_argument(closure, argument.clone())?;
    }
    let saturated = closure.as_closure().unwrap();
    assert!(saturated.is_saturated(), "not enough arguments");
    saturated.combinator().invoke(&saturated.args(&Reduced))
}
