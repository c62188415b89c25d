//! Type reconstruction for heap terms.
//!
//! [`type_of`] walks a term without evaluating anything and collects one
//! equation per application:
//!
//! - an unevaluated apply-node `f x` contributes
//!   `type(f) = (type(x) -> r)` for a fresh `r`, and has type `r`;
//! - a closure starts from a fresh instance of its combinator's declared
//!   type and contributes the same equation for every bound argument;
//! - a reduced apply-node has the type of its memoized result;
//! - an exception has a fresh type (it inhabits every type).
//!
//! The equations are solved by [`unify`](kombi_types::unify), the solution
//! applied to the term's type, and the remaining variables renamed to
//! generic ones so the rendering is the same on every call.
//!
//! Sub-terms shared by several parents are typed once per walk: sharing
//! is monomorphic. Empty closures (bare declarations) are the exception;
//! every use of one gets its own instance.
//!
//! Fixpoints make the graph cyclic. Every object is given a type variable
//! before its parts are visited, so reaching it again through a back edge
//! yields that variable instead of walking the cycle.

use kombi_heap::{ApplyState, Closure, EvalError, Handle, Object, ObjectKind};
use kombi_types::{Constraints, TypeValue, UnifyError};
use rustc_hash::FxHashMap;

use crate::ensure_sufficient_stack;

/// Reconstruct the type of `handle`.
#[tracing::instrument(level = "trace", skip_all)]
pub fn type_of(handle: &Handle) -> Result<TypeValue, UnifyError> {
    let mut walk = Reconstruct::default();
    let ty = walk.visit(handle);
    tracing::trace!(equations = walk.constraints.len(), "type reconstruction");
    let solution = walk.constraints.solve()?;
    Ok(solution.apply(&ty).generalize())
}

/// [`type_of`] with failures in the evaluator's error taxonomy.
pub fn check(handle: &Handle) -> Result<TypeValue, EvalError> {
    type_of(handle).map_err(EvalError::from)
}

/// Whether `result` can be the value of the saturated closure `closure`.
pub(crate) fn check_result(closure: &Handle, result: &Handle) -> Result<(), EvalError> {
    let mut walk = Reconstruct::default();
    let expected = walk.visit(closure);
    let actual = walk.visit(result);
    walk.constraints.push(expected, actual);
    walk.constraints.solve().map(drop).map_err(EvalError::from)
}

#[derive(Default)]
struct Reconstruct {
    constraints: Constraints,
    seen: FxHashMap<*const Object, TypeValue>,
}

impl Reconstruct {
    fn visit(&mut self, handle: &Handle) -> TypeValue {
        if handle.is_exception() {
            return TypeValue::fresh_var();
        }
        let obj: &Object = handle.obj_ref();
        let key: *const Object = obj;
        if let Some(ty) = self.seen.get(&key) {
            return ty.clone();
        }

        let declaration = matches!(obj.kind(), ObjectKind::Closure(c) if c.bound() == 0);
        if declaration {
            return self.visit_object(obj);
        }
        let own = TypeValue::fresh_var();
        self.seen.insert(key, own.clone());
        let ty = ensure_sufficient_stack(|| self.visit_object(obj));
        self.constraints.push(own.clone(), ty);
        own
    }

    fn visit_object(&mut self, obj: &Object) -> TypeValue {
        match obj.kind() {
            ObjectKind::Value(boxed) => boxed.tag().clone(),
            ObjectKind::Exception(_) => TypeValue::fresh_var(),
            ObjectKind::Apply(node) => match node.snapshot() {
                ApplyState::Reduced(result) => self.visit(&result),
                ApplyState::Pending { function, argument } => {
                    let function = self.visit(&function);
                    let argument = self.visit(&argument);
                    self.application(function, argument)
                }
            },
            ObjectKind::Closure(closure) => self.visit_closure(closure),
        }
    }

    fn visit_closure(&mut self, closure: &Closure) -> TypeValue {
        let mut ty = closure.combinator().ty().instantiate();
        for thunk in closure.arguments() {
            let argument = self.visit(&thunk.peek());
            ty = self.application(ty, argument);
        }
        ty
    }

    fn application(&mut self, function: TypeValue, argument: TypeValue) -> TypeValue {
        let result = TypeValue::fresh_var();
        self.constraints
            .push(function, TypeValue::arrow(argument, result.clone()));
        result
    }
}
