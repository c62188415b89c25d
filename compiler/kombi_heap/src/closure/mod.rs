//! Combinator declarations, closures and partial application.
//!
//! A [`Combinator`] is the static part of a function: name, declared type,
//! arity and body. A [`Closure`] is one instance of it with a remaining
//! arity and an argument array of that combinator's full arity, filled
//! back to front: the first logical argument lives in the last slot.
//!
//! Binding never evaluates anything. [`apply_argument`] wraps the value in
//! a pending [`Thunk`] and returns the (possibly saturated) closure; the
//! evaluator runs the body of a saturated closure, exactly once.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use kombi_types::TypeValue;

use crate::object::{Edge, ObjRef, Object, ObjectKind, Payload};
use crate::thunk::{Reduce, Thunk};
use crate::{DeclError, EvalError, Handle};

/// Body of a combinator.
///
/// Called with the saturated closure's arguments. Returning `Err` raises:
/// the evaluator wraps the error into an exception handle.
pub type BodyFn = dyn Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync;

// Declaration

/// A declared combinator.
pub struct Combinator {
    name: String,
    ty: TypeValue,
    arity: usize,
    body: Box<BodyFn>,
}

impl Combinator {
    /// Declare a combinator taking one argument per leading arrow of `ty`.
    pub fn new<F>(name: impl Into<String>, ty: TypeValue, body: F) -> Result<Self, DeclError>
    where
        F: Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync + 'static,
    {
        let arity = ty.arity();
        Self::with_arity(name, ty, arity, body)
    }

    /// Declare a combinator that takes fewer arguments than its type
    /// allows; the body then returns a function.
    pub fn with_arity<F>(
        name: impl Into<String>,
        ty: TypeValue,
        arity: usize,
        body: F,
    ) -> Result<Self, DeclError>
    where
        F: Fn(&Args<'_>) -> Result<Handle, EvalError> + Send + Sync + 'static,
    {
        let name = name.into();
        if arity == 0 {
            return Err(DeclError::ZeroArity { name });
        }
        let type_arity = ty.arity();
        if arity > type_arity {
            return Err(DeclError::ArityExceedsType {
                name,
                arity,
                ty: ty.to_string(),
                type_arity,
            });
        }
        Ok(Combinator {
            name,
            ty,
            arity,
            body: Box::new(body),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, possibly polymorphic.
    #[inline]
    pub fn ty(&self) -> &TypeValue {
        &self.ty
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Run the body. Only the evaluator's invocation boundary calls this.
    pub fn invoke(&self, args: &Args<'_>) -> Result<Handle, EvalError> {
        (self.body)(args)
    }

    /// A fresh closure with every argument slot empty.
    pub fn closure(self: &Arc<Self>) -> Handle {
        Handle::new(ObjectKind::Closure(Closure::new(Arc::clone(self))))
    }

    /// Promote the empty closure of this combinator to a process-lifetime
    /// static object. Applying it always copies, so the static is never
    /// mutated.
    pub fn into_static(self) -> Handle {
        let obj = Object::leak(ObjectKind::Closure(Closure::new(Arc::new(self))));
        Handle::from_static(obj)
    }
}

impl fmt::Debug for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

// Closure

/// A (partially) applied combinator.
pub struct Closure {
    combinator: Arc<Combinator>,
    arity: usize,
    arguments: Vec<Option<Arc<Thunk>>>,
    result: OnceLock<Handle>,
}

impl Closure {
    fn new(combinator: Arc<Combinator>) -> Self {
        let total = combinator.arity;
        Closure {
            combinator,
            arity: total,
            arguments: vec![None; total],
            result: OnceLock::new(),
        }
    }

    #[inline]
    pub fn combinator(&self) -> &Arc<Combinator> {
        &self.combinator
    }

    /// Remaining argument count.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn total_arity(&self) -> usize {
        self.arguments.len()
    }

    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.arity == 0
    }

    /// Number of bound arguments.
    #[inline]
    pub fn bound(&self) -> usize {
        self.total_arity() - self.arity
    }

    /// Thunk of logical argument `index` (0 = first applied).
    pub fn argument(&self, index: usize) -> Option<&Arc<Thunk>> {
        let slot = self.total_arity().checked_sub(index + 1)?;
        self.arguments.get(slot)?.as_ref()
    }

    /// Bound arguments in application order.
    pub fn arguments(&self) -> impl Iterator<Item = &Arc<Thunk>> + '_ {
        self.arguments.iter().rev().flatten()
    }

    /// Whether a fixpoint back edge is bound into this closure.
    pub fn has_recursive_slot(&self) -> bool {
        self.arguments().any(|thunk| thunk.is_recursive())
    }

    /// Memoized body result, once the body has run.
    pub fn result(&self) -> Option<&Handle> {
        self.result.get()
    }

    /// Memoized body result, running `run` the first time.
    pub fn result_or_run(&self, run: impl FnOnce() -> Handle) -> Handle {
        self.result.get_or_init(run).clone()
    }

    /// Argument view handed to the body.
    pub fn args<'a>(&'a self, reducer: &'a dyn Reduce) -> Args<'a> {
        Args {
            closure: self,
            reducer,
        }
    }

    /// Copy for binding. Ordinary argument thunks are shared with the copy;
    /// fixpoint back edges become strong references in it.
    pub fn try_clone(&self) -> Result<Closure, EvalError> {
        let total = self.arguments.len();
        let mut arguments = Vec::new();
        arguments
            .try_reserve_exact(total)
            .map_err(|_| EvalError::AllocationFailure { requested: total })?;
        arguments.extend(
            self.arguments
                .iter()
                .map(|slot| slot.as_ref().map(Thunk::for_copy)),
        );
        Ok(Closure {
            combinator: Arc::clone(&self.combinator),
            arity: self.arity,
            arguments,
            result: self.result.clone(),
        })
    }

    /// Fill the next back-to-front slot.
    fn bind(&mut self, thunk: Arc<Thunk>) -> Result<(), EvalError> {
        if self.arity == 0 {
            return Err(self.too_many());
        }
        self.arity -= 1;
        self.arguments[self.arity] = Some(thunk);
        Ok(())
    }

    fn too_many(&self) -> EvalError {
        EvalError::TooManyArguments {
            combinator: self.combinator.name.clone(),
        }
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Edge>) {
        out.extend(self.arguments.drain(..).flatten().map(Edge::Thunk));
        if let Some(result) = self.result.take() {
            out.extend(result.into_edge());
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Closure({} {}/{})",
            self.combinator.name,
            self.bound(),
            self.total_arity()
        )
    }
}

// Binding

fn closure_of(handle: &Handle) -> Result<&Closure, EvalError> {
    handle.as_closure().ok_or_else(|| EvalError::BadApply {
        found: handle.describe(),
    })
}

/// Bind `value`, unevaluated, as the next argument of `closure`.
///
/// The closure is copied on its first application, when anyone else still
/// references it, and when it carries a fixpoint back edge; otherwise the
/// slot is filled in place. Binding never runs the body.
pub fn apply_argument(closure: Handle, value: Handle) -> Result<Handle, EvalError> {
    bind_thunk(closure, Arc::new(Thunk::pending(value)))
}

fn bind_thunk(closure: Handle, thunk: Arc<Thunk>) -> Result<Handle, EvalError> {
    let mut target = closure.into_untagged();
    let copy = {
        let current = closure_of(&target)?;
        if current.is_saturated() {
            return Err(current.too_many());
        }
        current.arity == current.total_arity() || current.has_recursive_slot()
    };

    if !copy {
        if let Handle::Pointer(ObjRef::Shared(obj)) = &mut target {
            if let Some(ObjectKind::Closure(unique)) = Arc::get_mut(obj).map(Object::kind_mut) {
                tracing::trace!(combinator = unique.combinator.name(), "bind in place");
                unique.bind(thunk)?;
                return Ok(target);
            }
        }
    }

    let mut fresh = closure_of(&target)?.try_clone()?;
    tracing::trace!(combinator = fresh.combinator.name(), "bind into copy");
    fresh.bind(thunk)?;
    Ok(Handle::new(ObjectKind::Closure(fresh)))
}

/// Copy `function` and bind a non-owning reference to the copy itself as
/// its next argument.
///
/// This is the knot of `fix f = f (fix f)` for functions that stay
/// unsaturated after the self binding: the copy refers to itself through a
/// `Weak` edge, so dropping the last outside handle frees it. Anything that
/// later binds further arguments copies the closure and turns the edge into
/// a strong one in the copy.
pub fn bind_self(function: &Handle) -> Result<Handle, EvalError> {
    let current = closure_of(function).map_err(|_| EvalError::BadFix {
        found: function.describe(),
    })?;
    if current.arity < 2 {
        return Err(EvalError::BadFix {
            found: function.describe(),
        });
    }
    let mut fresh = current.try_clone()?;
    let obj = Arc::new_cyclic(|this: &Weak<Object>| {
        fresh.arity -= 1;
        fresh.arguments[fresh.arity] = Some(Arc::new(Thunk::recursive(this.clone())));
        Object::new(ObjectKind::Closure(fresh))
    });
    Ok(Handle::from(obj))
}

// Argument view

/// Logical-order view of a saturated closure's arguments.
///
/// Index 0 is the first argument applied.
pub struct Args<'a> {
    closure: &'a Closure,
    reducer: &'a dyn Reduce,
}

impl<'a> Args<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.closure.bound()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn combinator(&self) -> &'a Combinator {
        &self.closure.combinator
    }

    pub fn thunk(&self, index: usize) -> Result<&'a Arc<Thunk>, EvalError> {
        self.closure
            .argument(index)
            .ok_or_else(|| EvalError::Foreign {
                message: format!(
                    "argument {index} of `{}` is not bound",
                    self.closure.combinator.name
                ),
            })
    }

    /// The argument as bound, without evaluating it.
    pub fn lazy(&self, index: usize) -> Result<Handle, EvalError> {
        Ok(self.thunk(index)?.peek())
    }

    /// Evaluate argument `index` (at most once per binding). An exception
    /// in the argument comes back as its original error.
    pub fn force(&self, index: usize) -> Result<Handle, EvalError> {
        self.thunk(index)?.force(self.reducer).into_result()
    }

    /// Evaluate argument `index` and unbox a payload of type `T`.
    pub fn value<T: Payload + Clone>(&self, index: usize) -> Result<T, EvalError> {
        let handle = self.force(index)?;
        match handle.downcast::<T>() {
            Some(payload) => Ok(payload.clone()),
            None => Err(EvalError::TypeMismatch {
                expected: short_type_name::<T>().to_owned(),
                actual: handle.describe(),
            }),
        }
    }

    /// Reduce an arbitrary handle with the same evaluator.
    pub fn evaluate(&self, handle: &Handle) -> Result<Handle, EvalError> {
        self.reducer.reduce(handle).into_result()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
