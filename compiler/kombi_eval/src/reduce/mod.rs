//! The graph-reduction loop.
//!
//! [`Evaluator::evaluate`] reduces a handle to weak-head-normal form. The
//! cases are checked in order:
//!
//! 1. an exception handle is returned untouched;
//! 2. a reduced apply-node returns its memoized result;
//! 3. a pending apply-node reduces its function position, binds the
//!    *unevaluated* argument into the resulting closure, runs the body if
//!    that saturated it, and memoizes whatever came out;
//! 4. a saturated closure runs its body (once);
//! 5. anything else is already in weak-head-normal form.
//!
//! Failures never unwind out of a body: the invocation boundary turns a
//! returned error (or, with `catch_panics`, a panic) into an exception
//! handle, which then propagates as data through every enclosing node.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use kombi_heap::{apply_argument, ApplyState, Closure, EvalError, Handle, ObjectKind, Reduce};

use crate::options::EvalOptions;
use crate::{ensure_sufficient_stack, typeck};

/// Reduces terms with a fixed set of options.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    options: EvalOptions,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Self {
        Evaluator { options }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Reduce `handle` to weak-head-normal form.
    ///
    /// The result is an exception handle on failure. Results memoized in
    /// an apply-node come back under the `Cached` tag.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn evaluate(&self, handle: &Handle) -> Handle {
        self.whnf(handle)
    }

    /// [`evaluate`](Self::evaluate), with an exception translated back
    /// into its error and any tag cleared from a successful result.
    pub fn evaluate_to_result(&self, handle: &Handle) -> Result<Handle, EvalError> {
        self.whnf(handle).into_result()
    }

    fn whnf(&self, handle: &Handle) -> Handle {
        if handle.is_exception() || handle.is_cached() {
            return handle.clone();
        }
        match handle.obj_ref().kind() {
            ObjectKind::Apply(node) => match node.snapshot() {
                ApplyState::Reduced(result) => {
                    tracing::debug!("apply-node cache hit");
                    result
                }
                ApplyState::Pending { function, argument } => {
                    let result = self.reduce_application(&function, argument);
                    node.store(result)
                }
            },
            ObjectKind::Closure(closure) if closure.is_saturated() => self.run(handle, closure),
            ObjectKind::Value(_) | ObjectKind::Closure(_) | ObjectKind::Exception(_) => {
                handle.clone()
            }
        }
    }

    fn reduce_application(&self, function: &Handle, argument: Handle) -> Handle {
        let function = ensure_sufficient_stack(|| self.whnf(function));
        if function.is_exception() {
            return function;
        }

        let bound = match apply_argument(function, argument) {
            Ok(bound) => bound,
            Err(err) => return Handle::exception(err),
        };
        match bound.as_closure() {
            Some(closure) if closure.is_saturated() => self.run(&bound, closure),
            _ => bound,
        }
    }

    /// Run the body of a saturated closure and reduce what it returns.
    /// The body runs at most once per closure object.
    fn run(&self, handle: &Handle, closure: &Closure) -> Handle {
        closure.result_or_run(|| {
            let raw = self.invoke(closure);
            let result = ensure_sufficient_stack(|| self.whnf(&raw));
            if self.options.check_results && !result.is_exception() {
                if let Err(err) = typeck::check_result(handle, &result) {
                    tracing::debug!(combinator = closure.combinator().name(), %err, "result check failed");
                    return Handle::exception(err);
                }
            }
            result
        })
    }

    /// The invocation boundary: whatever the body does, a handle comes out.
    fn invoke(&self, closure: &Closure) -> Handle {
        let combinator = closure.combinator();
        tracing::trace!(combinator = combinator.name(), "invoke");
        let args = closure.args(self);

        let outcome = if self.options.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| combinator.invoke(&args))).unwrap_or_else(
                |payload| {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(combinator = combinator.name(), %message, "body panicked");
                    Err(EvalError::Foreign { message })
                },
            )
        } else {
            combinator.invoke(&args)
        };

        outcome.unwrap_or_else(Handle::exception)
    }
}

impl Reduce for Evaluator {
    fn reduce(&self, handle: &Handle) -> Handle {
        ensure_sufficient_stack(|| self.whnf(handle))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "combinator body panicked".to_owned()
    }
}

/// Reduce `handle` with default options.
pub fn evaluate(handle: &Handle) -> Handle {
    Evaluator::default().evaluate(handle)
}
