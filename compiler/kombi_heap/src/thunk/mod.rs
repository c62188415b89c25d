//! Suspended computations bound to argument slots.
//!
//! Every argument is bound lazily: the slot holds a [`Thunk`] around the
//! unevaluated handle, and the first [`Thunk::force`] evaluates and
//! memoizes it. Later forces return the memo, so each argument is reduced
//! at most once, and only if a body asks for it.
//!
//! A third state, [`Thunk::recursive`], is the fixpoint back edge: a
//! non-owning reference from a self-referential closure to itself. A
//! pending thunk around a [`knot`](crate::knot) is a back edge too: it is
//! never memoized, since the memo would own the value that owns the thunk.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::object::{Edge, Object};
use crate::{ApplyNode, EvalError, Handle};

/// Reduction to weak-head-normal form.
///
/// Implemented by the evaluator; the heap layer only needs it to force
/// thunks on behalf of combinator bodies.
pub trait Reduce {
    /// Reduce `handle`. Failures come back as exception handles.
    fn reduce(&self, handle: &Handle) -> Handle;
}

enum ThunkState {
    Pending(Handle),
    Forced(Handle),
    Recursive(Weak<Object>),
}

/// At-most-once evaluated argument.
pub struct Thunk {
    state: Mutex<ThunkState>,
}

impl Thunk {
    /// Suspend `handle` until first forced.
    pub fn pending(handle: Handle) -> Self {
        Thunk {
            state: Mutex::new(ThunkState::Pending(handle)),
        }
    }

    /// Already evaluated.
    pub fn forced(handle: Handle) -> Self {
        Thunk {
            state: Mutex::new(ThunkState::Forced(handle)),
        }
    }

    /// Non-owning reference to a closure that is bound into itself.
    pub fn recursive(target: Weak<Object>) -> Self {
        Thunk {
            state: Mutex::new(ThunkState::Recursive(target)),
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.lock(), ThunkState::Forced(_))
    }

    pub fn is_recursive(&self) -> bool {
        match &*self.state.lock() {
            ThunkState::Recursive(_) => true,
            ThunkState::Pending(handle) => is_knot(handle),
            ThunkState::Forced(_) => false,
        }
    }

    /// Evaluate on first use, then return the memo.
    pub fn force(&self, reducer: &dyn Reduce) -> Handle {
        let (pending, memoize) = {
            let state = self.state.lock();
            match &*state {
                ThunkState::Forced(value) => return value.clone(),
                ThunkState::Recursive(target) => return upgrade(target),
                ThunkState::Pending(handle) => (handle.clone(), !is_knot(handle)),
            }
        };

        // The lock is released while reducing: the argument may itself
        // force other thunks of the same closure.
        let value = reducer.reduce(&pending);
        if !memoize {
            return value;
        }

        let mut state = self.state.lock();
        match &*state {
            ThunkState::Forced(first) => first.clone(),
            _ => {
                *state = ThunkState::Forced(value.clone());
                value
            }
        }
    }

    /// The handle in this slot without evaluating anything: the memo if
    /// forced, else the suspended expression.
    pub fn peek(&self) -> Handle {
        match &*self.state.lock() {
            ThunkState::Pending(handle) | ThunkState::Forced(handle) => handle.clone(),
            ThunkState::Recursive(target) => upgrade(target),
        }
    }

    /// Slot to put into a copy of the closure owning `this`.
    ///
    /// Ordinary thunks are shared between copies. A recursive back edge
    /// becomes a strong edge in the copy: the copy keeps the original
    /// self-referential closure alive, while the original still does not
    /// keep itself alive. A resolved knot likewise becomes its value.
    pub(crate) fn for_copy(this: &Arc<Thunk>) -> Arc<Thunk> {
        let strong = match &*this.state.lock() {
            ThunkState::Recursive(target) => target.upgrade().map(Handle::from),
            ThunkState::Pending(handle) => handle.as_apply().and_then(ApplyNode::knot_value),
            ThunkState::Forced(_) => None,
        };
        match strong {
            Some(strong) => Arc::new(Thunk::forced(strong)),
            None => Arc::clone(this),
        }
    }

    /// Owned edge for the release worklist. Back edges own nothing.
    pub(crate) fn into_edge(self) -> Option<Edge> {
        match self.state.into_inner() {
            ThunkState::Pending(handle) | ThunkState::Forced(handle) => handle.into_edge(),
            ThunkState::Recursive(_) => None,
        }
    }
}

fn is_knot(handle: &Handle) -> bool {
    handle.as_apply().is_some_and(ApplyNode::is_knot)
}

fn upgrade(target: &Weak<Object>) -> Handle {
    match target.upgrade() {
        Some(strong) => Handle::from(strong),
        None => Handle::exception(EvalError::BadFix {
            found: "released self reference".to_owned(),
        }),
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.lock() {
            ThunkState::Pending(_) => f.write_str("Thunk(pending)"),
            ThunkState::Forced(value) => write!(f, "Thunk({value:?})"),
            ThunkState::Recursive(_) => f.write_str("Thunk(self)"),
        }
    }
}
