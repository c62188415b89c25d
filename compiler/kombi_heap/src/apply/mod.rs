//! Apply-nodes: deferred applications that memoize their own result.
//!
//! A node starts as a `(function, argument)` pair. The first reduction to
//! finish stores its result in place of the pair: the function reference
//! is released and the result is kept under the `Cached` tag (or the
//! `Exception` tag, if reduction failed). Re-reducing a stored node is a
//! lock and a clone.
//!
//! A *knot* is a node with no application inside: it stands for the value
//! of a data fixpoint `x = f x` while that value is being computed, and
//! refers to it weakly once it exists (see [`knot`]).

use std::fmt;
use std::sync::Weak;

use parking_lot::Mutex;

use crate::object::{Edge, Object, ObjectKind};
use crate::{EvalError, Handle};

/// What the evaluator sees when it inspects a node.
#[derive(Clone, Debug)]
pub enum ApplyState {
    /// Not reduced yet.
    Pending { function: Handle, argument: Handle },
    /// Memoized result, tagged `Cached` or `Exception`.
    Reduced(Handle),
}

enum Slots {
    Pending { function: Handle, argument: Handle },
    Reduced(Handle),
    Knot(Knot),
    Released,
}

#[derive(Clone)]
enum Knot {
    Unresolved,
    Weak(Weak<Object>),
    /// Static objects and exceptions, which cannot close a cycle.
    Strong(Handle),
}

impl Knot {
    fn value(&self) -> Option<Handle> {
        match self {
            Knot::Unresolved => None,
            Knot::Weak(target) => Some(target.upgrade().map_or_else(
                || {
                    Handle::exception(EvalError::BadFix {
                        found: "released self reference".to_owned(),
                    })
                },
                Handle::from,
            )),
            Knot::Strong(value) => Some(value.clone()),
        }
    }

    /// The value as seen through the node: tagged like a memoized result.
    fn reduced(&self) -> Handle {
        self.value().map_or_else(
            || Handle::exception(EvalError::BlackHole),
            Handle::into_cached,
        )
    }
}

/// A deferred application.
pub struct ApplyNode {
    slots: Mutex<Slots>,
}

impl ApplyNode {
    pub fn new(function: Handle, argument: Handle) -> Self {
        ApplyNode {
            slots: Mutex::new(Slots::Pending { function, argument }),
        }
    }

    /// Current contents. The lock is released before returning, so the
    /// caller may reduce the parts freely.
    pub fn snapshot(&self) -> ApplyState {
        match &*self.slots.lock() {
            Slots::Pending { function, argument } => ApplyState::Pending {
                function: function.clone(),
                argument: argument.clone(),
            },
            Slots::Reduced(result) => ApplyState::Reduced(result.clone()),
            Slots::Knot(knot) => ApplyState::Reduced(knot.reduced()),
            Slots::Released => inspected_after_release(),
        }
    }

    pub fn is_cached(&self) -> bool {
        match &*self.slots.lock() {
            Slots::Pending { .. } => false,
            Slots::Knot(knot) => !matches!(knot, Knot::Unresolved),
            Slots::Reduced(_) | Slots::Released => true,
        }
    }

    /// The memoized result, if reduced.
    pub fn cached(&self) -> Option<Handle> {
        match &*self.slots.lock() {
            Slots::Reduced(result) => Some(result.clone()),
            Slots::Knot(knot) => knot.value().map(Handle::into_cached),
            _ => None,
        }
    }

    pub fn is_knot(&self) -> bool {
        matches!(&*self.slots.lock(), Slots::Knot(_))
    }

    /// Value of a resolved knot. `None` for ordinary nodes and
    /// for knots still waiting on their value.
    pub fn knot_value(&self) -> Option<Handle> {
        match &*self.slots.lock() {
            Slots::Knot(knot) => knot.value(),
            _ => None,
        }
    }

    /// Point an unresolved knot at `value`.
    ///
    /// Shared objects are held weakly: `value` usually contains this knot.
    /// Resolving twice, or resolving an ordinary node, does nothing.
    pub fn resolve(&self, value: &Handle) {
        let mut slots = self.slots.lock();
        if let Slots::Knot(knot @ Knot::Unresolved) = &mut *slots {
            *knot = match value.downgrade() {
                _ if value.is_exception() => Knot::Strong(value.clone()),
                Some(target) => Knot::Weak(target),
                None => Knot::Strong(value.untagged()),
            };
        }
    }

    /// Memoize `result` and release the function reference.
    ///
    /// The first stored result wins; a later call returns it unchanged.
    pub fn store(&self, result: Handle) -> Handle {
        let cached = result.into_cached();
        let released = {
            let mut slots = self.slots.lock();
            match &*slots {
                Slots::Pending { .. } => {}
                Slots::Reduced(first) => return first.clone(),
                Slots::Knot(knot) => return knot.reduced(),
                Slots::Released => inspected_after_release(),
            }
            std::mem::replace(&mut *slots, Slots::Reduced(cached.clone()))
        };
        // Old slots are dropped outside the lock.
        drop(released);
        cached
    }

    /// Independent node with the same contents.
    pub(crate) fn duplicate(&self) -> ApplyNode {
        let slots = match &*self.slots.lock() {
            Slots::Pending { function, argument } => Slots::Pending {
                function: function.clone(),
                argument: argument.clone(),
            },
            Slots::Reduced(result) => Slots::Reduced(result.clone()),
            Slots::Knot(knot) => Slots::Knot(knot.clone()),
            Slots::Released => Slots::Released,
        };
        ApplyNode {
            slots: Mutex::new(slots),
        }
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Edge>) {
        match std::mem::replace(self.slots.get_mut(), Slots::Released) {
            Slots::Pending { function, argument } => {
                out.extend(function.into_edge());
                out.extend(argument.into_edge());
            }
            Slots::Reduced(result) | Slots::Knot(Knot::Strong(result)) => {
                out.extend(result.into_edge());
            }
            Slots::Knot(_) | Slots::Released => {}
        }
    }
}

// Only the destructor moves a node to `Released`, and nothing can reach a
// node that is being destroyed.
#[cold]
fn inspected_after_release() -> ! {
    unreachable!("apply-node inspected after release")
}

impl fmt::Debug for ApplyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.slots.lock() {
            Slots::Pending { .. } => f.write_str("Apply(pending)"),
            Slots::Reduced(result) => write!(f, "Apply({result:?})"),
            Slots::Knot(_) => f.write_str("Apply(self)"),
            Slots::Released => f.write_str("Apply(released)"),
        }
    }
}

/// Build the deferred application `function argument`. Nothing is
/// evaluated.
pub fn apply(function: Handle, argument: Handle) -> Handle {
    Handle::new(ObjectKind::Apply(ApplyNode::new(function, argument)))
}

/// Placeholder for the value of a data fixpoint.
///
/// Until [`ApplyNode::resolve`] is called, reducing the knot yields a
/// [`EvalError::BlackHole`] exception: the value was demanded while it was
/// still being computed.
pub fn knot() -> Handle {
    Handle::new(ObjectKind::Apply(ApplyNode {
        slots: Mutex::new(Slots::Knot(Knot::Unresolved)),
    }))
}
