//! Heap objects and their release discipline.
//!
//! # Layout
//!
//! ```text
//! Handle ──► ObjRef ──► Object { kind }
//!                          ├── Value(Boxed { tag, payload: Box<dyn Payload> })
//!                          ├── Closure(Closure)
//!                          ├── Apply(ApplyNode)
//!                          └── Exception(EvalError)
//! ```
//!
//! The object header is the `Arc` control block (strong count) plus the
//! [`Payload`] vtable for boxed values. Static objects bypass the count.
//!
//! # Release
//!
//! `Drop for Object` moves every owned child onto a local worklist and
//! keeps unwrapping children whose last reference it holds. Each object is
//! therefore destroyed exactly once and the native stack stays flat no
//! matter how deep the graph is.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use kombi_types::TypeValue;

use crate::apply::ApplyNode;
use crate::closure::Closure;
use crate::thunk::Thunk;
use crate::{EvalError, Handle};

/// Dispatch table of a boxed primitive value.
///
/// Implemented by the primitive library for every payload it boxes.
pub trait Payload: Any + Send + Sync + fmt::Debug {
    /// Independent copy of this payload.
    fn clone_payload(&self) -> Box<dyn Payload>;

    /// Size in bytes of the payload, for accounting.
    fn size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    /// Move out every handle this payload owns.
    ///
    /// Called once, right before the payload is destroyed, so nested
    /// handles are released through the worklist instead of recursively.
    fn drain_handles(&mut self, _out: &mut Vec<Handle>) {}

    fn as_any(&self) -> &dyn Any;
}

/// A boxed primitive: a type tag plus its payload.
pub struct Boxed {
    tag: TypeValue,
    payload: Box<dyn Payload>,
}

impl Boxed {
    pub fn new(tag: TypeValue, payload: Box<dyn Payload>) -> Self {
        Boxed { tag, payload }
    }

    #[inline]
    pub fn tag(&self) -> &TypeValue {
        &self.tag
    }

    #[inline]
    pub fn payload(&self) -> &dyn Payload {
        &*self.payload
    }

    pub fn downcast<T: Payload>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} : {}", self.payload, self.tag)
    }
}

/// What a heap object is.
pub enum ObjectKind {
    Value(Boxed),
    Closure(Closure),
    Apply(ApplyNode),
    Exception(EvalError),
}

/// A heap object.
pub struct Object {
    kind: ObjectKind,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object { kind }
    }

    /// Promote an object to a process-lifetime static.
    ///
    /// The result is never freed; handles to it are not counted.
    pub fn leak(kind: ObjectKind) -> &'static Object {
        Box::leak(Box::new(Object::new(kind)))
    }

    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Short description used in diagnostics (`BadApply`, `BadFix`, ...).
    pub fn describe(&self) -> String {
        match &self.kind {
            ObjectKind::Value(boxed) => boxed.tag.to_string(),
            ObjectKind::Closure(closure) => format!(
                "closure `{}` ({} of {} arguments missing)",
                closure.combinator().name(),
                closure.arity(),
                closure.total_arity()
            ),
            ObjectKind::Apply(_) => "unevaluated application".to_owned(),
            ObjectKind::Exception(err) => format!("exception: {err}"),
        }
    }

    /// Move every owned child edge onto `out`.
    fn drain_into(&mut self, out: &mut Vec<Edge>) {
        match &mut self.kind {
            ObjectKind::Value(boxed) => {
                let mut handles = Vec::new();
                boxed.payload.drain_handles(&mut handles);
                out.extend(handles.into_iter().filter_map(Handle::into_edge));
            }
            ObjectKind::Closure(closure) => closure.drain_into(out),
            ObjectKind::Apply(node) => node.drain_into(out),
            ObjectKind::Exception(_) => {}
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ObjectKind::Value(boxed) => write!(f, "Value({boxed:?})"),
            ObjectKind::Closure(closure) => write!(f, "{closure:?}"),
            ObjectKind::Apply(node) => write!(f, "{node:?}"),
            ObjectKind::Exception(err) => write!(f, "Exception({err:?})"),
        }
    }
}

/// An owned edge of the object graph.
pub(crate) enum Edge {
    Object(Arc<Object>),
    Thunk(Arc<Thunk>),
}

impl Drop for Object {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_into(&mut pending);
        while let Some(edge) = pending.pop() {
            match edge {
                Edge::Object(obj) => {
                    // Only the last owner tears the child down; it is then
                    // dropped with no children left, so this drop does not recurse.
                    if let Some(mut inner) = Arc::into_inner(obj) {
                        inner.drain_into(&mut pending);
                    }
                }
                Edge::Thunk(thunk) => {
                    if let Some(inner) = Arc::into_inner(thunk) {
                        pending.extend(inner.into_edge());
                    }
                }
            }
        }
    }
}

/// Reference to an object: counted or static.
#[derive(Clone)]
pub enum ObjRef {
    Shared(Arc<Object>),
    Static(&'static Object),
}

impl ObjRef {
    /// Outstanding strong references; static objects report 0.
    pub fn ref_count(&self) -> usize {
        match self {
            ObjRef::Shared(obj) => Arc::strong_count(obj),
            ObjRef::Static(_) => 0,
        }
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        std::ptr::eq(&**self, &**other)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, ObjRef::Static(_))
    }
}

impl Deref for ObjRef {
    type Target = Object;

    fn deref(&self) -> &Object {
        match self {
            ObjRef::Shared(obj) => obj,
            ObjRef::Static(obj) => obj,
        }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Box a primitive payload under type `tag`.
pub fn make_value(tag: TypeValue, payload: impl Payload) -> Handle {
    Handle::new(ObjectKind::Value(Boxed::new(tag, Box::new(payload))))
}

/// Copy the object behind `handle` into a fresh object with one reference.
///
/// Tags are preserved. Closures are copied slot by slot; the argument
/// array reservation is the one allocation that can fail, reported as
/// [`EvalError::AllocationFailure`].
pub fn clone_object(handle: &Handle) -> Result<Handle, EvalError> {
    let kind = match handle.target().kind() {
        ObjectKind::Value(boxed) => ObjectKind::Value(Boxed::new(
            boxed.tag.clone(),
            boxed.payload.clone_payload(),
        )),
        ObjectKind::Closure(closure) => ObjectKind::Closure(closure.try_clone()?),
        ObjectKind::Apply(node) => ObjectKind::Apply(node.duplicate()),
        ObjectKind::Exception(err) => ObjectKind::Exception(err.clone()),
    };
    let obj = ObjRef::Shared(Arc::new(Object::new(kind)));
    Ok(handle.with_target(obj))
}
