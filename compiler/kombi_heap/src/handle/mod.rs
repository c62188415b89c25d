//! Tagged handles.
//!
//! A [`Handle`] is one strong reference plus a tag describing the
//! reference itself:
//!
//! | tag         | meaning                                              |
//! |-------------|------------------------------------------------------|
//! | `Pointer`   | ordinary reference                                   |
//! | `Cached`    | memoized reduction result stored in an apply-node    |
//! | `Exception` | error payload propagating out of evaluation          |
//!
//! Cloning retains, dropping releases. Static targets are never counted.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::apply::ApplyNode;
use crate::closure::Closure;
use crate::object::{Boxed, Edge, ObjRef, Object, ObjectKind, Payload};
use crate::EvalError;

/// Tag carried by a handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tag {
    None,
    Cached,
    Exception,
}

/// A tagged, reference-counted reference to a heap object.
#[derive(Clone)]
pub enum Handle {
    Pointer(ObjRef),
    Cached(ObjRef),
    Exception(ObjRef),
}

impl Handle {
    /// Allocate a new object and return the only reference to it.
    pub fn new(kind: ObjectKind) -> Self {
        Handle::Pointer(ObjRef::Shared(Arc::new(Object::new(kind))))
    }

    /// Plain handle to a process-lifetime object.
    pub fn from_static(obj: &'static Object) -> Self {
        Handle::Pointer(ObjRef::Static(obj))
    }

    /// Box `err` into an exception object and return an exception handle.
    pub fn exception(err: EvalError) -> Self {
        Handle::Exception(ObjRef::Shared(Arc::new(Object::new(ObjectKind::Exception(
            err,
        )))))
    }

    pub fn tag(&self) -> Tag {
        match self {
            Handle::Pointer(_) => Tag::None,
            Handle::Cached(_) => Tag::Cached,
            Handle::Exception(_) => Tag::Exception,
        }
    }

    #[inline]
    pub fn is_exception(&self) -> bool {
        matches!(self, Handle::Exception(_))
    }

    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Handle::Cached(_))
    }

    /// The object reference, ignoring the tag.
    #[inline]
    pub fn obj_ref(&self) -> &ObjRef {
        match self {
            Handle::Pointer(obj) | Handle::Cached(obj) | Handle::Exception(obj) => obj,
        }
    }

    /// The pointee, ignoring the tag. Crate-internal: public inspection goes
    /// through the tag-checking accessors below.
    #[inline]
    pub(crate) fn target(&self) -> &Object {
        self.obj_ref()
    }

    /// Same tag, different target.
    pub(crate) fn with_target(&self, obj: ObjRef) -> Handle {
        match self {
            Handle::Pointer(_) => Handle::Pointer(obj),
            Handle::Cached(_) => Handle::Cached(obj),
            Handle::Exception(_) => Handle::Exception(obj),
        }
    }

    /// A plain handle to the same object (tag cleared).
    pub fn untagged(&self) -> Handle {
        Handle::Pointer(self.obj_ref().clone())
    }

    pub fn into_untagged(self) -> Handle {
        match self {
            Handle::Pointer(obj) | Handle::Cached(obj) | Handle::Exception(obj) => {
                Handle::Pointer(obj)
            }
        }
    }

    /// Mark as a memoized result. Exceptions keep their tag.
    pub(crate) fn into_cached(self) -> Handle {
        match self {
            Handle::Pointer(obj) | Handle::Cached(obj) => Handle::Cached(obj),
            exception @ Handle::Exception(_) => exception,
        }
    }

    /// Outstanding strong references to the target; 0 for static objects.
    pub fn ref_count(&self) -> usize {
        self.obj_ref().ref_count()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.obj_ref().is_static()
    }

    /// Identity of the target, ignoring tags.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        self.obj_ref().ptr_eq(other.obj_ref())
    }

    /// Non-owning back reference. `None` for static objects, which need none.
    pub fn downgrade(&self) -> Option<Weak<Object>> {
        match self.obj_ref() {
            ObjRef::Shared(obj) => Some(Arc::downgrade(obj)),
            ObjRef::Static(_) => None,
        }
    }

    /// The error carried by an exception handle.
    pub fn error(&self) -> Option<&EvalError> {
        match self {
            Handle::Exception(obj) => match obj.kind() {
                ObjectKind::Exception(err) => Some(err),
                _ => None,
            },
            _ => None,
        }
    }

    /// Translate a tagged handle back into the error taxonomy.
    ///
    /// Meant for the outermost consumer of a reduction; inside reduction
    /// exceptions stay tagged handles.
    pub fn into_result(self) -> Result<Handle, EvalError> {
        match self.error() {
            Some(err) => Err(err.clone()),
            None => Ok(self.into_untagged()),
        }
    }

    // Inspection (plain handles only)

    fn plain(&self) -> Option<&Object> {
        match self {
            Handle::Pointer(obj) => Some(obj),
            Handle::Cached(_) | Handle::Exception(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Boxed> {
        match self.plain()?.kind() {
            ObjectKind::Value(boxed) => Some(boxed),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match self.plain()?.kind() {
            ObjectKind::Closure(closure) => Some(closure),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<&ApplyNode> {
        match self.plain()?.kind() {
            ObjectKind::Apply(node) => Some(node),
            _ => None,
        }
    }

    /// The payload of a boxed value, if it has type `T`.
    pub fn downcast<T: Payload>(&self) -> Option<&T> {
        self.as_value()?.downcast::<T>()
    }

    /// Human-readable summary of the target.
    pub fn describe(&self) -> String {
        self.target().describe()
    }

    /// Owned graph edge for the release worklist.
    pub(crate) fn into_edge(self) -> Option<Edge> {
        match self {
            Handle::Pointer(ObjRef::Shared(obj))
            | Handle::Cached(ObjRef::Shared(obj))
            | Handle::Exception(ObjRef::Shared(obj)) => Some(Edge::Object(obj)),
            _ => None,
        }
    }
}

impl From<Arc<Object>> for Handle {
    fn from(obj: Arc<Object>) -> Self {
        Handle::Pointer(ObjRef::Shared(obj))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Pointer(obj) => write!(f, "{obj:?}"),
            Handle::Cached(obj) => write!(f, "Cached({obj:?})"),
            Handle::Exception(obj) => write!(f, "{obj:?}"),
        }
    }
}
