//! Heap object model for the Kombi runtime.
//!
//! Programs are graphs of heap objects reached through [`Handle`]s:
//!
//! - **Values** ([`Boxed`]) wrap a primitive payload behind the [`Payload`]
//!   dispatch trait (size, clone, destroy hook) together with its type tag.
//! - **Closures** ([`Closure`]) are instances of a declared [`Combinator`]
//!   with a remaining arity and a fixed argument array filled back to front.
//! - **Apply-nodes** ([`ApplyNode`]) are deferred applications that memoize
//!   their own reduction result in place.
//! - **Exceptions** carry an [`EvalError`] out of reduction as data.
//!
//! # Ownership
//!
//! A handle owns one strong reference. Shared objects are `Arc`-backed, so
//! the count is updated with atomic read-modify-write operations and the
//! final release synchronizes with every earlier one before the object is
//! destroyed. Process-lifetime objects (the built-in combinators) are
//! [`ObjRef::Static`] and are never counted, mutated, or freed.
//!
//! Destruction never recurses on the native stack: releasing the last
//! reference to an object drains its children into a worklist and unwraps
//! uniquely owned descendants iteratively, so arbitrarily deep graphs can
//! be dropped safely.
//!
//! # Tags
//!
//! A [`Handle`] is plain, *cached* (a memoized reduction result stored in an
//! apply-node) or an *exception*. Tags describe the reference, not the
//! pointee; inspectors such as [`Handle::as_closure`] only look through
//! plain handles, so callers clear the tag with [`Handle::untagged`] first.
//!
//! # Concurrency
//!
//! Reduction of a single graph is single-threaded. Independent graphs, or
//! handles to shared static objects, may be used from different threads.
//! An apply-node provides no ordering guarantee when two threads reduce it
//! at once beyond "first stored result wins".

mod apply;
mod closure;
mod error;
mod handle;
mod object;
mod thunk;

#[cfg(test)]
mod test_helpers;

pub use apply::{apply, knot, ApplyNode, ApplyState};
pub use closure::{apply_argument, bind_self, Args, BodyFn, Closure, Combinator};
pub use error::{DeclError, EvalError};
pub use handle::{Handle, Tag};
pub use object::{clone_object, make_value, Boxed, ObjRef, Object, ObjectKind, Payload};
pub use thunk::{Reduce, Thunk};
