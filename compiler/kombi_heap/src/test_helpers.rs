//! Payloads and a stub reducer for heap unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kombi_types::TypeValue;

use crate::{make_value, Args, Combinator, EvalError, Handle, Payload, Reduce};

pub fn int() -> TypeValue {
    TypeValue::value("Int").unwrap()
}

/// Plain integer payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Num(pub i64);

impl Payload for Num {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn num(n: i64) -> Handle {
    make_value(int(), Num(n))
}

/// Payload that counts its own destruction.
#[derive(Debug)]
pub struct Tracked(pub Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Payload for Tracked {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(Tracked(Arc::clone(&self.0)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn tracked(drops: &Arc<AtomicUsize>) -> Handle {
    make_value(TypeValue::value("Tracked").unwrap(), Tracked(Arc::clone(drops)))
}

pub fn drops(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Payload owning other handles, released through the destroy hook.
#[derive(Debug)]
pub struct Pair(pub Vec<Handle>);

impl Payload for Pair {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(Pair(self.0.clone()))
    }

    fn drain_handles(&mut self, out: &mut Vec<Handle>) {
        out.append(&mut self.0);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn pair(first: Handle, second: Handle) -> Handle {
    make_value(TypeValue::value("Pair").unwrap(), Pair(vec![first, second]))
}

/// Reducer that treats every handle as already reduced and counts calls.
#[derive(Default)]
pub struct StubReducer {
    pub calls: AtomicUsize,
}

impl Reduce for StubReducer {
    fn reduce(&self, handle: &Handle) -> Handle {
        self.calls.fetch_add(1, Ordering::SeqCst);
        handle.clone()
    }
}

impl StubReducer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// `Int -> Int -> Int` returning its first argument.
pub fn first_of_two() -> Arc<Combinator> {
    let ty = TypeValue::arrow_chain([int(), int()], int());
    Arc::new(Combinator::new("first", ty, |args: &Args<'_>| args.force(0)).unwrap())
}

/// `Int -> Int` whose body always fails.
pub fn failing() -> Arc<Combinator> {
    let ty = TypeValue::arrow(int(), int());
    Arc::new(
        Combinator::new("failing", ty, |_: &Args<'_>| {
            Err(EvalError::foreign("boom"))
        })
        .unwrap(),
    )
}
