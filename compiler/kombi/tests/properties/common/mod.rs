//! Shared combinators and payloads for the property tests.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kombi::prim::{add, int_type, make_int, sub, Int};
use kombi::{
    apply, make_closure, make_closure_with_arity, make_value, Args, EvalError, Handle, Payload,
    TypeValue,
};

/// Apply `function` to each argument in turn without evaluating.
pub fn app(function: Handle, arguments: &[Handle]) -> Handle {
    arguments
        .iter()
        .fold(function, |f, x| apply(f, x.clone()))
}

/// `Int -> ... -> Int` summing its arguments, counting body runs.
pub struct Counter {
    runs: Arc<AtomicUsize>,
    pub closure: Handle,
}

impl Counter {
    pub fn sum(arity: usize) -> Self {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let ty = TypeValue::arrow_chain(vec![int_type(); arity], int_type());
        let closure = make_closure(format!("sum{arity}"), ty, move |args: &Args<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut total = 0;
            for index in 0..args.len() {
                let Int(n) = args.value::<Int>(index)?;
                total += n;
            }
            Ok(make_int(total))
        })
        .unwrap();
        Counter { runs, closure }
    }

    /// `looping self = countdown self`: one declared argument, typed
    /// `(Int -> Int) -> (Int -> Int)`, so fixing it ties a data knot.
    pub fn looping() -> Self {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let int_to_int = TypeValue::arrow(int_type(), int_type());
        let ty = TypeValue::arrow(int_to_int.clone(), int_to_int);
        let closure = make_closure_with_arity("looping", ty, 1, move |args: &Args<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(apply(countdown(), args.lazy(0)?))
        })
        .unwrap();
        Counter { runs, closure }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

/// Payload that counts how often it is destroyed.
#[derive(Debug)]
pub struct Tracked(Arc<AtomicUsize>);

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
    make_value(
        TypeValue::value("Tracked").unwrap(),
        Tracked(Arc::clone(drops)),
    )
}

/// `fib self n`, typed `(Int -> Int) -> Int -> Int`.
pub fn fib_step() -> Handle {
    let int_to_int = TypeValue::arrow(int_type(), int_type());
    let ty = TypeValue::arrow_chain([int_to_int, int_type()], int_type());
    make_closure("fib", ty, |args: &Args<'_>| {
        let Int(n) = args.value::<Int>(1)?;
        if n < 2 {
            return Ok(make_int(n));
        }
        let this = args.lazy(0)?;
        let previous = apply(this.clone(), app(sub(), &[make_int(n), make_int(1)]));
        let before = apply(this, app(sub(), &[make_int(n), make_int(2)]));
        Ok(app(add(), &[previous, before]))
    })
    .unwrap()
}

/// `countdown self n = if n == 0 then 0 else self (n - 1)`.
pub fn countdown() -> Handle {
    let int_to_int = TypeValue::arrow(int_type(), int_type());
    let ty = TypeValue::arrow_chain([int_to_int, int_type()], int_type());
    make_closure("countdown", ty, |args: &Args<'_>| {
        let Int(n) = args.value::<Int>(1)?;
        if n == 0 {
            return Ok(make_int(0));
        }
        Ok(apply(args.lazy(0)?, app(sub(), &[make_int(n), make_int(1)])))
    })
    .unwrap()
}

/// `Int -> Int` that always raises a foreign error carrying `message`.
pub fn raising(message: &'static str) -> Handle {
    let ty = TypeValue::arrow(int_type(), int_type());
    make_closure("raise", ty, move |_: &Args<'_>| {
        Err(EvalError::foreign(message))
    })
    .unwrap()
}
