//! Shared graphs and static combinators used from several threads.

use std::thread;

use kombi::prim::{as_int, make_int};
use kombi::{apply, evaluate, fix, init_tracing};
use pretty_assertions::assert_eq;

use crate::common::fib_step;

const THREADS: usize = 8;

#[test]
fn shared_fixpoint_reduces_on_every_thread() {
    let fib = apply(fix(), fib_step());

    let results: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let fib = fib.clone();
                scope.spawn(move || as_int(&evaluate(&apply(fib, make_int(15))).unwrap()))
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    assert_eq!(results, vec![Some(610); THREADS]);
    assert_eq!(fib.ref_count(), 1);
    assert_eq!(fix().ref_count(), 0);

    // One knot survives, owned by the node's memo and this handle.
    let knot = evaluate(&fib).unwrap();
    assert_eq!(knot.ref_count(), 2);
}

#[test]
fn independent_graphs_share_static_combinators() {
    let results: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS as i64)
            .map(|n| {
                scope.spawn(move || {
                    let fib = apply(fix(), fib_step());
                    as_int(&evaluate(&apply(fib, make_int(n))).unwrap())
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    assert_eq!(results, [0, 1, 1, 2, 3, 5, 8, 13].map(Some).to_vec());
}

#[test]
fn tracing_setup_tolerates_concurrent_calls() {
    thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS).map(|_| scope.spawn(init_tracing)).collect();
        for worker in workers {
            worker.join().unwrap();
        }
    });
    init_tracing();
}
