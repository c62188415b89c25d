//! Reference counting and release.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kombi::prim::{identity, make_int};
use kombi::{apply, clone_object, evaluate, fix};
use pretty_assertions::assert_eq;

use crate::common::{app, tracked, Counter};

fn drops(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

#[test]
fn ref_count_tracks_outstanding_handles() {
    let value = make_int(7);
    assert_eq!(value.ref_count(), 1);

    let copies: Vec<_> = (0..5).map(|_| value.clone()).collect();
    assert_eq!(value.ref_count(), 6);

    drop(copies);
    assert_eq!(value.ref_count(), 1);
}

#[test]
fn application_retains_both_operands() {
    let function = Counter::sum(1).closure;
    let argument = make_int(1);
    let node = apply(function.clone(), argument.clone());
    assert_eq!(function.ref_count(), 2);
    assert_eq!(argument.ref_count(), 2);

    drop(node);
    assert_eq!(function.ref_count(), 1);
    assert_eq!(argument.ref_count(), 1);
}

#[test]
fn static_objects_are_not_counted() {
    let global = fix();
    let again = global.clone();
    assert!(global.is_static());
    assert_eq!(again.ref_count(), 0);
}

#[test]
fn shared_object_is_destroyed_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let value = tracked(&counter);
    let left = apply(identity(), value.clone());
    let right = apply(identity(), value.clone());
    let both = app(identity(), &[left.clone()]);

    drop(value);
    drop(left);
    assert_eq!(drops(&counter), 0);

    drop(both);
    assert_eq!(drops(&counter), 0);

    drop(right);
    assert_eq!(drops(&counter), 1);
}

#[test]
fn evaluated_graph_is_released() {
    let counter = Arc::new(AtomicUsize::new(0));
    let node = apply(identity(), tracked(&counter));
    let result = evaluate(&node).unwrap();
    assert!(result.ptr_eq(&evaluate(&node).unwrap()));

    drop(node);
    assert_eq!(drops(&counter), 0);
    drop(result);
    assert_eq!(drops(&counter), 1);
}

#[test]
fn copies_are_independent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let original = tracked(&counter);
    let copy = clone_object(&original).unwrap();
    assert!(!copy.ptr_eq(&original));

    drop(original);
    assert_eq!(drops(&counter), 1);
    drop(copy);
    assert_eq!(drops(&counter), 2);
}

#[test]
fn deep_graphs_release_without_recursion() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut term = tracked(&counter);
    for _ in 0..500_000 {
        term = apply(identity(), term);
    }
    drop(term);
    assert_eq!(drops(&counter), 1);
}
