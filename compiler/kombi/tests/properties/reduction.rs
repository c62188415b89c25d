//! Laziness, memoization, saturation, fixpoints and exception propagation.

use kombi::prim::{as_int, constant, fail, identity, make_int, make_str};
use kombi::{apply, apply_argument, evaluate, fix, EvalError, EvalOptions, Evaluator, Tag};
use pretty_assertions::assert_eq;

use crate::common::{app, fib_step, raising, Counter};

#[test]
fn building_a_graph_evaluates_nothing() {
    let counter = Counter::sum(2);
    let _term = app(counter.closure.clone(), &[make_int(1), make_int(2)]);
    assert_eq!(counter.runs(), 0);
}

#[test]
fn apply_node_is_memoized() {
    let counter = Counter::sum(1);
    let node = apply(counter.closure.clone(), make_int(4));

    let first = evaluate(&node).unwrap();
    let second = evaluate(&node).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(as_int(&first), Some(4));
    assert_eq!(counter.runs(), 1);
}

#[test]
fn shared_argument_is_forced_once() {
    let inner = Counter::sum(1);
    let outer = Counter::sum(2);
    let shared = apply(inner.closure.clone(), make_int(10));
    let term = app(outer.closure.clone(), &[shared.clone(), shared]);

    assert_eq!(as_int(&evaluate(&term).unwrap()), Some(20));
    assert_eq!(inner.runs(), 1);
    assert_eq!(outer.runs(), 1);
}

#[test]
fn unused_argument_is_never_forced() {
    let counter = Counter::sum(1);
    let ignored = apply(counter.closure.clone(), make_int(1));
    let term = app(constant(), &[make_int(5), ignored]);

    assert_eq!(as_int(&evaluate(&term).unwrap()), Some(5));
    assert_eq!(counter.runs(), 0);
}

#[test]
fn saturation_runs_body_once() {
    let counter = Counter::sum(3);
    let mut closure = counter.closure.clone();
    for n in 1..=3 {
        closure = apply_argument(closure, make_int(n)).unwrap();
    }
    assert!(closure.as_closure().unwrap().is_saturated());
    assert_eq!(counter.runs(), 0);

    assert_eq!(as_int(&evaluate(&closure).unwrap()), Some(6));
    assert_eq!(as_int(&evaluate(&closure).unwrap()), Some(6));
    assert_eq!(counter.runs(), 1);

    let extra = apply_argument(closure, make_int(4));
    assert!(matches!(extra, Err(EvalError::TooManyArguments { .. })));
}

#[test]
fn partial_application_leaves_declaration_untouched() {
    let counter = Counter::sum(2);
    let plus_one = apply_argument(counter.closure.clone(), make_int(1)).unwrap();
    let plus_two = apply_argument(counter.closure.clone(), make_int(2)).unwrap();

    assert_eq!(counter.closure.as_closure().unwrap().arity(), 2);
    assert_eq!(as_int(&evaluate(&apply(plus_one, make_int(10))).unwrap()), Some(11));
    assert_eq!(as_int(&evaluate(&apply(plus_two, make_int(10))).unwrap()), Some(12));
}

#[test]
fn applying_a_value_is_bad_apply() {
    let result = evaluate(&apply(make_int(1), make_int(2)));
    assert_eq!(
        result.unwrap_err(),
        EvalError::BadApply {
            found: "Int".to_owned()
        }
    );
}

#[test]
fn fixed_fibonacci() {
    let fib = apply(fix(), fib_step());
    let result = evaluate(&apply(fib, make_int(10))).unwrap();
    assert_eq!(as_int(&result), Some(55));
}

#[test]
fn data_fixpoint_shares_one_value() {
    let looping = Counter::looping();
    let fixed = apply(fix(), looping.closure.clone());

    let result = evaluate(&apply(fixed.clone(), make_int(5))).unwrap();
    assert_eq!(as_int(&result), Some(0));
    assert_eq!(as_int(&evaluate(&apply(fixed, make_int(12))).unwrap()), Some(0));
    assert_eq!(looping.runs(), 1);
}

#[test]
fn self_demanding_fixpoint_is_a_black_hole() {
    let result = evaluate(&apply(fix(), identity()));
    assert_eq!(result.unwrap_err(), EvalError::BlackHole);
}

#[test]
fn fixing_a_value_is_bad_fix() {
    let result = evaluate(&apply(fix(), make_int(3)));
    assert!(matches!(result, Err(EvalError::BadFix { .. })));
}

#[test]
fn exceptions_propagate_unwrapped() {
    let raised = apply(raising("disk on fire"), make_int(0));
    let wrapped = apply(identity(), apply(identity(), raised));
    let outer = app(constant(), &[wrapped, make_int(1)]);

    assert_eq!(
        evaluate(&outer).unwrap_err(),
        EvalError::foreign("disk on fire")
    );
}

#[test]
fn failure_message_survives() {
    let term = apply(fail(), make_str("no such key"));
    assert_eq!(
        evaluate(&term).unwrap_err().to_string(),
        "no such key"
    );
}

#[test]
fn evaluator_reports_exceptions_as_tagged_handles() {
    let evaluator = Evaluator::new(EvalOptions::new().with_check_results(true));
    let raised = apply(raising("tagged"), make_int(0));

    let result = evaluator.evaluate(&raised);
    assert_eq!(result.tag(), Tag::Exception);
    assert_eq!(result.error(), Some(&EvalError::foreign("tagged")));
}
