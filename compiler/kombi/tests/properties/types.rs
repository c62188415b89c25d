//! Unification and type reconstruction.

use kombi::prim::{add, constant, identity, if_then_else, int_type, lt, make_bool, make_int};
use kombi::{
    apply, evaluate, fix, make_closure, same_type, to_string, type_of, unify, DeclError, Handle,
    TypeError, TypeValue, UnifyError, MAX_TYPE_NAME_LEN,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{app, fib_step, Counter};

fn var() -> (kombi::VarId, TypeValue) {
    let ty = TypeValue::fresh_var();
    (ty.as_var().unwrap(), ty)
}

// Unification

#[test]
fn variable_binds_to_value() {
    let (x, tx) = var();
    let solution = unify([(tx, int_type())]).unwrap();
    assert_eq!(solution.lookup(x), Some(&int_type()));
}

#[test]
fn bindings_flow_into_later_equations() {
    let (x, tx) = var();
    let (y, ty) = var();
    let solution = unify([
        (tx.clone(), int_type()),
        (ty, TypeValue::arrow(tx.clone(), tx)),
    ])
    .unwrap();
    assert_eq!(solution.lookup(x), Some(&int_type()));
    assert_eq!(
        solution.lookup(y),
        Some(&TypeValue::arrow(int_type(), int_type()))
    );
}

#[test]
fn arrows_unify_componentwise() {
    let (x, tx) = var();
    let (y, ty) = var();
    let solution = unify([(
        TypeValue::arrow(int_type(), int_type()),
        TypeValue::arrow(tx, ty),
    )])
    .unwrap();
    assert_eq!(solution.lookup(x), Some(&int_type()));
    assert_eq!(solution.lookup(y), Some(&int_type()));
}

#[test]
fn self_reference_is_circular() {
    let (y, ty) = var();
    let looped = TypeValue::arrow(int_type(), ty.clone());
    assert!(matches!(
        unify([(ty, looped)]),
        Err(UnifyError::CircularConstraint { variable, .. }) if variable == y
    ));
}

// Declarations

#[test]
fn type_names_are_bounded() {
    let longest = "T".repeat(MAX_TYPE_NAME_LEN);
    assert!(TypeValue::value(&longest).is_ok());
    assert!(matches!(
        TypeValue::value(&format!("{longest}x")),
        Err(TypeError::NameTooLong { .. })
    ));
}

#[test]
fn closures_need_a_function_type() {
    let result = make_closure("nullary", int_type(), |args: &kombi::Args<'_>| args.force(0));
    assert!(matches!(result, Err(DeclError::ZeroArity { .. })));
}

// Reconstruction

#[test]
fn rendering_follows_the_term() {
    let render = |handle: &Handle| to_string(&type_of(handle).unwrap());

    assert_eq!(render(&make_int(1)), "Int");
    assert_eq!(render(&add()), "(Int -> (Int -> Int))");
    assert_eq!(render(&apply(add(), make_int(1))), "(Int -> Int)");
    assert_eq!(render(&app(lt(), &[make_int(1), make_int(2)])), "Bool");
    assert_eq!(render(&apply(fix(), fib_step())), "(Int -> Int)");
}

#[test]
fn polymorphic_use_is_specialized() {
    let term = apply(identity(), make_bool(true));
    assert!(same_type(&type_of(&term).unwrap(), &type_of(&make_bool(false)).unwrap()));
}

#[test]
fn mismatched_branches_are_rejected() {
    let term = app(if_then_else(), &[make_bool(true), make_int(1), make_bool(false)]);
    assert!(matches!(
        type_of(&term),
        Err(UnifyError::TypeMismatch { .. })
    ));
}

#[test]
fn reconstruction_is_pure() {
    let counter = Counter::sum(2);
    let term = app(counter.closure.clone(), &[make_int(1), make_int(2)]);
    let before = type_of(&term).unwrap();
    assert_eq!(counter.runs(), 0);

    evaluate(&term).unwrap();
    assert_eq!(type_of(&term).unwrap(), before);
}

// Rendering is deterministic

#[derive(Clone, Debug)]
enum Recipe {
    Int(i64),
    Bool(bool),
    Add,
    Identity,
    Constant,
    If,
    Apply(Box<Recipe>, Box<Recipe>),
}

fn recipe() -> impl Strategy<Value = Recipe> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Recipe::Int),
        any::<bool>().prop_map(Recipe::Bool),
        Just(Recipe::Add),
        Just(Recipe::Identity),
        Just(Recipe::Constant),
        Just(Recipe::If),
    ];
    leaf.prop_recursive(6, 48, 2, |inner| {
        (inner.clone(), inner).prop_map(|(f, x)| Recipe::Apply(Box::new(f), Box::new(x)))
    })
}

fn build(recipe: &Recipe) -> Handle {
    match recipe {
        Recipe::Int(n) => make_int(*n),
        Recipe::Bool(b) => make_bool(*b),
        Recipe::Add => add(),
        Recipe::Identity => identity(),
        Recipe::Constant => constant(),
        Recipe::If => if_then_else(),
        Recipe::Apply(f, x) => apply(build(f), build(x)),
    }
}

proptest! {
    #[test]
    fn rendering_is_idempotent(recipe in recipe()) {
        let term = build(&recipe);
        // Error messages name fresh variables, so only successes are compared.
        let render = || type_of(&term).ok().map(|ty| to_string(&ty));
        prop_assert_eq!(render(), render());
    }
}
