//! Syntactic unification with occurs check.
//!
//! # Algorithm
//!
//! Equations sit on a LIFO worklist. Each step pops one equation `a = b`:
//!
//! 1. `a == b` structurally: discard.
//! 2. Either side is a variable `v` not occurring in the other side `t`:
//!    record `v -> t`, rewrite the rest of the worklist and every earlier
//!    binding with it. If `v` occurs in `t` the set is unsolvable
//!    ([`UnifyError::CircularConstraint`]).
//! 3. Both sides are arrows: push `result = result'`, then
//!    `parameter = parameter'`, so parameters are resolved first.
//! 4. Anything else: [`UnifyError::TypeMismatch`].
//!
//! # Ordering
//!
//! The initial equations are loaded so that the first one is on top of the
//! stack. Together with rule 3 this fixes which variable is bound first
//! when several solutions exist, so the output is reproducible for a
//! given term shape:
//!
//! ```text
//! unify([X = Int, Y = (X -> X)])      => [X -> Int, Y -> (Int -> Int)]
//! unify([(Int -> Int) = (X -> Y)])    => [X -> Int, Y -> Int]
//! ```
//!
//! Because every new binding is composed into earlier ones, the resulting
//! [`Substitution`] is idempotent: no binding's right-hand side mentions a
//! bound variable.

mod error;

pub use error::UnifyError;

use rustc_hash::FxHashMap;

use crate::{TypeKind, TypeValue, VarId};

/// Ordered variable bindings produced by [`unify`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Substitution {
    bindings: Vec<(VarId, TypeValue)>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &TypeValue)> {
        self.bindings.iter().map(|(var, ty)| (*var, ty))
    }

    /// Type bound to `var`, if any.
    pub fn lookup(&self, var: VarId) -> Option<&TypeValue> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == var)
            .map(|(_, ty)| ty)
    }

    /// Apply every binding, in order, to `ty`.
    pub fn apply(&self, ty: &TypeValue) -> TypeValue {
        if self.bindings.len() > 8 {
            return self.apply_indexed(ty);
        }
        self.bindings
            .iter()
            .fold(ty.clone(), |acc, (var, bound)| acc.substitute(*var, bound))
    }

    /// Single-pass application for larger substitutions.
    ///
    /// Equivalent to the sequential fold because the bindings are kept
    /// idempotent.
    fn apply_indexed(&self, ty: &TypeValue) -> TypeValue {
        let index: FxHashMap<VarId, &TypeValue> =
            self.bindings.iter().map(|(var, bound)| (*var, bound)).collect();
        rewrite(ty, &index)
    }

    /// Record `var -> ty`, composing it into the existing bindings.
    fn bind(&mut self, var: VarId, ty: TypeValue) {
        for (_, bound) in &mut self.bindings {
            if bound.occurs(var) {
                *bound = bound.substitute(var, &ty);
            }
        }
        self.bindings.push((var, ty));
    }
}

fn rewrite(ty: &TypeValue, index: &FxHashMap<VarId, &TypeValue>) -> TypeValue {
    match ty.kind() {
        TypeKind::Var(var) => index.get(var).map_or_else(|| ty.clone(), |&t| t.clone()),
        TypeKind::Arrow { parameter, result } => {
            TypeValue::arrow(rewrite(parameter, index), rewrite(result, index))
        }
        TypeKind::Value(_) => ty.clone(),
    }
}

/// Solve a set of equations between type values.
///
/// The first equation of `equations` is resolved first; see the module
/// documentation for the full ordering rules.
pub fn unify<I>(equations: I) -> Result<Substitution, UnifyError>
where
    I: IntoIterator<Item = (TypeValue, TypeValue)>,
{
    let mut worklist: Vec<(TypeValue, TypeValue)> = equations.into_iter().collect();
    worklist.reverse();
    let total = worklist.len();

    let mut subst = Substitution::new();
    while let Some((expected, actual)) = worklist.pop() {
        if expected == actual {
            continue;
        }
        match (expected.kind(), actual.kind()) {
            (TypeKind::Var(var), _) => bind(&mut subst, &mut worklist, *var, actual)?,
            (_, TypeKind::Var(var)) => bind(&mut subst, &mut worklist, *var, expected)?,
            (
                TypeKind::Arrow {
                    parameter: p1,
                    result: r1,
                },
                TypeKind::Arrow {
                    parameter: p2,
                    result: r2,
                },
            ) => {
                worklist.push((r1.clone(), r2.clone()));
                worklist.push((p1.clone(), p2.clone()));
            }
            _ => return Err(UnifyError::TypeMismatch { expected, actual }),
        }
    }

    tracing::debug!(equations = total, bindings = subst.len(), "unification solved");
    Ok(subst)
}

fn bind(
    subst: &mut Substitution,
    worklist: &mut [(TypeValue, TypeValue)],
    var: VarId,
    ty: TypeValue,
) -> Result<(), UnifyError> {
    if ty.occurs(var) {
        return Err(UnifyError::CircularConstraint {
            variable: var,
            within: ty,
        });
    }
    tracing::trace!(%var, %ty, "bind");

    for (lhs, rhs) in worklist.iter_mut() {
        *lhs = lhs.substitute(var, &ty);
        *rhs = rhs.substitute(var, &ty);
    }
    subst.bind(var, ty);
    Ok(())
}

/// Equations collected while walking a term, solved in one go.
#[derive(Clone, Debug, Default)]
pub struct Constraints {
    equations: Vec<(TypeValue, TypeValue)>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `expected = actual`.
    pub fn push(&mut self, expected: TypeValue, actual: TypeValue) {
        self.equations.push((expected, actual));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn equations(&self) -> &[(TypeValue, TypeValue)] {
        &self.equations
    }

    /// Solve every collected equation.
    pub fn solve(self) -> Result<Substitution, UnifyError> {
        unify(self.equations)
    }
}
