//! The `TypeValue` tree.
//!
//! ```text
//! TypeValue ::= Value(name)            -- e.g. Int
//!             | Arrow(param, result)   -- e.g. (Int -> Bool)
//!             | Var(id)                -- e.g. Var[7]
//! ```
//!
//! Arrow and value nodes are immutable once built. Variables are identified
//! by a process-wide counter, so two variables are the same variable only
//! if they carry the same [`VarId`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::TypeError;

/// Longest accepted name for a named value type, in bytes.
///
/// Names were historically stored in a 32-byte buffer with a trailing
/// terminator, which leaves 31 usable bytes.
pub const MAX_TYPE_NAME_LEN: usize = 31;

/// Next id handed out by [`VarId::fresh`]. Starts at 1 so `Var[0]` never
/// shows up in diagnostics.
static NEXT_VAR: AtomicU32 = AtomicU32::new(1);

/// Ids backing [`VarId::generic`], allocated on first request.
static GENERIC_VARS: RwLock<Vec<VarId>> = parking_lot::const_rwlock(Vec::new());

/// Identity of a type variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Allocate a variable id that has never been handed out before.
    pub fn fresh() -> Self {
        VarId(NEXT_VAR.fetch_add(1, Ordering::Relaxed))
    }

    /// The `index`-th generic variable.
    ///
    /// Generic variables are ordinary fresh ids, allocated once and then
    /// handed out for the same index forever, so generalized types render
    /// the same way every time.
    pub fn generic(index: usize) -> Self {
        let existing = GENERIC_VARS.read().get(index).copied();
        if let Some(id) = existing {
            return id;
        }
        let mut table = GENERIC_VARS.write();
        while table.len() <= index {
            table.push(VarId::fresh());
        }
        table[index]
    }

    /// Raw numeric id.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var[{}]", self.0)
    }
}

/// Name of a named value type, bounded by [`MAX_TYPE_NAME_LEN`].
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Validate and intern a type name.
    pub fn new(name: &str) -> Result<Self, TypeError> {
        if name.is_empty() {
            return Err(TypeError::EmptyName);
        }
        if name.len() > MAX_TYPE_NAME_LEN {
            return Err(TypeError::NameTooLong {
                name: name.to_owned(),
                len: name.len(),
            });
        }
        Ok(TypeName(Arc::from(name)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape of a type value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeKind {
    /// A named value type such as `Int`.
    Value(TypeName),
    /// A function type.
    Arrow {
        parameter: TypeValue,
        result: TypeValue,
    },
    /// A type variable.
    Var(VarId),
}

/// An immutable, shareable type tree.
#[derive(Clone, Eq)]
pub struct TypeValue(Arc<TypeKind>);

impl TypeValue {
    /// Named value type. Fails if the name violates the name buffer limit.
    pub fn value(name: &str) -> Result<Self, TypeError> {
        TypeName::new(name).map(Self::named)
    }

    /// Named value type from an already validated name.
    pub fn named(name: TypeName) -> Self {
        TypeValue(Arc::new(TypeKind::Value(name)))
    }

    /// Function type `(parameter -> result)`.
    pub fn arrow(parameter: TypeValue, result: TypeValue) -> Self {
        TypeValue(Arc::new(TypeKind::Arrow { parameter, result }))
    }

    /// Curried function type `(p1 -> (p2 -> ... -> result))`.
    pub fn arrow_chain<I>(params: I, result: TypeValue) -> Self
    where
        I: IntoIterator<Item = TypeValue>,
        I::IntoIter: DoubleEndedIterator,
    {
        params
            .into_iter()
            .rev()
            .fold(result, |acc, param| TypeValue::arrow(param, acc))
    }

    /// Variable with a specific id.
    pub fn var(id: VarId) -> Self {
        TypeValue(Arc::new(TypeKind::Var(id)))
    }

    /// A brand new variable.
    pub fn fresh_var() -> Self {
        Self::var(VarId::fresh())
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    pub fn as_var(&self) -> Option<VarId> {
        match self.kind() {
            TypeKind::Var(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_arrow(&self) -> Option<(&TypeValue, &TypeValue)> {
        match self.kind() {
            TypeKind::Arrow { parameter, result } => Some((parameter, result)),
            _ => None,
        }
    }

    /// Name of a named value type.
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            TypeKind::Value(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Pointer identity. Structural equality is `==`.
    #[inline]
    pub fn ptr_eq(&self, other: &TypeValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of leading arrows, i.e. how many arguments a value of this
    /// type accepts before producing a non-function.
    pub fn arity(&self) -> usize {
        let mut count = 0;
        let mut cursor = self;
        while let Some((_, result)) = cursor.as_arrow() {
            count += 1;
            cursor = result;
        }
        count
    }

    /// Split off the first `n` parameters of a curried arrow.
    ///
    /// Returns `None` if the type has fewer than `n` leading arrows.
    pub fn uncurry(&self, n: usize) -> Option<(Vec<TypeValue>, TypeValue)> {
        let mut params = Vec::with_capacity(n);
        let mut cursor = self.clone();
        for _ in 0..n {
            let (param, result) = match cursor.as_arrow() {
                Some((p, r)) => (p.clone(), r.clone()),
                None => return None,
            };
            params.push(param);
            cursor = result;
        }
        Some((params, cursor))
    }

    /// Whether `var` appears anywhere in this tree.
    pub fn occurs(&self, var: VarId) -> bool {
        let mut stack: SmallVec<[&TypeValue; 8]> = SmallVec::new();
        stack.push(self);
        while let Some(ty) = stack.pop() {
            match ty.kind() {
                TypeKind::Var(id) if *id == var => return true,
                TypeKind::Arrow { parameter, result } => {
                    stack.push(result);
                    stack.push(parameter);
                }
                TypeKind::Var(_) | TypeKind::Value(_) => {}
            }
        }
        false
    }

    /// Variables in left-to-right order of first occurrence.
    pub fn free_vars(&self) -> Vec<VarId> {
        let mut vars = Vec::new();
        let mut stack: SmallVec<[&TypeValue; 8]> = SmallVec::new();
        stack.push(self);
        while let Some(ty) = stack.pop() {
            match ty.kind() {
                TypeKind::Var(id) => {
                    if !vars.contains(id) {
                        vars.push(*id);
                    }
                }
                TypeKind::Arrow { parameter, result } => {
                    stack.push(result);
                    stack.push(parameter);
                }
                TypeKind::Value(_) => {}
            }
        }
        vars
    }

    /// True when the tree contains no variables.
    pub fn is_ground(&self) -> bool {
        self.free_vars().is_empty()
    }

    /// Replace every occurrence of `var` with `replacement`.
    ///
    /// Subtrees that do not mention `var` are shared, not copied.
    pub fn substitute(&self, var: VarId, replacement: &TypeValue) -> TypeValue {
        if !self.occurs(var) {
            return self.clone();
        }
        match self.kind() {
            TypeKind::Var(_) => replacement.clone(),
            TypeKind::Arrow { parameter, result } => TypeValue::arrow(
                parameter.substitute(var, replacement),
                result.substitute(var, replacement),
            ),
            TypeKind::Value(_) => self.clone(),
        }
    }

    /// Structurally equal copy with freshly allocated nodes.
    ///
    /// Variables keep their id: a variable's identity is its id, not the
    /// node that carries it.
    pub fn deep_copy(&self) -> TypeValue {
        match self.kind() {
            TypeKind::Value(name) => TypeValue::named(name.clone()),
            TypeKind::Arrow { parameter, result } => {
                TypeValue::arrow(parameter.deep_copy(), result.deep_copy())
            }
            TypeKind::Var(id) => TypeValue::var(*id),
        }
    }

    /// Copy with every variable replaced by a fresh one.
    ///
    /// Repeated occurrences of a variable map to the same fresh variable,
    /// so `(a -> a)` instantiates to `(Var[n] -> Var[n])`.
    pub fn instantiate(&self) -> TypeValue {
        let mut mapping = FxHashMap::default();
        self.instantiate_with(&mut mapping)
    }

    /// [`instantiate`](Self::instantiate) sharing a mapping across several
    /// types, so variables common to all of them stay linked.
    pub fn instantiate_with(&self, mapping: &mut FxHashMap<VarId, TypeValue>) -> TypeValue {
        match self.kind() {
            TypeKind::Value(_) => self.clone(),
            TypeKind::Var(id) => mapping.entry(*id).or_insert_with(TypeValue::fresh_var).clone(),
            TypeKind::Arrow { parameter, result } => {
                let parameter = parameter.instantiate_with(mapping);
                let result = result.instantiate_with(mapping);
                TypeValue::arrow(parameter, result)
            }
        }
    }

    /// Rename the free variables to generic ones, numbered by first
    /// occurrence: `(Var[812] -> Var[77])` and `(Var[5] -> Var[9])` both
    /// become the same tree.
    pub fn generalize(&self) -> TypeValue {
        let mut mapping: FxHashMap<VarId, TypeValue> = self
            .free_vars()
            .into_iter()
            .enumerate()
            .map(|(index, var)| (var, TypeValue::var(VarId::generic(index))))
            .collect();
        self.instantiate_with(&mut mapping)
    }
}

impl PartialEq for TypeValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Hash for TypeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Value(name) => write!(f, "{name}"),
            TypeKind::Arrow { parameter, result } => write!(f, "({parameter} -> {result})"),
            TypeKind::Var(id) => write!(f, "{id}"),
        }
    }
}

impl fmt::Debug for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Whether two type values describe the same type.
pub fn same_type(a: &TypeValue, b: &TypeValue) -> bool {
    a == b
}
