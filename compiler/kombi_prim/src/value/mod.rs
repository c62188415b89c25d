//! Boxed primitive payloads: `Int`, `Bool` and `Str`.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use kombi_heap::{make_value, Handle, Payload};
use kombi_types::{TypeName, TypeValue};

/// 64-bit signed integer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Int(pub i64);

/// Boolean.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Bool(pub bool);

/// Immutable string.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Str(pub Arc<str>);

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Str({:?})", &*self.0)
    }
}

impl Payload for Int {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Payload for Bool {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Payload for Str {
    fn clone_payload(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn size(&self) -> usize {
        std::mem::size_of::<Self>() + self.0.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Types

fn named(cell: &'static OnceLock<TypeValue>, name: &'static str) -> TypeValue {
    cell.get_or_init(|| match TypeName::new(name) {
        Ok(name) => TypeValue::named(name),
        // Only reachable for names over the length limit; ours are short.
        Err(_) => TypeValue::fresh_var(),
    })
    .clone()
}

pub fn int_type() -> TypeValue {
    static INT: OnceLock<TypeValue> = OnceLock::new();
    named(&INT, "Int")
}

pub fn bool_type() -> TypeValue {
    static BOOL: OnceLock<TypeValue> = OnceLock::new();
    named(&BOOL, "Bool")
}

pub fn str_type() -> TypeValue {
    static STR: OnceLock<TypeValue> = OnceLock::new();
    named(&STR, "Str")
}

// Boxing and unboxing

pub fn make_int(value: i64) -> Handle {
    make_value(int_type(), Int(value))
}

pub fn make_bool(value: bool) -> Handle {
    make_value(bool_type(), Bool(value))
}

pub fn make_str(value: &str) -> Handle {
    make_value(str_type(), Str(Arc::from(value)))
}

/// The integer behind `handle`, ignoring a `Cached` tag.
pub fn as_int(handle: &Handle) -> Option<i64> {
    if handle.is_exception() {
        return None;
    }
    handle.untagged().downcast::<Int>().map(|n| n.0)
}

pub fn as_bool(handle: &Handle) -> Option<bool> {
    if handle.is_exception() {
        return None;
    }
    handle.untagged().downcast::<Bool>().map(|b| b.0)
}

pub fn as_str(handle: &Handle) -> Option<Arc<str>> {
    if handle.is_exception() {
        return None;
    }
    handle.untagged().downcast::<Str>().map(|s| Arc::clone(&s.0))
}
