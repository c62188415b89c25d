//! Errors raised while declaring type values.

use crate::ty::MAX_TYPE_NAME_LEN;

/// Error from constructing a [`TypeName`](crate::TypeName).
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum TypeError {
    /// Named value types must have a non-empty name.
    #[error("type name must not be empty")]
    EmptyName,

    /// The name does not fit the fixed-size name buffer.
    #[error("type name `{name}` is {len} bytes long, at most {max} are allowed", max = MAX_TYPE_NAME_LEN)]
    NameTooLong {
        /// The rejected name.
        name: String,
        /// Its length in bytes.
        len: usize,
    },
}
