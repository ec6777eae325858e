//! Registration and instantiation errors.

use tabula_types::TType;
use thiserror::Error;

/// Errors surfaced by the typesystem registry.
///
/// Registration errors are static and correctable, so they are returned to
/// the caller at startup rather than recovered.
#[derive(Debug, Clone, Error)]
pub enum TypeError {
    /// A trait with this name is already registered.
    #[error("trait '{name}' is already registered")]
    DuplicateTrait { name: String },

    /// A function with this id is already registered.
    #[error("function '{id}' is already registered")]
    DuplicateFunction { id: String },

    /// A property with this name is already registered.
    #[error("property '{name}' is already registered")]
    DuplicateProperty { name: String },

    /// A signature references a type variable it does not declare.
    #[error("'{function}' references undeclared type variable '{name}'")]
    UndeclaredTypeVariable { function: String, name: String },

    /// A signature has the wrong shape for its kind.
    #[error("'{function}': {message}")]
    MalformedSignature { function: String, message: String },

    /// Substitution reached a type variable with no binding.
    #[error("type variable '{name}' is not bound")]
    UnresolvedTypeVariable { name: String },

    /// Unification tried to bind a variable to two different types.
    #[error("type variable '{name}' bound to {first}, cannot rebind to {second}")]
    ConflictingBinding {
        name: String,
        first: TType,
        second: TType,
    },

    /// A binding does not satisfy the variable's declared bound.
    #[error("type variable '{name}' bound to {actual}, which is not a {bound}")]
    BoundViolation {
        name: String,
        bound: TType,
        actual: TType,
    },
}
