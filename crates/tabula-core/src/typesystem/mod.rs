//! The typesystem: traits, declarations, subtyping and generic instantiation.

mod decls;
mod error;
mod registry;
mod subtype;
mod unify;

pub use decls::{DeclKind, FunctionDecl, FunctionDef, FunctionImpl};
pub use error::TypeError;
pub use registry::{Instance, Typesystem};
pub use unify::{subst, subst_type, Substitution, Unifier};
