//! Declarations for predicate functions and property accessors.
//!
//! A `FunctionDef` is what callers hand to the registry. Registration
//! validates it, resolves its static signature and stores it as a
//! `FunctionDecl`, which carries both type information (for menus and
//! instantiation) and the implementation (for evaluation).

use std::sync::Arc;

use tabula_types::{FunctionType, TType};

use super::TypeError;
use crate::eval::{EvalError, Value};

/// A function implementation that takes arguments and returns a value.
///
/// The implementation receives already-evaluated arguments, the filtered
/// value first. Absent values, including arguments the filter omits, arrive
/// as `Value::Null`, so the slice is never shorter than the signature.
pub type FunctionImpl = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// What a declaration can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// A predicate or operation applied to a column value plus arguments.
    Function,
    /// A unary accessor usable on a filter's left-hand side.
    Property,
}

/// An unregistered function or property.
#[derive(Clone)]
pub struct FunctionDef {
    id: Option<String>,
    name: String,
    kind: DeclKind,
    signature: FunctionType,
    implementation: FunctionImpl,
}

impl FunctionDef {
    /// Define a function.
    ///
    /// Unless [`FunctionDef::with_id`] is used, the id is derived from the
    /// name and the static argument types, e.g. `is_string_string`.
    pub fn function<F>(name: impl Into<String>, signature: FunctionType, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            id: None,
            name: name.into(),
            kind: DeclKind::Function,
            signature,
            implementation: Arc::new(implementation),
        }
    }

    /// Define a property accessor from `self_ty` to `rt`.
    ///
    /// Properties are identified by name.
    pub fn property<F>(
        name: impl Into<String>,
        self_ty: TType,
        rt: TType,
        implementation: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            id: None,
            name: name.into(),
            kind: DeclKind::Property,
            signature: FunctionType::new(vec![self_ty], rt),
            implementation: Arc::new(move |args: &[Value]| {
                let value = args.first().unwrap_or(&Value::Null);
                implementation(value)
            }),
        }
    }

    /// Use an explicit id instead of the derived one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the signature, e.g. to make a property generic.
    pub fn with_signature(mut self, signature: FunctionType) -> Self {
        self.signature = signature;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    pub fn signature(&self) -> &FunctionType {
        &self.signature
    }

    /// Validate the signature and resolve the static signature.
    pub(crate) fn resolve(self) -> Result<FunctionDecl, TypeError> {
        if self.kind == DeclKind::Property && self.signature.args.len() != 1 {
            return Err(TypeError::MalformedSignature {
                function: self.name,
                message: format!(
                    "a property takes exactly one argument, got {}",
                    self.signature.args.len()
                ),
            });
        }

        let static_signature = static_signature(&self.name, &self.signature)?;
        let id = match self.id {
            Some(id) => id,
            None => derive_id(&self.name, &static_signature.args),
        };

        Ok(FunctionDecl {
            id,
            name: self.name,
            kind: self.kind,
            signature: self.signature,
            static_signature,
            implementation: self.implementation,
        })
    }
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("signature", &self.signature)
            .finish()
    }
}

/// A registered function or property.
#[derive(Clone)]
pub struct FunctionDecl {
    id: String,
    name: String,
    kind: DeclKind,
    signature: FunctionType,
    static_signature: FunctionType,
    implementation: FunctionImpl,
}

impl FunctionDecl {
    /// Stable identifier, referenced by filter trees.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name. Overloads of one operation share it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    /// The declared, possibly generic, signature.
    pub fn signature(&self) -> &FunctionType {
        &self.signature
    }

    /// The signature with every type variable replaced by its bound.
    pub fn static_signature(&self) -> &FunctionType {
        &self.static_signature
    }

    pub fn arity(&self) -> usize {
        self.signature.args.len()
    }

    /// Call the implementation.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.implementation)(args)
    }
}

impl std::fmt::Debug for FunctionDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDecl")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("signature", &self.signature)
            .field("static_signature", &self.static_signature)
            .finish()
    }
}

/// Substitute every type variable with its declared bound.
fn static_signature(function: &str, signature: &FunctionType) -> Result<FunctionType, TypeError> {
    let mut resolved = signature.try_map(|ty| bound_type(function, signature, ty))?;
    resolved.type_vars.clear();
    Ok(resolved)
}

fn bound_type(function: &str, signature: &FunctionType, ty: &TType) -> Result<TType, TypeError> {
    match ty {
        TType::TypeRef(name) => match signature.type_var(name) {
            Some(var) => Ok(var.bound.clone()),
            None => Err(TypeError::UndeclaredTypeVariable {
                function: function.to_string(),
                name: name.to_string(),
            }),
        },
        TType::Array(element) => Ok(TType::array(bound_type(function, signature, element)?)),
        TType::Union(members) => Ok(TType::union(
            members
                .iter()
                .map(|m| bound_type(function, signature, m))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        _ => Ok(ty.clone()),
    }
}

/// Derive an id such as `is_inside_unknown_array_unknown`.
fn derive_id(name: &str, args: &[TType]) -> String {
    let mut id = slug(name);
    for arg in args {
        id.push('_');
        id.push_str(&type_slug(arg));
    }
    id
}

fn type_slug(ty: &TType) -> String {
    match ty {
        TType::Unknown => "unknown".to_string(),
        TType::Array(element) => format!("array_{}", type_slug(element)),
        TType::Union(_) => "union".to_string(),
        TType::Trait(t) => slug(t.name()),
        TType::TypeRef(name) => slug(name),
        other => match other.primitive_kind() {
            Some(kind) => kind.as_str().to_string(),
            None => slug(&other.to_string()),
        },
    }
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        // Operator names like ">" have no alphanumerics.
        out = text
            .chars()
            .map(|c| match c {
                '>' => "gt",
                '<' => "lt",
                '=' => "eq",
                '!' => "not",
                _ => "op",
            })
            .collect::<Vec<_>>()
            .join("_");
    }
    out
}
