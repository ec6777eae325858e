//! The typesystem registry.
//!
//! `Typesystem` is the catalog of traits, functions and properties. It is
//! built once at startup (registration takes `&mut self`) and then shared
//! read-only with every consumer.

use std::collections::HashMap;

use tabula_types::{FunctionType, TType, TraitType};

use super::decls::{DeclKind, FunctionDecl, FunctionDef};
use super::unify::{subst, Substitution, Unifier};
use super::{subtype, TypeError};

/// A generic signature instantiated against real argument types.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The signature with every type variable substituted.
    pub signature: FunctionType,
    /// The inferred bindings.
    pub substitution: Substitution,
}

/// Catalog of traits, functions and properties, answering typing queries.
///
/// Functions and properties keep registration order; every query that
/// returns several declarations returns them in that order.
#[derive(Debug, Clone, Default)]
pub struct Typesystem {
    traits: Vec<TraitType>,
    trait_index: HashMap<String, usize>,
    functions: Vec<FunctionDecl>,
    function_index: HashMap<String, usize>,
    properties: Vec<FunctionDecl>,
    property_index: HashMap<String, usize>,
}

impl Typesystem {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Registration ====================

    /// Register a trait whose values are also values of each `merge` type.
    ///
    /// Returns the new nominal type. Names are unique.
    pub fn register_trait(&mut self, name: &str, merge: Vec<TType>) -> Result<TType, TypeError> {
        if self.trait_index.contains_key(name) {
            return Err(TypeError::DuplicateTrait {
                name: name.to_string(),
            });
        }
        let t = TraitType::new(name, name, merge);
        tracing::debug!(name, "registered trait");
        self.trait_index.insert(name.to_string(), self.traits.len());
        self.traits.push(t.clone());
        Ok(TType::Trait(t))
    }

    /// Register a function. Its id must not be taken.
    pub fn register_function(&mut self, def: FunctionDef) -> Result<&FunctionDecl, TypeError> {
        expect_kind(&def, DeclKind::Function)?;
        self.insert(def, false)
    }

    /// Register a property accessor. Its name must not be taken.
    pub fn register_property(&mut self, def: FunctionDef) -> Result<&FunctionDecl, TypeError> {
        expect_kind(&def, DeclKind::Property)?;
        self.insert(def, false)
    }

    /// Register a function, overriding any existing function with the same id.
    ///
    /// A replaced declaration keeps its position in the catalog.
    pub fn replace_function(&mut self, def: FunctionDef) -> Result<&FunctionDecl, TypeError> {
        expect_kind(&def, DeclKind::Function)?;
        self.insert(def, true)
    }

    /// Register a property, overriding any existing property with the same name.
    pub fn replace_property(&mut self, def: FunctionDef) -> Result<&FunctionDecl, TypeError> {
        expect_kind(&def, DeclKind::Property)?;
        self.insert(def, true)
    }

    fn insert(&mut self, def: FunctionDef, replace: bool) -> Result<&FunctionDecl, TypeError> {
        let decl = def.resolve()?;
        let kind = decl.kind();
        let (decls, index, key) = match kind {
            DeclKind::Function => (
                &mut self.functions,
                &mut self.function_index,
                decl.id().to_string(),
            ),
            DeclKind::Property => (
                &mut self.properties,
                &mut self.property_index,
                decl.name().to_string(),
            ),
        };

        let position = match index.get(&key).copied() {
            Some(existing) if replace => {
                tracing::debug!(key = %key, "replacing declaration");
                decls[existing] = decl;
                existing
            }
            Some(_) => {
                return Err(match kind {
                    DeclKind::Function => TypeError::DuplicateFunction { id: key },
                    DeclKind::Property => TypeError::DuplicateProperty { name: key },
                });
            }
            None => {
                tracing::debug!(
                    key = %key,
                    signature = %decl.signature(),
                    "registered declaration"
                );
                index.insert(key, decls.len());
                decls.push(decl);
                decls.len() - 1
            }
        };
        Ok(&decls[position])
    }

    // ==================== Lookup ====================

    /// Look up a function by id.
    pub fn function(&self, id: &str) -> Option<&FunctionDecl> {
        self.function_index.get(id).map(|&i| &self.functions[i])
    }

    /// All overloads sharing a display name.
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FunctionDecl> {
        self.functions.iter().filter(move |f| f.name() == name)
    }

    /// Look up a function by id, falling back to the first overload with
    /// that display name.
    pub fn resolve_function(&self, key: &str) -> Option<&FunctionDecl> {
        self.function(key)
            .or_else(|| self.functions.iter().find(|f| f.name() == key))
    }

    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&FunctionDecl> {
        self.property_index.get(name).map(|&i| &self.properties[i])
    }

    pub fn properties(&self) -> &[FunctionDecl] {
        &self.properties
    }

    pub fn traits(&self) -> &[TraitType] {
        &self.traits
    }

    pub fn trait_named(&self, name: &str) -> Option<TType> {
        self.trait_index
            .get(name)
            .map(|&i| TType::Trait(self.traits[i].clone()))
    }

    /// Every nameable type: the primitives, then the registered traits.
    pub fn types(&self) -> Vec<TType> {
        let mut types = vec![TType::Unknown, TType::Boolean, TType::String, TType::Number];
        types.extend(self.traits.iter().cloned().map(TType::Trait));
        types
    }

    /// [`Typesystem::types`] keyed by display title.
    pub fn type_map(&self) -> HashMap<String, TType> {
        self.types()
            .into_iter()
            .map(|t| (t.to_string(), t))
            .collect()
    }

    // ==================== Typing ====================

    /// Structural type equality; literal values are ignored.
    pub fn equal(&self, t1: &TType, t2: &TType) -> bool {
        t1.type_eq(t2)
    }

    /// Literal-aware equality: `"A"` equals only `"A"`, never `string`.
    pub fn equal_exact(&self, t1: &TType, t2: &TType) -> bool {
        t1.type_eq_exact(t2)
    }

    /// Returns true if a value of type `sub` is usable where `parent` is expected.
    pub fn is_subtype(&self, parent: &TType, sub: &TType) -> bool {
        subtype::judge(parent, sub, None)
    }

    /// Instantiate a generic signature against real argument and return types.
    pub fn instance(
        &self,
        real_args: &[TType],
        real_rt: &TType,
        template: &FunctionType,
    ) -> Result<Instance, TypeError> {
        self.instance_with(Unifier::new(), real_args, real_rt, template)
    }

    /// [`Typesystem::instance`] starting from a pre-seeded unifier.
    ///
    /// Each formal argument is unified with its real argument, then the real
    /// return type with the formal one. Judgement failures are not errors:
    /// the unifier is only used to collect bindings. Conflicting bindings,
    /// bound violations and unbound variables are.
    pub fn instance_with(
        &self,
        mut unifier: Unifier,
        real_args: &[TType],
        real_rt: &TType,
        template: &FunctionType,
    ) -> Result<Instance, TypeError> {
        for (formal, real) in template.args.iter().zip(real_args) {
            unifier.unify(formal, real);
        }
        unifier.unify(real_rt, &template.rt);

        let substitution = unifier.finish()?;
        for var in &template.type_vars {
            if let Some(actual) = substitution.get(&var.name) {
                if !self.is_subtype(&var.bound, actual) {
                    return Err(TypeError::BoundViolation {
                        name: var.name.to_string(),
                        bound: var.bound.clone(),
                        actual: actual.clone(),
                    });
                }
            }
        }

        let signature = self.subst(&substitution, template)?;
        Ok(Instance {
            signature,
            substitution,
        })
    }

    /// Replace every type reference in `template` with its binding.
    pub fn subst(
        &self,
        substitution: &Substitution,
        template: &FunctionType,
    ) -> Result<FunctionType, TypeError> {
        subst(substitution, template)
    }

    /// Functions applicable to a value of type `self_ty` that return
    /// something usable as `ret`, judged on static signatures.
    pub fn get_methods(&self, self_ty: &TType, ret: &TType) -> Vec<&FunctionDecl> {
        self.functions
            .iter()
            .filter(|f| {
                let sig = f.static_signature();
                sig.args
                    .first()
                    .is_some_and(|first| self.is_subtype(first, self_ty))
                    && self.is_subtype(ret, &sig.rt)
            })
            .collect()
    }

    /// Properties readable from a value of type `self_ty`.
    pub fn get_properties(&self, self_ty: &TType) -> Vec<&FunctionDecl> {
        self.properties
            .iter()
            .filter(|p| {
                p.static_signature()
                    .args
                    .first()
                    .is_some_and(|first| self.is_subtype(first, self_ty))
            })
            .collect()
    }
}

fn expect_kind(def: &FunctionDef, kind: DeclKind) -> Result<(), TypeError> {
    if def.kind() == kind {
        return Ok(());
    }
    Err(TypeError::MalformedSignature {
        function: def.name().to_string(),
        message: format!("expected a {:?} declaration, got {:?}", kind, def.kind()),
    })
}
