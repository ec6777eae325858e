//! Type variable inference by unification.
//!
//! Generic signatures are instantiated by walking the subtype judgement
//! between each formal argument and its real argument type. Every time the
//! walk meets a `TypeRef` it binds the variable to the type on the other side.
//! The `Unifier` collects those bindings as a value; the first binding of a
//! variable wins and a conflicting rebinding fails the judgement.

use std::collections::HashMap;
use std::sync::Arc;

use tabula_types::{FunctionType, TType};

use super::subtype;
use super::TypeError;

/// Bindings from type variable names to concrete types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: HashMap<Arc<str>, TType>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TType> {
        self.bindings.get(name)
    }

    pub fn insert(&mut self, name: &str, ty: TType) {
        self.bindings.insert(Arc::from(name), ty);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TType)> {
        self.bindings.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

/// Accumulates bindings while unifying a signature against real types.
#[derive(Debug, Clone, Default)]
pub struct Unifier {
    substitution: Substitution,
    conflicts: Vec<TypeError>,
}

impl Unifier {
    /// Create a unifier with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a binding before unification starts.
    pub fn with_binding(mut self, name: &str, ty: TType) -> Self {
        self.substitution.insert(name, ty);
        self
    }

    /// Run the subtype judgement `parent ⊒ sub`, recording bindings.
    pub fn unify(&mut self, parent: &TType, sub: &TType) -> bool {
        subtype::judge(parent, sub, Some(self))
    }

    /// Bind `name` to `ty`. An existing, non-equal binding is kept and the
    /// attempt is recorded as a conflict.
    pub(crate) fn bind(&mut self, name: &str, ty: &TType) -> bool {
        match self.substitution.get(name) {
            Some(existing) if existing.type_eq(ty) => true,
            Some(existing) => {
                tracing::debug!(
                    var = name,
                    first = %existing,
                    second = %ty,
                    "conflicting type binding"
                );
                self.conflicts.push(TypeError::ConflictingBinding {
                    name: name.to_string(),
                    first: existing.clone(),
                    second: ty.clone(),
                });
                false
            }
            None => {
                self.substitution.insert(name, ty.clone());
                true
            }
        }
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// Conflicts recorded on the judgement paths that were kept.
    pub fn conflicts(&self) -> &[TypeError] {
        &self.conflicts
    }

    /// Finish unification, failing on the first recorded conflict.
    pub fn finish(mut self) -> Result<Substitution, TypeError> {
        if self.conflicts.is_empty() {
            Ok(self.substitution)
        } else {
            Err(self.conflicts.swap_remove(0))
        }
    }
}

/// Replace every `TypeRef` in `template` with its binding.
///
/// The result declares no type variables.
pub fn subst(
    substitution: &Substitution,
    template: &FunctionType,
) -> Result<FunctionType, TypeError> {
    let mut resolved = template.try_map(|ty| subst_type(substitution, ty))?;
    resolved.type_vars.clear();
    Ok(resolved)
}

/// Replace every `TypeRef` in `ty` with its binding.
pub fn subst_type(substitution: &Substitution, ty: &TType) -> Result<TType, TypeError> {
    match ty {
        TType::TypeRef(name) => {
            substitution
                .get(name)
                .cloned()
                .ok_or_else(|| TypeError::UnresolvedTypeVariable {
                    name: name.to_string(),
                })
        }
        TType::Array(element) => Ok(TType::array(subst_type(substitution, element)?)),
        TType::Union(members) => Ok(TType::union(
            members
                .iter()
                .map(|m| subst_type(substitution, m))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        _ => Ok(ty.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_type_ref_parent() {
        let mut unifier = Unifier::new();
        assert!(unifier.unify(&TType::type_ref("T"), &TType::Number));
        assert_eq!(unifier.substitution().get("T"), Some(&TType::Number));
    }

    #[test]
    fn test_binds_inside_array() {
        let mut unifier = Unifier::new();
        assert!(unifier.unify(
            &TType::array(TType::type_ref("T")),
            &TType::array(TType::String)
        ));
        assert_eq!(unifier.substitution().get("T"), Some(&TType::String));
    }

    #[test]
    fn test_first_binding_wins() {
        let mut unifier = Unifier::new();
        assert!(unifier.unify(&TType::type_ref("T"), &TType::Number));
        assert!(!unifier.unify(&TType::type_ref("T"), &TType::String));
        assert_eq!(unifier.substitution().get("T"), Some(&TType::Number));
        assert_eq!(unifier.conflicts().len(), 1);
        assert!(matches!(
            unifier.finish(),
            Err(TypeError::ConflictingBinding { .. })
        ));
    }

    #[test]
    fn test_equal_rebinding_is_not_a_conflict() {
        let mut unifier = Unifier::new();
        assert!(unifier.unify(&TType::type_ref("T"), &TType::string_literal("A")));
        assert!(unifier.unify(&TType::type_ref("T"), &TType::String));
        assert!(unifier.finish().is_ok());
    }

    #[test]
    fn test_failed_union_branch_is_rolled_back() {
        // The first member binds T to String, then fails on Number; the
        // second member must see T unbound.
        let parent = TType::union(vec![
            TType::array(TType::union(vec![TType::type_ref("T"), TType::Boolean])),
            TType::array(TType::type_ref("T")),
        ]);
        let element = TType::union(vec![TType::String, TType::Number]);
        let mut unifier = Unifier::new();
        assert!(unifier.unify(&parent, &TType::array(element.clone())));
        assert_eq!(unifier.substitution().get("T"), Some(&element));
        assert!(unifier.conflicts().is_empty());
    }

    #[test]
    fn test_seeded_binding() {
        let mut unifier = Unifier::new().with_binding("T", TType::Boolean);
        assert!(!unifier.unify(&TType::type_ref("T"), &TType::Number));
        assert_eq!(unifier.substitution().get("T"), Some(&TType::Boolean));
    }

    #[test]
    fn test_subst() {
        let mut substitution = Substitution::new();
        substitution.insert("T", TType::Number);
        let template = FunctionType::new(
            vec![TType::type_ref("T"), TType::array(TType::type_ref("T"))],
            TType::Boolean,
        );
        let resolved = subst(&substitution, &template).unwrap();
        assert_eq!(resolved.args, vec![TType::Number, TType::array(TType::Number)]);
        assert_eq!(resolved.rt, TType::Boolean);
    }

    #[test]
    fn test_subst_unresolved() {
        let template = FunctionType::new(vec![TType::type_ref("T")], TType::Boolean);
        let err = subst(&Substitution::new(), &template).unwrap_err();
        assert!(matches!(err, TypeError::UnresolvedTypeVariable { ref name } if name == "T"));
    }
}
