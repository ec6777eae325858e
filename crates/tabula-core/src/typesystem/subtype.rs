//! The subtype judgement `parent ⊒ sub`.
//!
//! Rules, in order:
//! 1. `Unknown` is a supertype of everything.
//! 2. A `TypeRef` on either side matches, binding the variable when unifying.
//! 3. A union `sub` needs every member to be a subtype.
//! 4. A union `parent` needs some member to be a supertype.
//! 5. Primitives and literals need the same base tag.
//! 6. Arrays recurse on their elements.
//! 7. A trait `sub` matches itself, or any of its supertypes transitively.
//!
//! Rule 3 runs before rule 4 so that a union is a subtype of itself.

use tabula_types::TType;

use super::Unifier;

/// Decide `parent ⊒ sub`, recording type variable bindings into `unifier`.
pub(crate) fn judge(parent: &TType, sub: &TType, mut unifier: Option<&mut Unifier>) -> bool {
    if parent.is_unknown() {
        return true;
    }

    if let TType::TypeRef(name) = parent {
        return unifier.map_or(true, |u| u.bind(name, sub));
    }
    if let TType::TypeRef(name) = sub {
        return unifier.map_or(true, |u| u.bind(name, parent));
    }

    if let TType::Union(members) = sub {
        return members
            .iter()
            .all(|member| judge(parent, member, unifier.as_deref_mut()));
    }

    if let TType::Union(members) = parent {
        if first_match(members.iter().map(|m| (m, sub)), unifier.as_deref_mut()) {
            return true;
        }
        // A trait may still reach the union through its supertypes.
        if !matches!(sub, TType::Trait(_)) {
            return false;
        }
    }

    if let Some(kind) = sub.primitive_kind() {
        return parent.primitive_kind() == Some(kind);
    }

    match (parent, sub) {
        (TType::Array(p), TType::Array(s)) => judge(p, s, unifier),
        (_, TType::Trait(t)) => {
            if let TType::Trait(p) = parent {
                if p == t {
                    return true;
                }
            }
            first_match(t.merge().iter().map(|m| (parent, m)), unifier)
        }
        _ => false,
    }
}

/// Existential search over `(parent, sub)` candidates.
///
/// Bindings made by a failed candidate are discarded before the next one.
fn first_match<'a>(
    candidates: impl Iterator<Item = (&'a TType, &'a TType)>,
    unifier: Option<&mut Unifier>,
) -> bool {
    match unifier {
        None => {
            for (parent, sub) in candidates {
                if judge(parent, sub, None) {
                    return true;
                }
            }
            false
        }
        Some(u) => {
            for (parent, sub) in candidates {
                let snapshot = u.clone();
                if judge(parent, sub, Some(&mut *u)) {
                    return true;
                }
                *u = snapshot;
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_types::TraitType;

    fn is_subtype(parent: &TType, sub: &TType) -> bool {
        judge(parent, sub, None)
    }

    fn select(options: &[&str]) -> TType {
        TType::union(options.iter().map(|o| TType::string_literal(*o)).collect())
    }

    #[test]
    fn test_unknown_is_top() {
        assert!(is_subtype(&TType::Unknown, &TType::Number));
        assert!(is_subtype(&TType::Unknown, &TType::array(TType::String)));
        assert!(is_subtype(&TType::Unknown, &TType::Unknown));
        assert!(!is_subtype(&TType::Number, &TType::Unknown));
    }

    #[test]
    fn test_no_primitive_coercion() {
        assert!(is_subtype(&TType::Number, &TType::Number));
        assert!(!is_subtype(&TType::String, &TType::Number));
        assert!(!is_subtype(&TType::Boolean, &TType::String));
    }

    #[test]
    fn test_literals_compare_by_base() {
        assert!(is_subtype(&TType::String, &TType::string_literal("A")));
        assert!(is_subtype(&TType::string_literal("A"), &TType::String));
        assert!(!is_subtype(&TType::Number, &TType::string_literal("1")));
    }

    #[test]
    fn test_union_parent_is_existential() {
        let parent = TType::union(vec![TType::String, TType::Number]);
        assert!(is_subtype(&parent, &TType::Number));
        assert!(!is_subtype(&parent, &TType::Boolean));
    }

    #[test]
    fn test_union_sub_is_universal() {
        let sub = TType::union(vec![TType::String, TType::Number]);
        assert!(!is_subtype(&TType::String, &sub));
        assert!(is_subtype(&TType::String, &select(&["A", "B"])));
        assert!(is_subtype(&TType::Number, &TType::never()));
    }

    #[test]
    fn test_union_reflexive() {
        let u = TType::union(vec![TType::String, TType::Number]);
        assert!(is_subtype(&u, &u));
        assert!(is_subtype(&select(&["A", "B", "C"]), &select(&["A", "B", "C"])));
    }

    #[test]
    fn test_arrays_are_covariant() {
        assert!(is_subtype(
            &TType::array(TType::String),
            &TType::array(select(&["A", "B"]))
        ));
        assert!(!is_subtype(&TType::array(TType::String), &TType::String));
        assert!(!is_subtype(&TType::String, &TType::array(TType::String)));
    }

    #[test]
    fn test_trait_merge_is_transitive() {
        let t1 = TType::Trait(TraitType::new("T1", "T1", vec![]));
        let t2 = TType::Trait(TraitType::new("T2", "T2", vec![t1.clone()]));
        let t3 = TType::Trait(TraitType::new("T3", "T3", vec![t2.clone()]));
        assert!(is_subtype(&t1, &t3));
        assert!(is_subtype(&t2, &t3));
        assert!(!is_subtype(&t3, &t1));
    }

    #[test]
    fn test_trait_reaches_primitive() {
        let url = TType::Trait(TraitType::new("URL", "URL", vec![TType::String, TType::Unknown]));
        assert!(is_subtype(&TType::String, &url));
        assert!(!is_subtype(&url, &TType::String));
        assert!(!is_subtype(&TType::Number, &url));
    }

    #[test]
    fn test_trait_reaches_union_through_merge() {
        let mixed = TType::Trait(TraitType::new(
            "Mixed",
            "Mixed",
            vec![TType::union(vec![TType::String, TType::Number])],
        ));
        let parent = TType::union(vec![TType::String, TType::Number]);
        assert!(is_subtype(&parent, &mixed));
    }

    #[test]
    fn test_trait_identity_not_shape() {
        let a = TType::Trait(TraitType::new("Date", "Date", vec![TType::Unknown]));
        let b = TType::Trait(TraitType::new("Date", "Date", vec![TType::Unknown]));
        assert!(is_subtype(&a, &a));
        assert!(!is_subtype(&a, &b));
    }

    #[test]
    fn test_type_ref_matches_without_unifier() {
        assert!(is_subtype(&TType::type_ref("T"), &TType::Number));
        assert!(is_subtype(&TType::Number, &TType::type_ref("T")));
    }
}
