//! Tabula type model.
//!
//! This crate provides the value-level representation of column and signature
//! types: primitives, single-value literals, arrays, unions, nominal traits and
//! the type references used inside generic function signatures.
//!
//! Types are immutable and cheap to clone; composite members are shared behind
//! `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counter for minting process-unique trait identities.
static TRAIT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Tabula types.
///
/// `Trait` identity is nominal; every other variant is compared structurally.
#[derive(Debug, Clone, PartialEq)]
pub enum TType {
    // ==================== Top ====================
    /// Supertype of every type.
    Unknown,

    // ==================== Primitives ====================
    /// Any string.
    String,
    /// Any number.
    Number,
    /// Any boolean.
    Boolean,
    /// A primitive restricted to exactly one value, e.g. a select option.
    Literal(LiteralValue),

    // ==================== Composites ====================
    /// Homogeneous sequence: `Array<T>`
    Array(Arc<TType>),
    /// One of the member types. An empty union is the bottom type.
    Union(Arc<[TType]>),

    // ==================== Nominal ====================
    /// Registered trait with its declared supertypes.
    Trait(TraitType),

    // ==================== Signatures ====================
    /// Occurrence of a declared type variable inside a signature.
    TypeRef(Arc<str>),
}

/// The base tag of a primitive or literal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// The value carried by a literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(Arc<str>),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive this literal narrows.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Number(_) => PrimitiveKind::Number,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "\"{}\"", s),
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Process-unique identity of a registered trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitId(u64);

impl TraitId {
    /// Mint a fresh identity. Two calls never return the same id.
    pub fn fresh() -> Self {
        TraitId(TRAIT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A nominal type that "is-a" each of its `merge` supertypes.
#[derive(Debug, Clone)]
pub struct TraitType {
    id: TraitId,
    name: Arc<str>,
    title: Arc<str>,
    merge: Arc<[TType]>,
}

impl TraitType {
    /// Create a trait with a fresh identity.
    ///
    /// Registration goes through the typesystem registry, which enforces
    /// unique names; this constructor only mints the identity.
    pub fn new(name: impl Into<Arc<str>>, title: impl Into<Arc<str>>, merge: Vec<TType>) -> Self {
        Self {
            id: TraitId::fresh(),
            name: name.into(),
            title: title.into(),
            merge: Arc::from(merge),
        }
    }

    pub fn id(&self) -> TraitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Declared direct supertypes.
    pub fn merge(&self) -> &[TType] {
        &self.merge
    }
}

impl PartialEq for TraitType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TraitType {}

// ==================== Constructors ====================

impl TType {
    /// Create a string literal type.
    ///
    /// # Example
    /// ```
    /// use tabula_types::TType;
    /// assert_eq!(TType::string_literal("A").to_string(), "\"A\"");
    /// ```
    pub fn string_literal(value: impl Into<Arc<str>>) -> Self {
        TType::Literal(LiteralValue::String(value.into()))
    }

    pub fn number_literal(value: f64) -> Self {
        TType::Literal(LiteralValue::Number(value))
    }

    pub fn boolean_literal(value: bool) -> Self {
        TType::Literal(LiteralValue::Boolean(value))
    }

    /// Create an array type.
    ///
    /// # Example
    /// ```
    /// use tabula_types::TType;
    /// assert_eq!(TType::array(TType::Number).to_string(), "Array<number>");
    /// ```
    pub fn array(element: TType) -> Self {
        TType::Array(Arc::new(element))
    }

    /// Create a union type. Members keep their insertion order.
    pub fn union(members: Vec<TType>) -> Self {
        TType::Union(Arc::from(members))
    }

    /// The empty union.
    pub fn never() -> Self {
        TType::Union(Arc::from(Vec::new()))
    }

    pub fn type_ref(name: &str) -> Self {
        TType::TypeRef(Arc::from(name))
    }
}

// ==================== Type Properties ====================

impl TType {
    /// The base tag for primitives and literals, `None` for everything else.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TType::String => Some(PrimitiveKind::String),
            TType::Number => Some(PrimitiveKind::Number),
            TType::Boolean => Some(PrimitiveKind::Boolean),
            TType::Literal(value) => Some(value.kind()),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive_kind().is_some()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TType::Unknown)
    }

    pub fn literal(&self) -> Option<&LiteralValue> {
        match self {
            TType::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn array_element(&self) -> Option<&TType> {
        match self {
            TType::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn union_members(&self) -> Option<&[TType]> {
        match self {
            TType::Union(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_trait(&self) -> Option<&TraitType> {
        match self {
            TType::Trait(t) => Some(t),
            _ => None,
        }
    }

    /// Returns true if a `TypeRef` occurs anywhere in this type.
    ///
    /// Trait supertypes are not searched; traits are always closed.
    pub fn contains_type_ref(&self) -> bool {
        match self {
            TType::TypeRef(_) => true,
            TType::Array(element) => element.contains_type_ref(),
            TType::Union(members) => members.iter().any(TType::contains_type_ref),
            _ => false,
        }
    }

    /// Structural type equality.
    ///
    /// - a `TypeRef` only equals a `TypeRef` of the same name
    /// - primitives and literals compare by base tag, ignoring the literal
    /// - unions compare as multisets of pairwise-equal members
    /// - traits compare by identity
    pub fn type_eq(&self, other: &TType) -> bool {
        self.eq_with(other, false)
    }

    /// Like [`TType::type_eq`] but literals must also carry the same value,
    /// and a literal never equals its bare primitive.
    pub fn type_eq_exact(&self, other: &TType) -> bool {
        self.eq_with(other, true)
    }

    fn eq_with(&self, other: &TType, exact: bool) -> bool {
        match (self, other) {
            (TType::Unknown, TType::Unknown) => true,
            (TType::TypeRef(a), TType::TypeRef(b)) => a == b,
            (TType::Array(a), TType::Array(b)) => a.eq_with(b, exact),
            (TType::Union(a), TType::Union(b)) => union_eq(a, b, exact),
            (TType::Trait(a), TType::Trait(b)) => a.id == b.id,
            (a, b) => match (a.primitive_kind(), b.primitive_kind()) {
                (Some(ka), Some(kb)) if ka == kb => !exact || a.literal() == b.literal(),
                _ => false,
            },
        }
    }
}

/// Multiset comparison: every member of `a` is matched by a distinct member of `b`.
fn union_eq(a: &[TType], b: &[TType], exact: bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for member in a {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && member.eq_with(candidate, exact));
        match found {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}

// ==================== Display ====================

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TType::Unknown => f.write_str("unknown"),
            TType::String => f.write_str("string"),
            TType::Number => f.write_str("number"),
            TType::Boolean => f.write_str("boolean"),
            TType::Literal(value) => write!(f, "{}", value),
            TType::Array(element) => write!(f, "Array<{}>", element),
            TType::Union(members) => {
                let members: Vec<_> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "Union<{}>", members.join(", "))
            }
            TType::Trait(t) => f.write_str(t.title()),
            TType::TypeRef(name) => f.write_str(name),
        }
    }
}

// ==================== Signatures ====================

/// A generic parameter with an upper bound, scoped to one signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVar {
    pub name: Arc<str>,
    pub bound: TType,
}

impl TypeVar {
    pub fn new(name: &str, bound: TType) -> Self {
        Self {
            name: Arc::from(name),
            bound,
        }
    }
}

/// A function or property signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Declared type variables, referenced by `TypeRef` in `args` and `rt`.
    pub type_vars: Vec<TypeVar>,
    /// Argument types; the first one is the filtered column's value.
    pub args: Vec<TType>,
    /// Return type.
    pub rt: TType,
}

impl FunctionType {
    /// Create a non-generic signature.
    pub fn new(args: Vec<TType>, rt: TType) -> Self {
        Self {
            type_vars: Vec::new(),
            args,
            rt,
        }
    }

    pub fn with_type_vars(mut self, type_vars: Vec<TypeVar>) -> Self {
        self.type_vars = type_vars;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.type_vars.is_empty()
    }

    pub fn type_var(&self, name: &str) -> Option<&TypeVar> {
        self.type_vars.iter().find(|v| v.name.as_ref() == name)
    }

    /// Apply `f` to every argument type and the return type.
    pub fn try_map<E>(&self, mut f: impl FnMut(&TType) -> Result<TType, E>) -> Result<Self, E> {
        let args = self.args.iter().map(&mut f).collect::<Result<Vec<_>, E>>()?;
        let rt = f(&self.rt)?;
        Ok(Self {
            type_vars: self.type_vars.clone(),
            args,
            rt,
        })
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_vars.is_empty() {
            let vars: Vec<_> = self
                .type_vars
                .iter()
                .map(|v| format!("{}: {}", v.name, v.bound))
                .collect();
            write!(f, "<{}>", vars.join(", "))?;
        }
        let args: Vec<_> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "({}) -> {}", args.join(", "), self.rt)
    }
}
