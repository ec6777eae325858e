//! Unified environment for typed filtering.
//!
//! The `Env` owns the typesystem and ties together the column formats, the
//! filter builders and the evaluator.

use std::sync::Arc;

use tabula_types::TType;

use crate::column::ColumnMap;
use crate::eval::Evaluator;
use crate::filter::SingleFilter;
use crate::format::{input_render, InputRender};
use crate::stdlib::{self, StandardTraits};
use crate::typesystem::{FunctionDecl, FunctionDef, TypeError, Typesystem};
use crate::vars::{create_vars, init_filter, FilterError, Variable};

/// Unified environment for typed filtering.
///
/// Registration happens while the environment is being built. Once shared
/// (see [`Env::shared`]), the typesystem is read-only; registering on a
/// clone of a shared environment copies the typesystem first.
///
/// # Example
///
/// ```
/// use tabula_core::{Column, ColumnMap, Env};
///
/// let env = Env::with_standard_library().unwrap();
/// let columns: ColumnMap = [Column::new("Due", "Date", None)].into_iter().collect();
///
/// let vars = env.create_vars(&columns);
/// let filter = env.init_filter(&vars).unwrap();
/// assert_eq!(filter.function, "is_empty_unknown");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Env {
    typesystem: Arc<Typesystem>,
    traits: Option<StandardTraits>,
}

impl Env {
    /// Create a new empty environment.
    ///
    /// This environment has no traits, functions or properties. Use
    /// `with_standard_library()` for a fully-featured environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new environment with the standard library installed.
    pub fn with_standard_library() -> Result<Self, TypeError> {
        let mut env = Self::new();
        let traits = stdlib::install(env.typesystem_mut())?;
        env.traits = Some(traits);
        Ok(env)
    }

    fn typesystem_mut(&mut self) -> &mut Typesystem {
        Arc::make_mut(&mut self.typesystem)
    }

    /// Register a trait (builder pattern).
    pub fn with_trait(mut self, name: &str, merge: Vec<TType>) -> Result<Self, TypeError> {
        self.add_trait(name, merge)?;
        Ok(self)
    }

    /// Register a trait, returning its type.
    pub fn add_trait(&mut self, name: &str, merge: Vec<TType>) -> Result<TType, TypeError> {
        self.typesystem_mut().register_trait(name, merge)
    }

    /// Register a function (builder pattern).
    pub fn with_function(mut self, def: FunctionDef) -> Result<Self, TypeError> {
        self.add_function(def)?;
        Ok(self)
    }

    pub fn add_function(&mut self, def: FunctionDef) -> Result<(), TypeError> {
        self.typesystem_mut().register_function(def)?;
        Ok(())
    }

    /// Register a function, overriding one with the same id.
    pub fn replace_function(&mut self, def: FunctionDef) -> Result<(), TypeError> {
        self.typesystem_mut().replace_function(def)?;
        Ok(())
    }

    /// Register a property (builder pattern).
    pub fn with_property(mut self, def: FunctionDef) -> Result<Self, TypeError> {
        self.add_property(def)?;
        Ok(self)
    }

    pub fn add_property(&mut self, def: FunctionDef) -> Result<(), TypeError> {
        self.typesystem_mut().register_property(def)?;
        Ok(())
    }

    /// Register a property, overriding one with the same name.
    pub fn replace_property(&mut self, def: FunctionDef) -> Result<(), TypeError> {
        self.typesystem_mut().replace_property(def)?;
        Ok(())
    }

    pub fn typesystem(&self) -> &Typesystem {
        &self.typesystem
    }

    /// A shared handle to the typesystem, for other threads.
    pub fn shared(&self) -> Arc<Typesystem> {
        Arc::clone(&self.typesystem)
    }

    /// The standard traits, if the standard library is installed.
    pub fn standard_traits(&self) -> Option<&StandardTraits> {
        self.traits.as_ref()
    }

    /// Variables for every column with a known format.
    pub fn create_vars(&self, columns: &ColumnMap) -> Vec<Variable> {
        create_vars(&self.typesystem, columns)
    }

    /// A default filter on the first variable.
    pub fn init_filter(&self, vars: &[Variable]) -> Result<SingleFilter, FilterError> {
        init_filter(&self.typesystem, vars)
    }

    /// The predicates offered for a variable.
    pub fn methods_for(&self, var: &Variable) -> Vec<&FunctionDecl> {
        self.typesystem.get_methods(&var.ty, &TType::Boolean)
    }

    /// The properties readable from a variable.
    pub fn properties_for(&self, var: &Variable) -> Vec<&FunctionDecl> {
        self.typesystem.get_properties(&var.ty)
    }

    /// The input control for entering values of `ty`.
    pub fn input_render(&self, ty: &TType) -> Option<InputRender> {
        input_render(&self.typesystem, ty)
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.typesystem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Value;
    use tabula_types::FunctionType;

    #[test]
    fn test_new_env_is_empty() {
        let env = Env::new();
        assert!(env.typesystem().functions().is_empty());
        assert!(env.standard_traits().is_none());
    }

    #[test]
    fn test_standard_library() {
        let env = Env::with_standard_library().unwrap();
        let traits = env.standard_traits().unwrap();
        assert_eq!(env.typesystem().trait_named("Date"), Some(traits.date.clone()));
        assert!(env.typesystem().function("gt_number_number").is_some());
        assert_eq!(env.input_render(&traits.phone), Some(InputRender::String));
    }

    #[test]
    fn test_builder() {
        let env = Env::new()
            .with_trait("Rating", vec![TType::Number])
            .unwrap()
            .with_function(FunctionDef::function(
                "Is high",
                FunctionType::new(vec![TType::Number], TType::Boolean),
                |args| {
                    let score = args.first().and_then(Value::as_number).unwrap_or(0.0);
                    Ok(Value::Bool(score > 3.0))
                },
            ))
            .unwrap();
        let rating = env.typesystem().trait_named("Rating").unwrap();
        let var = Variable {
            id: "r".to_string(),
            name: "Rating".to_string(),
            ty: rating,
        };
        let methods: Vec<_> = env.methods_for(&var).iter().map(|f| f.id().to_string()).collect();
        assert_eq!(methods, vec!["is_high_number"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let env = Env::with_standard_library().unwrap();
        assert!(matches!(
            env.with_trait("Date", vec![]),
            Err(TypeError::DuplicateTrait { .. })
        ));
    }

    #[test]
    fn test_shared_typesystem_is_copied_on_write() {
        let mut env = Env::with_standard_library().unwrap();
        let shared = env.shared();
        env.add_trait("Rating", vec![TType::Number]).unwrap();
        assert!(shared.trait_named("Rating").is_none());
        assert!(env.typesystem().trait_named("Rating").is_some());
    }

    #[test]
    fn test_env_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Env>();
        assert_send_sync::<Typesystem>();
    }
}
