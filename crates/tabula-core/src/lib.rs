//! Tabula-Core: typed filtering for spreadsheet-like tables
//!
//! Columns pick their format at runtime (Number, Text, Date, Select, ...).
//! This crate derives a type for each column, offers the predicates and
//! properties applicable to that type, and evaluates the filter and sort
//! trees users build from them.
//!
//! # Quick Start
//!
//! ```
//! use tabula_core::{Column, ColumnMap, Env, Row};
//! use tabula_core::filter::{FilterGroup, Operand, Reference, SingleFilter};
//!
//! let env = Env::with_standard_library().unwrap();
//!
//! let age = Column::new("Age", "Number", None);
//! let columns: ColumnMap = [age.clone()].into_iter().collect();
//! let vars = env.create_vars(&columns);
//!
//! // The predicates a user may pick for the column.
//! let menu: Vec<_> = env.methods_for(&vars[0]).iter().map(|f| f.name()).collect();
//! assert!(menu.contains(&">"));
//!
//! let filter = FilterGroup::and(vec![SingleFilter::new(
//!     Reference::var(age.id.as_str()),
//!     "gt_number_number",
//!     vec![Operand::literal(25)],
//! )
//! .into()]);
//! let row = Row::new().with(age.id.as_str(), 30);
//! assert!(env.evaluator().evaluate(&filter, &row));
//! ```
//!
//! # Modules
//!
//! - `typesystem`: traits, declarations, subtyping and generic instantiation
//! - `eval`: runtime values, rows and the filter evaluator
//! - `filter`: filter and sort trees
//! - `format`: column formats and render capabilities
//! - `stdlib`: the standard traits, predicates and properties

mod column;
mod env;
mod vars;

pub mod eval;
pub mod filter;
pub mod format;
pub mod stdlib;
pub mod typesystem;

pub use column::{Column, ColumnMap};
pub use env::Env;
pub use vars::{create_vars, init_filter, init_filter_group, FilterError, Variable};

pub use eval::{EvalError, EvalErrorKind, Evaluator, Row, RowSource, Value};
pub use filter::{Filter, FilterGroup, SortExp, SortGroup};
pub use format::{format, input_render, CellRender, ColumnFormat, InputRender};
pub use typesystem::{
    DeclKind, FunctionDecl, FunctionDef, FunctionImpl, Instance, Substitution, TypeError,
    Typesystem, Unifier,
};

pub use tabula_types::{FunctionType, LiteralValue, PrimitiveKind, TType, TraitType, TypeVar};
