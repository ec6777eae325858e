//! Filter evaluation.
//!
//! - `Value` is a runtime cell or literal
//! - `RowSource` resolves column ids to values for one row
//! - `Evaluator` walks filter trees and orders rows
//!
//! # Example
//!
//! ```
//! use tabula_core::Env;
//! use tabula_core::eval::Row;
//! use tabula_core::filter::{FilterGroup, Operand, Reference, SingleFilter};
//!
//! let env = Env::with_standard_library().unwrap();
//! let filter = FilterGroup::and(vec![SingleFilter::new(
//!     Reference::var("age"),
//!     "gt_number_number",
//!     vec![Operand::literal(25)],
//! )
//! .into()]);
//!
//! let row = Row::new().with("age", 30);
//! assert!(env.evaluator().evaluate(&filter, &row));
//! ```

mod error;
mod evaluator;
mod row;
mod sort;
mod value;

pub use error::{EvalError, EvalErrorKind};
pub use evaluator::Evaluator;
pub use row::{Row, RowSource};
pub use value::Value;
