//! Variables and default filters derived from a table's columns.

use tabula_types::TType;
use thiserror::Error;

use crate::column::ColumnMap;
use crate::filter::{FilterGroup, Reference, SingleFilter};
use crate::format::format;
use crate::typesystem::Typesystem;

/// A typed column, as offered to the filter builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Column id; filter references use it.
    pub id: String,
    /// Display name.
    pub name: String,
    pub ty: TType,
}

/// Errors building a default filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("no variables to filter on")]
    NoVariables,

    #[error("no predicate applies to variable '{name}' of type {ty}")]
    NoApplicablePredicate { name: String, ty: String },
}

/// One variable per column whose format is known, in column order.
///
/// Columns with an unknown format, or a format whose trait is missing from
/// the typesystem, are skipped.
pub fn create_vars(typesystem: &Typesystem, columns: &ColumnMap) -> Vec<Variable> {
    columns
        .iter()
        .filter_map(|column| {
            let derived = format(&column.format)
                .and_then(|f| f.derive(typesystem, column.data.as_ref()));
            let Some(ty) = derived else {
                tracing::debug!(column = %column.id, format = %column.format, "skipping column");
                return None;
            };
            Some(Variable {
                id: column.id.clone(),
                name: column.name.clone(),
                ty,
            })
        })
        .collect()
}

/// A filter applying the first predicate available for the first variable.
pub fn init_filter(
    typesystem: &Typesystem,
    vars: &[Variable],
) -> Result<SingleFilter, FilterError> {
    let var = vars.first().ok_or(FilterError::NoVariables)?;
    let function = typesystem
        .get_methods(&var.ty, &TType::Boolean)
        .into_iter()
        .next()
        .ok_or_else(|| FilterError::NoApplicablePredicate {
            name: var.name.clone(),
            ty: var.ty.to_string(),
        })?;
    Ok(SingleFilter::new(
        Reference::var(var.id.clone()),
        function.id(),
        vec![],
    ))
}

/// An empty `and` group, which every row passes.
pub fn init_filter_group() -> FilterGroup {
    FilterGroup::and(vec![])
}
