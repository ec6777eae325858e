//! Tree-walking evaluator for filter trees.
//!
//! Every call is a fresh recursive walk over one row. Evaluation never
//! fails: an unknown function or property, or an implementation returning
//! an error or panicking, makes that node absent (`None`), which is falsy. A broken
//! predicate therefore hides rows rather than aborting the whole view.

use std::panic::{self, AssertUnwindSafe};

use super::{EvalError, RowSource, Value};
use crate::filter::{Filter, FilterGroup, GroupOp, Operand, Reference, SingleFilter};
use crate::typesystem::{FunctionDecl, Typesystem};

/// The filter evaluator.
///
/// Borrows the typesystem to resolve function ids and property names.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    typesystem: &'a Typesystem,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator.
    pub fn new(typesystem: &'a Typesystem) -> Self {
        Self { typesystem }
    }

    pub fn typesystem(&self) -> &'a Typesystem {
        self.typesystem
    }

    /// Resolve a column reference or property read against `row`.
    pub fn eval_ref(&self, reference: &Reference, row: &dyn RowSource) -> Option<Value> {
        match reference {
            Reference::Variable(var) => row.field(&var.name),
            Reference::Property(access) => {
                let base = self.eval_ref(&access.base, row);
                let Some(property) = self.typesystem.property(&access.property) else {
                    tracing::debug!(property = %access.property, "unknown property");
                    return None;
                };
                invoke(property, &[base.unwrap_or_default()])
            }
        }
    }

    /// Resolve a predicate argument.
    pub fn eval_value(&self, operand: &Operand, row: &dyn RowSource) -> Option<Value> {
        match operand {
            Operand::Literal { value } => Some(value.clone()),
            Operand::Ref(var) => row.field(&var.name),
        }
    }

    /// Evaluate a filter node.
    ///
    /// Groups produce a boolean; single filters produce whatever their
    /// implementation returns.
    pub fn eval_filter(&self, filter: &Filter, row: &dyn RowSource) -> Option<Value> {
        match filter {
            Filter::Single(single) => self.eval_single(single, row),
            Filter::Group(group) => Some(Value::Bool(self.eval_group(group, row))),
        }
    }

    /// Decide whether `row` passes `group`.
    pub fn evaluate(&self, group: &FilterGroup, row: &dyn RowSource) -> bool {
        self.eval_group(group, row)
    }

    /// The rows passing `group`, in their original order.
    pub fn filter_rows<'r, R: RowSource>(&self, group: &FilterGroup, rows: &'r [R]) -> Vec<&'r R> {
        rows.iter().filter(|row| self.evaluate(group, *row)).collect()
    }

    fn eval_single(&self, filter: &SingleFilter, row: &dyn RowSource) -> Option<Value> {
        let Some(function) = self.typesystem.resolve_function(&filter.function) else {
            tracing::debug!(function = %filter.function, "unknown function");
            return None;
        };

        let mut args = Vec::with_capacity(function.arity().max(filter.args.len() + 1));
        args.push(self.eval_ref(&filter.left, row).unwrap_or_default());
        args.extend(
            filter
                .args
                .iter()
                .map(|arg| self.eval_value(arg, row).unwrap_or_default()),
        );
        // Arguments the filter leaves out are absent.
        if args.len() < function.arity() {
            args.resize(function.arity(), Value::Null);
        }

        invoke(function, &args)
    }

    fn eval_group(&self, group: &FilterGroup, row: &dyn RowSource) -> bool {
        let truthy = |f: &Filter| self.eval_filter(f, row).is_some_and(|v| v.is_truthy());
        match group.op {
            GroupOp::And => group.conditions.iter().all(truthy),
            GroupOp::Or => group.conditions.iter().any(truthy),
        }
    }
}

/// Call an implementation, turning errors and panics into an absent result.
fn invoke(decl: &FunctionDecl, args: &[Value]) -> Option<Value> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| decl.call(args)))
        .unwrap_or_else(|payload| Err(EvalError::panicked(payload)));
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(id = %decl.id(), kind = ?decl.kind(), %error, "implementation failed");
            None
        }
    }
}
