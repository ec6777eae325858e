//! Row access for filter evaluation.
//!
//! The `RowSource` trait resolves a column id to the cell value of one row.
//! The data layer owns its rows; anything that can answer a column lookup
//! can be filtered.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Value;

/// Trait for resolving cells during evaluation.
pub trait RowSource: Send + Sync {
    /// Resolve a column id to the cell's value.
    ///
    /// Returns `None` when the row has no such cell; that is an absent value,
    /// not an error.
    fn field(&self, column: &str) -> Option<Value>;

    /// Check if the row has a cell for `column`.
    fn has(&self, column: &str) -> bool {
        self.field(column).is_some()
    }
}

/// An open mapping from column id to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    /// Create a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (column id, value) pairs.
    pub fn from_cells<K, V>(cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a cell.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Builder form of [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Clear a cell.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.cells.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl RowSource for Row {
    fn field(&self, column: &str) -> Option<Value> {
        self.cells.get(column).cloned()
    }

    fn has(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }
}

impl RowSource for HashMap<String, Value> {
    fn field(&self, column: &str) -> Option<Value> {
        self.get(column).cloned()
    }

    fn has(&self, column: &str) -> bool {
        self.contains_key(column)
    }
}

impl<T: RowSource> RowSource for Arc<T> {
    fn field(&self, column: &str) -> Option<Value> {
        (**self).field(column)
    }

    fn has(&self, column: &str) -> bool {
        (**self).has(column)
    }
}

impl<T: RowSource + ?Sized> RowSource for &T {
    fn field(&self, column: &str) -> Option<Value> {
        (**self).field(column)
    }

    fn has(&self, column: &str) -> bool {
        (**self).has(column)
    }
}
