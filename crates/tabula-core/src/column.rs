//! Column metadata as stored by the data layer.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::eval::Value;

/// A table column: an id, a display name, a format name and optional
/// format metadata (e.g. the option list of a `Select`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Column {
    /// Create a column with a fresh random id.
    pub fn new(name: impl Into<String>, format: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            format: format.into(),
            data,
        }
    }

    /// Create a column with a known id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        format: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            format: format.into(),
            data,
        }
    }
}

/// Columns keyed by id, in insertion order.
///
/// Serialises as a JSON object from id to column. Deserialisation keeps the
/// order the entries appear in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: Vec<Column>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column. A column with the same id is replaced in place.
    pub fn insert(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.id == column.id) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.id == id)?;
        Some(self.columns.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<Column> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut map = ColumnMap::new();
        for column in iter {
            map.insert(column);
        }
        map
    }
}

impl<'a> IntoIterator for &'a ColumnMap {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl Serialize for ColumnMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.id, column)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnMapVisitor;

        impl<'de> Visitor<'de> for ColumnMapVisitor {
            type Value = ColumnMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from column id to column")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ColumnMap, A::Error> {
                let mut map = ColumnMap::new();
                while let Some((_, column)) = access.next_entry::<String, Column>()? {
                    map.insert(column);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ColumnMapVisitor)
    }
}
