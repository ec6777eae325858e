//! Filter and sort expression trees.
//!
//! Trees are built by the UI and persisted with the view, so they
//! (de)serialise to a JSON shape discriminated by a `"type"` field:
//!
//! ```json
//! {
//!   "type": "group",
//!   "op": "and",
//!   "conditions": [
//!     {
//!       "type": "filter",
//!       "left": { "type": "ref", "name": "age" },
//!       "function": "gt_number_number",
//!       "args": [{ "type": "literal", "value": 25 }]
//!     }
//!   ]
//! }
//! ```

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::eval::Value;

/// A node of a filter tree.
///
/// Each node serialises its own `"type"`, so a group stored on its own has
/// the same shape as a nested one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    /// A single predicate call.
    #[serde(rename = "filter")]
    Single(SingleFilter),
    /// A boolean combination of filters.
    Group(FilterGroup),
}

impl Filter {
    pub fn and(conditions: Vec<Filter>) -> Self {
        Filter::Group(FilterGroup::and(conditions))
    }

    pub fn or(conditions: Vec<Filter>) -> Self {
        Filter::Group(FilterGroup::or(conditions))
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Filter::Single(filter) => filter.serialize(serializer),
            Filter::Group(group) => group.serialize(serializer),
        }
    }
}

impl From<SingleFilter> for Filter {
    fn from(filter: SingleFilter) -> Self {
        Filter::Single(filter)
    }
}

impl From<FilterGroup> for Filter {
    fn from(group: FilterGroup) -> Self {
        Filter::Group(group)
    }
}

/// Boolean connective of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOp {
    And,
    Or,
}

/// `and`/`or` over child filters.
///
/// An empty `and` holds; an empty `or` does not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterGroup {
    pub op: GroupOp,
    #[serde(default)]
    pub conditions: Vec<Filter>,
}

impl FilterGroup {
    pub fn and(conditions: Vec<Filter>) -> Self {
        Self {
            op: GroupOp::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<Filter>) -> Self {
        Self {
            op: GroupOp::Or,
            conditions,
        }
    }

    pub fn push(&mut self, filter: impl Into<Filter>) {
        self.conditions.push(filter.into());
    }
}

impl Serialize for FilterGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FilterGroup", 3)?;
        state.serialize_field("type", "group")?;
        state.serialize_field("op", &self.op)?;
        state.serialize_field("conditions", &self.conditions)?;
        state.end()
    }
}

/// `function(left, args...)`.
///
/// `function` is a function id; a display name is accepted too and resolves
/// to the first overload registered under it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SingleFilter {
    pub left: Reference,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Operand>,
}

impl SingleFilter {
    pub fn new(left: Reference, function: impl Into<String>, args: Vec<Operand>) -> Self {
        Self {
            left,
            function: function.into(),
            args,
        }
    }
}

impl Serialize for SingleFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SingleFilter", 4)?;
        state.serialize_field("type", "filter")?;
        state.serialize_field("left", &self.left)?;
        state.serialize_field("function", &self.function)?;
        state.serialize_field("args", &self.args)?;
        state.end()
    }
}

/// A column reference, by column id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
}

/// A property read from a reference, e.g. the length of a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccess {
    #[serde(rename = "ref")]
    pub base: Box<Reference>,
    #[serde(rename = "propertyFuncName")]
    pub property: String,
}

/// The left-hand side of a filter or sort entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reference {
    #[serde(rename = "ref")]
    Variable(VariableRef),
    Property(PropertyAccess),
}

impl Reference {
    /// Reference the column with id `name`.
    pub fn var(name: impl Into<String>) -> Self {
        Reference::Variable(VariableRef { name: name.into() })
    }

    /// Read `property` from `base`.
    pub fn property(base: Reference, property: impl Into<String>) -> Self {
        Reference::Property(PropertyAccess {
            base: Box::new(base),
            property: property.into(),
        })
    }
}

/// A predicate argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operand {
    #[serde(rename = "ref")]
    Ref(VariableRef),
    Literal {
        #[serde(default)]
        value: Value,
    },
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal {
            value: value.into(),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Operand::Ref(VariableRef { name: name.into() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortExp {
    pub left: Reference,
    #[serde(rename = "type", default)]
    pub direction: SortDirection,
}

impl SortExp {
    pub fn asc(left: Reference) -> Self {
        Self {
            left,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(left: Reference) -> Self {
        Self {
            left,
            direction: SortDirection::Desc,
        }
    }
}

/// Sort keys, applied left to right as tie-breakers.
pub type SortGroup = Vec<SortExp>;
