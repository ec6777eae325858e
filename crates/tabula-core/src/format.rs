//! Column formats.
//!
//! A format names how a column is stored and shown, and derives the
//! column's type from its metadata. Formats backed by a trait (`Date`,
//! `URL`, `Email`, `Phone`) resolve it by name in the typesystem, so the
//! standard library must be installed for them to derive a type.

use tabula_types::TType;

use crate::eval::Value;
use crate::typesystem::Typesystem;

/// How a cell of a format is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRender {
    Number,
    Text,
    Date,
    Checkbox,
    Select,
    MultiSelect,
}

/// The input control suited to entering a value of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputRender {
    Boolean,
    Date,
    Number,
    String,
}

/// A column format: its name, type derivation and cell renderer.
#[derive(Clone, Copy)]
pub struct ColumnFormat {
    pub name: &'static str,
    pub cell: CellRender,
    derive: fn(&Typesystem, Option<&Value>) -> Option<TType>,
}

impl ColumnFormat {
    /// Derive the type of a column with this format from its metadata.
    ///
    /// Returns `None` when the format needs a trait the typesystem lacks.
    pub fn derive(&self, typesystem: &Typesystem, data: Option<&Value>) -> Option<TType> {
        (self.derive)(typesystem, data)
    }
}

impl std::fmt::Debug for ColumnFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnFormat")
            .field("name", &self.name)
            .field("cell", &self.cell)
            .finish()
    }
}

static FORMATS: [ColumnFormat; 9] = [
    ColumnFormat {
        name: "Number",
        cell: CellRender::Number,
        derive: |_, _| Some(TType::Number),
    },
    ColumnFormat {
        name: "Text",
        cell: CellRender::Text,
        derive: |_, _| Some(TType::String),
    },
    ColumnFormat {
        name: "Date",
        cell: CellRender::Date,
        derive: |ts, _| ts.trait_named("Date"),
    },
    ColumnFormat {
        name: "URL",
        cell: CellRender::Text,
        derive: |ts, _| ts.trait_named("URL"),
    },
    ColumnFormat {
        name: "Checkbox",
        cell: CellRender::Checkbox,
        derive: |_, _| Some(TType::Boolean),
    },
    ColumnFormat {
        name: "Email",
        cell: CellRender::Text,
        derive: |ts, _| ts.trait_named("Email"),
    },
    ColumnFormat {
        name: "Phone",
        cell: CellRender::Text,
        derive: |ts, _| ts.trait_named("Phone"),
    },
    ColumnFormat {
        name: "Select",
        cell: CellRender::Select,
        derive: |_, data| Some(options(data)),
    },
    ColumnFormat {
        name: "Multi-Select",
        cell: CellRender::MultiSelect,
        derive: |_, data| Some(TType::array(options(data))),
    },
];

/// Union of string literals from a list of options.
///
/// Non-string options are skipped; anything but a list gives the empty union.
fn options(data: Option<&Value>) -> TType {
    let members: Vec<TType> = data
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(TType::string_literal)
                .collect()
        })
        .unwrap_or_default();
    TType::union(members)
}

/// Every format, in menu order.
pub fn formats() -> &'static [ColumnFormat] {
    &FORMATS
}

/// Look up a format by name.
pub fn format(name: &str) -> Option<&'static ColumnFormat> {
    FORMATS.iter().find(|f| f.name == name)
}

/// The input control for values of `ty`, if any.
///
/// Candidates are tried in order and the first one `equal` to `ty` wins, so
/// a literal-typed column still gets its base type's input.
pub fn input_render(typesystem: &Typesystem, ty: &TType) -> Option<InputRender> {
    let candidates = [
        (Some(TType::Boolean), InputRender::Boolean),
        (typesystem.trait_named("Date"), InputRender::Date),
        (typesystem.trait_named("URL"), InputRender::String),
        (typesystem.trait_named("Phone"), InputRender::String),
        (typesystem.trait_named("Email"), InputRender::String),
        (Some(TType::Number), InputRender::Number),
        (Some(TType::String), InputRender::String),
    ];
    candidates.into_iter().find_map(|(candidate, render)| {
        candidate
            .filter(|c| typesystem.equal(c, ty))
            .map(|_| render)
    })
}
