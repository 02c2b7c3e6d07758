//! Column definitions and layout.
//!
//! A [`ColumnDef`] says what a column shows and how it is edited, sorted,
//! filtered and sized. [`ColumnLayout`] owns the mutable part: widths the
//! user dragged or auto-fitted and which columns are shown.

mod format;
mod layout;
mod measure;
mod presets;

pub use format::*;
pub use layout::*;
pub use measure::*;
pub use presets::*;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::Value;

use crate::edit::EditorKind;
use crate::filter::FilterFn;

/// Where a column reads its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// A record field.
    Field(String),
    /// Nothing; the column only renders actions.
    Display,
}

impl Accessor {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field(field) => Some(field),
            Self::Display => None,
        }
    }

    pub fn value(&self, record: &Record) -> Value {
        match self {
            Self::Field(field) => record.value(field).clone(),
            Self::Display => Value::Null,
        }
    }
}

/// Declared width hints, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub default: Option<u32>,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// One column of the grid.
///
/// # Example
///
/// ```
/// use shipdeck_grid::column::ColumnDef;
/// use shipdeck_grid::edit::EditorKind;
///
/// let column = ColumnDef::field("pol", "POL")
///     .editor(EditorKind::distinct())
///     .min_width(100)
///     .max_width(180);
/// assert!(column.is_editable());
/// assert_eq!(column.size.min, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub id: String,
    pub header: String,
    pub accessor: Accessor,
    pub editor: Option<EditorKind>,
    pub format: CellFormat,
    pub sortable: bool,
    pub filter: FilterFn,
    pub size: SizeHints,
    pub resizable: bool,
    pub hideable: bool,
}

impl ColumnDef {
    /// Creates a read-only text column over a field of the same id.
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            accessor: Accessor::Field(id.clone()),
            id,
            header: header.into(),
            editor: None,
            format: CellFormat::Text,
            sortable: true,
            filter: FilterFn::Text,
            size: SizeHints::default(),
            resizable: true,
            hideable: true,
        }
    }

    /// Creates a column without a value (actions, links).
    pub fn display(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            accessor: Accessor::Display,
            sortable: false,
            filter: FilterFn::None,
            ..Self::field(id, header)
        }
    }

    pub fn editor(mut self, editor: EditorKind) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    pub fn filter(mut self, filter: FilterFn) -> Self {
        self.filter = filter;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn unresizable(mut self) -> Self {
        self.resizable = false;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.size.default = Some(width);
        self
    }

    pub fn min_width(mut self, width: u32) -> Self {
        self.size.min = Some(width);
        self
    }

    pub fn max_width(mut self, width: u32) -> Self {
        self.size.max = Some(width);
        self
    }

    pub fn is_editable(&self) -> bool {
        self.editor.is_some() && self.accessor.field().is_some()
    }

    pub fn value(&self, record: &Record) -> Value {
        self.accessor.value(record)
    }
}

/// Looks up a column by id.
pub fn find_column<'a>(columns: &'a [ColumnDef], id: &str) -> Option<&'a ColumnDef> {
    columns.iter().find(|c| c.id == id)
}
