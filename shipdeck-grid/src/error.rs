//! Error types

use shipdeck_lib::error::StoreError;
use shipdeck_lib::model::RecordId;

/// Errors raised by the inline edit lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The caller may not edit, the field is read-only or has no editor.
    #[error("Field '{field}' is not editable")]
    NotEditable { field: String },

    /// The target record is not in the grid.
    #[error("Record '{0}' is not loaded")]
    UnknownRecord(RecordId),

    /// An action needed an open editor and none was open.
    #[error("No cell is being edited")]
    NoActiveEdit,

    /// A save is already in flight for the open cell.
    #[error("A save is already in progress")]
    SaveInProgress,

    /// The draft could not be read as the field's type.
    #[error("'{input}' is not a valid {expected}")]
    InvalidInput {
        input: String,
        expected: &'static str,
    },

    /// The draft parsed but falls outside the field's range.
    #[error("{message}")]
    OutOfRange { message: String },

    /// The store refused or failed the write.
    #[error("Save failed: {0}")]
    Persist(#[from] StoreError),

    /// A commit routed to the selection could not be applied.
    #[error(transparent)]
    Bulk(#[from] BulkEditError),
}

impl EditError {
    /// Creates a new not-editable error.
    pub fn not_editable(field: impl Into<String>) -> Self {
        Self::NotEditable {
            field: field.into(),
        }
    }

    /// Creates a new invalid input error.
    pub fn invalid_input(input: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidInput {
            input: input.into(),
            expected,
        }
    }
}

/// Errors raised before a bulk edit is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkEditError {
    /// The field holds per-record unique values.
    #[error("Field '{0}' cannot be edited in bulk")]
    NotBulkEditable(String),

    /// The caller may not edit or the field is read-only.
    #[error("Field '{0}' is not editable")]
    NotEditable(String),

    /// No selected record is loaded.
    #[error("No records selected")]
    EmptySelection,
}
