//! Typed reads of record fields

use std::fmt;

use crate::model::Record;
use crate::model::RecordId;
use crate::model::RecordKind;

/// The record field a [`FieldError`] is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub kind: RecordKind,
    pub record: RecordId,
    pub field: String,
}

impl FieldRef {
    pub fn of(record: &Record, field: &str) -> Self {
        Self {
            kind: record.kind(),
            record: record.id().clone(),
            field: field.to_string(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.kind, self.record, self.field)
    }
}

/// A record field could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The record was loaded without this column.
    #[error("{at} was not loaded")]
    Missing { at: FieldRef },

    /// The column holds another kind of value.
    #[error("{at} holds {actual}, expected {expected}")]
    TypeMismatch {
        at: FieldRef,
        expected: &'static str,
        actual: &'static str,
    },

    /// The column holds text that is not a valid value of the type, such as
    /// a date column with free text typed into it.
    #[error("{at} holds {text:?}, not a valid {expected}")]
    Unparsable {
        at: FieldRef,
        expected: &'static str,
        text: String,
    },
}

impl FieldError {
    pub fn missing(record: &Record, field: &str) -> Self {
        Self::Missing {
            at: FieldRef::of(record, field),
        }
    }

    pub fn type_mismatch(
        record: &Record,
        field: &str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            at: FieldRef::of(record, field),
            expected,
            actual,
        }
    }

    pub fn unparsable(
        record: &Record,
        field: &str,
        expected: &'static str,
        text: impl Into<String>,
    ) -> Self {
        Self::Unparsable {
            at: FieldRef::of(record, field),
            expected,
            text: text.into(),
        }
    }

    /// The record field the error is about.
    pub fn at(&self) -> &FieldRef {
        match self {
            Self::Missing { at } | Self::TypeMismatch { at, .. } | Self::Unparsable { at, .. } => at,
        }
    }
}
