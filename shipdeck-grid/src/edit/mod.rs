//! Inline cell editing.
//!
//! [`EditSession`] holds the single open cell, [`EditorKind`] parses and
//! seeds drafts, and [`Persister`] writes committed values through the
//! per-record write queue. [`RecordGrid`](crate::RecordGrid) ties them
//! together with the two-phase handoff of
//! [`request_edit`](crate::RecordGrid::request_edit).

mod datetime;
mod editor;
mod persist;
mod session;

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

pub use datetime::*;
pub use editor::*;
pub use persist::*;
pub use session::*;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::model::Value;

use crate::bulk::BulkReport;

/// What the current user may edit.
///
/// # Example
///
/// ```
/// use shipdeck_grid::edit::EditCapabilities;
/// use shipdeck_lib::model::RecordKind;
///
/// let caps = EditCapabilities::editor().read_only(RecordKind::Shipment, "refAsli");
/// assert!(caps.allows(RecordKind::Shipment, "naviera"));
/// assert!(!caps.allows(RecordKind::Shipment, "refAsli"));
/// assert!(!EditCapabilities::viewer().allows(RecordKind::Shipment, "naviera"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditCapabilities {
    pub can_edit: bool,
    read_only: HashMap<RecordKind, HashSet<String>>,
}

impl EditCapabilities {
    /// A user who may edit.
    pub fn editor() -> Self {
        Self {
            can_edit: true,
            read_only: HashMap::new(),
        }
    }

    /// A user who may only look.
    pub fn viewer() -> Self {
        Self::default()
    }

    /// Marks a field read-only for a record kind (builder pattern).
    pub fn read_only(mut self, kind: RecordKind, field: impl Into<String>) -> Self {
        self.read_only.entry(kind).or_default().insert(field.into());
        self
    }

    pub fn allows(&self, kind: RecordKind, field: &str) -> bool {
        self.can_edit
            && !self
                .read_only
                .get(&kind)
                .is_some_and(|fields| fields.contains(field))
    }
}

/// How the previously open cell was resolved by a handoff.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviousOutcome {
    /// The draft was unchanged (or could not be kept) and was dropped.
    Cancelled(EditTarget),
    /// The draft was written.
    Saved(EditTarget),
    /// Writing the draft failed; the value was not stored.
    Failed { target: EditTarget, message: String },
    /// A save was already in flight and finishes on its own.
    Detached(EditTarget),
}

/// Result of [`request_edit`](crate::RecordGrid::request_edit).
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
    /// What happened to the cell that was open before, if any.
    pub previous: Option<PreviousOutcome>,
    /// The cell now open.
    pub granted: EditTarget,
    /// Options of a select editor, empty for other editors.
    pub options: Arc<Vec<String>>,
}

/// Result of [`commit_edit`](crate::RecordGrid::commit_edit).
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The draft was unchanged; nothing was written.
    Unchanged(EditTarget),
    /// The value was written and cached.
    Saved { target: EditTarget, value: Value },
    /// The value was applied to the whole selection.
    Bulk(BulkReport),
}
