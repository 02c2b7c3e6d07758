//! The inline edit state machine.
//!
//! At most one cell is open at a time. The session is a plain reducer: it
//! never touches the store. The grid drives it through
//! [`release`](EditSession::release), [`grant`](EditSession::grant),
//! [`begin_save`](EditSession::begin_save) and
//! [`complete_save`](EditSession::complete_save) and performs the writes in
//! between.

use chrono::FixedOffset;
use shipdeck_lib::model::RecordId;
use shipdeck_lib::model::Value;

use super::editor::EditorKind;
use super::editor::InvalidInputPolicy;
use crate::error::EditError;

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditTarget {
    pub record: RecordId,
    pub field: String,
}

impl EditTarget {
    pub fn new(record: impl Into<RecordId>, field: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            field: field.into(),
        }
    }
}

impl std::fmt::Display for EditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.record, self.field)
    }
}

/// Phase of the open cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Editing,
    Saving,
}

/// What a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Idle,
    Editing,
    Saving,
}

/// The open cell.
#[derive(Debug, Clone)]
pub struct ActiveEdit {
    pub target: EditTarget,
    pub editor: EditorKind,
    /// Draft the editor opened with; an unchanged draft commits as a cancel.
    pub seed: String,
    pub draft: String,
    pub phase: EditPhase,
    /// Inline message of the last failed commit.
    pub error: Option<String>,
}

/// A parsed draft ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub target: EditTarget,
    pub value: Value,
}

/// Result of releasing the open cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// Nothing was open.
    Nothing,
    /// The draft was unchanged or could not be kept.
    Cancelled(EditTarget),
    /// The draft changed and must be written.
    Commit(PendingCommit),
    /// A save was already in flight; its completion will be dropped.
    Detached(EditTarget),
}

/// Result of a save completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The save succeeded and the cell closed.
    Closed,
    /// The save failed and the cell is back in editing with the message.
    Reopened,
    /// The cell is no longer active.
    Dropped,
}

/// Single-cell edit session.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    active: Option<ActiveEdit>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        self.active.as_ref()
    }

    pub fn target(&self) -> Option<&EditTarget> {
        self.active.as_ref().map(|a| &a.target)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// What the given cell shows.
    pub fn state_of(&self, record: &RecordId, field: &str) -> CellState {
        match &self.active {
            Some(active) if active.target.record == *record && active.target.field == field => {
                match active.phase {
                    EditPhase::Editing => CellState::Editing,
                    EditPhase::Saving => CellState::Saving,
                }
            }
            _ => CellState::Idle,
        }
    }

    /// First phase of a handoff: resolve whatever is open.
    ///
    /// A changed draft becomes a [`Release::Commit`]; an unchanged one is
    /// cancelled. A changed draft that cannot be kept under the policy is
    /// discarded, since the cell is being left.
    pub fn release(&mut self, policy: InvalidInputPolicy, offset: FixedOffset) -> Release {
        let Some(active) = self.active.take() else {
            return Release::Nothing;
        };
        if active.phase == EditPhase::Saving {
            return Release::Detached(active.target);
        }
        if active.draft == active.seed {
            return Release::Cancelled(active.target);
        }
        match policy.resolve(active.editor.parse(&active.draft, offset)) {
            Ok(value) => Release::Commit(PendingCommit {
                target: active.target,
                value,
            }),
            Err(e) => {
                log::warn!("Discarding draft of {}: {e}", active.target);
                Release::Cancelled(active.target)
            }
        }
    }

    /// Second phase of a handoff: open the new cell.
    ///
    /// Fails with [`EditError::SaveInProgress`] if a cell is still open.
    pub fn grant(
        &mut self,
        target: EditTarget,
        editor: EditorKind,
        seed: String,
    ) -> Result<(), EditError> {
        if self.active.is_some() {
            return Err(EditError::SaveInProgress);
        }
        self.active = Some(ActiveEdit {
            target,
            editor,
            draft: seed.clone(),
            seed,
            phase: EditPhase::Editing,
            error: None,
        });
        Ok(())
    }

    /// Replaces the draft, applying the editor's mask.
    pub fn input(&mut self, raw: &str) -> Result<&str, EditError> {
        let active = self.active.as_mut().ok_or(EditError::NoActiveEdit)?;
        if active.phase == EditPhase::Saving {
            return Err(EditError::SaveInProgress);
        }
        active.draft = active.editor.mask(raw);
        active.error = None;
        Ok(&active.draft)
    }

    /// Closes the open cell without saving.
    ///
    /// A save in flight cannot be cancelled; the cell stays as is.
    pub fn cancel(&mut self) -> Option<EditTarget> {
        match &self.active {
            Some(active) if active.phase == EditPhase::Editing => {
                self.active.take().map(|a| a.target)
            }
            _ => None,
        }
    }

    /// Starts saving the open cell.
    ///
    /// Returns `Ok(None)` and closes the cell when the draft is unchanged.
    /// A draft rejected by the policy keeps the cell open with the message.
    pub fn begin_save(
        &mut self,
        policy: InvalidInputPolicy,
        offset: FixedOffset,
    ) -> Result<Option<PendingCommit>, EditError> {
        let active = self.active.as_mut().ok_or(EditError::NoActiveEdit)?;
        if active.phase == EditPhase::Saving {
            return Err(EditError::SaveInProgress);
        }
        if active.draft == active.seed {
            self.active = None;
            return Ok(None);
        }
        match policy.resolve(active.editor.parse(&active.draft, offset)) {
            Ok(value) => {
                active.phase = EditPhase::Saving;
                active.error = None;
                Ok(Some(PendingCommit {
                    target: active.target.clone(),
                    value,
                }))
            }
            Err(e) => {
                active.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Finishes a save started by [`begin_save`](Self::begin_save).
    pub fn complete_save(&mut self, target: &EditTarget, outcome: Result<(), String>) -> Completion {
        let Some(active) = self.active.as_mut() else {
            log::debug!("Dropping save completion of {target}: no cell is open");
            return Completion::Dropped;
        };
        if active.target != *target || active.phase != EditPhase::Saving {
            log::debug!("Dropping save completion of {target}: {} is open", active.target);
            return Completion::Dropped;
        }
        match outcome {
            Ok(()) => {
                self.active = None;
                Completion::Closed
            }
            Err(message) => {
                active.phase = EditPhase::Editing;
                active.error = Some(message);
                Completion::Reopened
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn open(session: &mut EditSession, record: &str, field: &str, seed: &str) -> EditTarget {
        let target = EditTarget::new(record, field);
        session
            .grant(target.clone(), EditorKind::Text, seed.to_string())
            .unwrap();
        target
    }

    #[test]
    fn test_unchanged_commit_cancels() {
        let mut session = EditSession::new();
        open(&mut session, "1", "naviera", "MSC");
        let pending = session
            .begin_save(InvalidInputPolicy::default(), utc())
            .unwrap();
        assert_eq!(pending, None);
        assert!(session.is_idle());
    }

    #[test]
    fn test_save_round_trip() {
        let mut session = EditSession::new();
        let target = open(&mut session, "1", "naviera", "MSC");
        session.input("  CMA CGM ").unwrap();
        let pending = session
            .begin_save(InvalidInputPolicy::default(), utc())
            .unwrap()
            .unwrap();
        assert_eq!(pending.value, Value::from("CMA CGM"));
        assert_eq!(session.state_of(&target.record, "naviera"), CellState::Saving);
        assert!(matches!(session.input("x"), Err(EditError::SaveInProgress)));
        assert_eq!(session.cancel(), None);

        assert_eq!(session.complete_save(&target, Ok(())), Completion::Closed);
        assert!(session.is_idle());
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let mut session = EditSession::new();
        let target = open(&mut session, "1", "naviera", "MSC");
        session.input("ONE").unwrap();
        session
            .begin_save(InvalidInputPolicy::default(), utc())
            .unwrap();
        let completion = session.complete_save(&target, Err("timeout".into()));
        assert_eq!(completion, Completion::Reopened);

        let active = session.active().unwrap();
        assert_eq!(active.phase, EditPhase::Editing);
        assert_eq!(active.draft, "ONE");
        assert_eq!(active.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_reject_policy_keeps_editor_open() {
        let mut session = EditSession::new();
        let target = EditTarget::new("1", "etd");
        session
            .grant(target.clone(), EditorKind::Date, String::new())
            .unwrap();
        session.input("32/13/2024").unwrap();
        let err = session
            .begin_save(InvalidInputPolicy::Reject, utc())
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidInput { .. }));
        assert_eq!(session.state_of(&target.record, "etd"), CellState::Editing);
        assert!(session.active().unwrap().error.is_some());
    }

    #[test]
    fn test_release_then_grant() {
        let mut session = EditSession::new();
        let first = open(&mut session, "1", "naviera", "MSC");
        assert!(matches!(
            session.grant(EditTarget::new("2", "pol"), EditorKind::Text, String::new()),
            Err(EditError::SaveInProgress)
        ));

        session.input("MAERSK").unwrap();
        let release = session.release(InvalidInputPolicy::default(), utc());
        assert_eq!(
            release,
            Release::Commit(PendingCommit {
                target: first.clone(),
                value: Value::from("MAERSK"),
            })
        );

        let second = open(&mut session, "2", "pol", "");
        assert_eq!(session.target(), Some(&second));
        assert_eq!(session.complete_save(&first, Ok(())), Completion::Dropped);
        assert_eq!(session.target(), Some(&second));
    }

    #[test]
    fn test_time_input_is_masked() {
        let mut session = EditSession::new();
        session
            .grant(EditTarget::new("1", "stacking"), EditorKind::Time, String::new())
            .unwrap();
        assert_eq!(session.input("0930").unwrap(), "09:30");
    }
}
