//! Row selection.
//!
//! Selection is keyed by record id so it stays stable while rows are
//! filtered, re-sorted or reloaded.

use std::collections::HashSet;

use shipdeck_lib::model::RecordId;

/// What a select-all toggle covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllScope {
    /// Every loaded record.
    All { count: usize },
    /// Only the rows passing the filters.
    Visible { visible: usize, total: usize },
}

impl SelectAllScope {
    pub fn new(visible: usize, total: usize) -> Self {
        if visible < total {
            Self::Visible { visible, total }
        } else {
            Self::All { count: total }
        }
    }

    /// Short label for the select-all checkbox.
    pub fn label(&self) -> String {
        match self {
            Self::All { count } => format!("{count}"),
            Self::Visible { visible, total } => format!("{visible}/{total}"),
        }
    }
}

/// ID-based selection state.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<RecordId>,
    /// Anchor for range selection (Shift+click starting point)
    anchor: Option<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<RecordId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&RecordId> {
        self.anchor.as_ref()
    }

    /// Clear all selection.
    /// Returns the number of IDs that were deselected.
    pub fn clear(&mut self) -> usize {
        let removed = self.selected.len();
        self.selected.clear();
        self.anchor = None;
        removed
    }

    /// Toggle selection of an ID (checkbox or Ctrl+click).
    /// Returns `true` if the ID is now selected.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        self.anchor = Some(id.clone());
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Range select from anchor to target (Shift+click).
    ///
    /// `ordered` is the visible row order. Without an anchor, or when either
    /// end is not visible, only the target is added.
    /// Returns the number of newly selected IDs.
    pub fn range_select(&mut self, target: &RecordId, ordered: &[RecordId]) -> usize {
        let anchor = self.anchor.clone().unwrap_or_else(|| target.clone());
        let anchor_pos = ordered.iter().position(|id| *id == anchor);
        let target_pos = ordered.iter().position(|id| id == target);

        let range = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => &ordered[a.min(t)..=a.max(t)],
            _ => std::slice::from_ref(target),
        };
        range
            .iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .count()
    }

    /// Returns `true` if every given ID is selected (and there is one).
    pub fn all_selected(&self, ids: &[RecordId]) -> bool {
        !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id))
    }

    /// Header checkbox: selects every given ID, or deselects them all if
    /// they were already selected.
    /// Returns `true` if the IDs are now selected.
    pub fn toggle_all(&mut self, ids: &[RecordId]) -> bool {
        if self.all_selected(ids) {
            for id in ids {
                self.selected.remove(id);
            }
            false
        } else {
            self.selected.extend(ids.iter().cloned());
            true
        }
    }

    /// Drops IDs that no longer satisfy `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&RecordId) -> bool) {
        self.selected.retain(|id| keep(id));
        if self.anchor.as_ref().is_some_and(|a| !self.selected.contains(a)) {
            self.anchor = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<RecordId> {
        names.iter().map(|n| RecordId::from(*n)).collect()
    }

    #[test]
    fn test_scope() {
        assert_eq!(SelectAllScope::new(5, 5), SelectAllScope::All { count: 5 });
        let scope = SelectAllScope::new(3, 10);
        assert_eq!(scope, SelectAllScope::Visible { visible: 3, total: 10 });
        assert_eq!(scope.label(), "3/10");
    }

    #[test]
    fn test_toggle_all_visible() {
        let mut selection = Selection::new();
        let visible = ids(&["a", "b"]);
        assert!(selection.toggle_all(&visible));
        assert!(selection.toggle(&RecordId::from("z")));
        assert_eq!(selection.len(), 3);

        assert!(!selection.toggle_all(&visible));
        assert_eq!(selection.selected(), ids(&["z"]));
    }

    #[test]
    fn test_range_select() {
        let mut selection = Selection::new();
        let ordered = ids(&["a", "b", "c", "d"]);
        selection.toggle(&RecordId::from("d"));
        assert_eq!(selection.range_select(&RecordId::from("b"), &ordered), 2);
        assert_eq!(selection.selected(), ids(&["b", "c", "d"]));
    }

    #[test]
    fn test_retain_drops_anchor() {
        let mut selection = Selection::new();
        selection.toggle(&RecordId::from("a"));
        selection.retain(|id| id.as_str() != "a");
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }
}
