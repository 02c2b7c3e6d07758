//! Grid preferences persisted between sessions.
//!
//! Each grid kind remembers its column widths, visibility overrides and sort
//! keys. Widths are handed to the first mount only, so a restored session
//! starts from the configured sizes.

mod sqlite;

pub use sqlite::SqlitePreferences;

use std::collections::HashMap;

use async_trait::async_trait;
use shipdeck_grid::RecordGrid;
use shipdeck_grid::filter::SortKey;
use shipdeck_lib::model::RecordKind;
use thiserror::Error;

/// Preference storage error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
}

/// Storage of [`GridPreferences`], one set per grid kind.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preferences of a grid; defaults if none were saved.
    async fn load(&self, grid: RecordKind) -> Result<GridPreferences, SettingsError>;

    /// Replaces everything saved for the grid.
    async fn save(&self, grid: RecordKind, prefs: &GridPreferences) -> Result<(), SettingsError>;

    /// Forgets the grid's preferences.
    async fn clear(&self, grid: RecordKind) -> Result<(), SettingsError>;
}

/// What a grid remembers between sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPreferences {
    /// Column visibility overrides.
    pub visibility: HashMap<String, bool>,
    /// Last user column widths.
    pub sizing: HashMap<String, u32>,
    /// Sort keys; empty keeps the grid's default sort.
    pub sort: Vec<SortKey>,
}

impl GridPreferences {
    /// Captures the current preferences of a grid.
    pub fn capture(grid: &RecordGrid) -> Self {
        Self {
            visibility: grid.layout().visibility().clone(),
            sizing: grid.layout().sizing().clone(),
            sort: grid.sort_keys().to_vec(),
        }
    }

    /// Applies the preferences to a freshly created grid and mounts it.
    pub fn apply(self, grid: &mut RecordGrid) {
        grid.restore_visibility(self.visibility);
        if !self.sort.is_empty() {
            grid.set_sort(self.sort);
        }
        grid.mount(self.sizing);
    }

    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty() && self.sizing.is_empty() && self.sort.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use shipdeck_grid::GridConfig;
    use shipdeck_grid::column::shipment_columns;
    use shipdeck_lib::model::fields;
    use shipdeck_lib::store::MemoryStore;

    fn grid() -> RecordGrid {
        let store = Arc::new(MemoryStore::new());
        RecordGrid::new(
            RecordKind::Shipment,
            GridConfig::shipments(),
            shipment_columns(),
            store.clone(),
            store,
        )
    }

    #[test]
    fn test_apply_restores_visibility_and_sort() {
        let prefs = GridPreferences {
            visibility: HashMap::from([(fields::COMENTARIO.to_string(), false)]),
            sizing: HashMap::from([(fields::NAVIERA.to_string(), 180)]),
            sort: vec![SortKey::asc(fields::ETD)],
        };

        let mut grid = grid();
        prefs.apply(&mut grid);
        let captured = GridPreferences::capture(&grid);

        assert_eq!(captured.visibility.get(fields::COMENTARIO), Some(&false));
        assert_eq!(captured.sort, vec![SortKey::asc(fields::ETD)]);
        // persisted widths are discarded at mount
        assert!(captured.sizing.is_empty());
    }

    #[test]
    fn test_empty_sort_keeps_the_default() {
        let mut grid = grid();
        let default_sort = grid.sort_keys().to_vec();
        GridPreferences::default().apply(&mut grid);
        assert_eq!(grid.sort_keys(), default_sort.as_slice());
    }
}
