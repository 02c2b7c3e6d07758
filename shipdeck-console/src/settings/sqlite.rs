//! SQLite preference store.
//!
//! One row per remembered column and one per sort key, both keyed by the
//! grid's table name. Loaded preferences are cached per grid.

use std::collections::BTreeMap;
use std::path::Path;

use async_sqlite::Client;
use async_trait::async_trait;
use dashmap::DashMap;
use shipdeck_grid::filter::SortKey;
use shipdeck_lib::model::RecordKind;

use super::GridPreferences;
use super::PreferenceStore;
use super::SettingsError;

/// SQLite-backed grid preferences.
pub struct SqlitePreferences {
    client: Client,
    cache: DashMap<RecordKind, GridPreferences>,
}

/// One `grid_columns` row.
#[derive(Debug, Clone, PartialEq)]
struct ColumnRow {
    column: String,
    width: Option<i64>,
    visible: Option<bool>,
}

impl SqlitePreferences {
    /// Opens (or creates) the preferences database at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let client = async_sqlite::ClientBuilder::new()
            .path(path)
            .open()
            .await?;

        client
            .conn(|conn| {
                conn.execute_batch(
                    "
                    CREATE TABLE IF NOT EXISTS grid_columns (
                        grid TEXT NOT NULL,
                        column_id TEXT NOT NULL,
                        width INTEGER,
                        visible INTEGER,
                        PRIMARY KEY (grid, column_id)
                    );

                    CREATE TABLE IF NOT EXISTS grid_sort (
                        grid TEXT NOT NULL,
                        position INTEGER NOT NULL,
                        column_id TEXT NOT NULL,
                        descending INTEGER NOT NULL DEFAULT 0,
                        PRIMARY KEY (grid, position)
                    );
                    ",
                )
            })
            .await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

/// Merges widths and visibility into one row per column, ordered by id.
fn column_rows(prefs: &GridPreferences) -> Vec<ColumnRow> {
    let mut rows: BTreeMap<&str, ColumnRow> = BTreeMap::new();
    for (column, width) in &prefs.sizing {
        rows.entry(column.as_str())
            .or_insert_with(|| ColumnRow::empty(column))
            .width = Some(i64::from(*width));
    }
    for (column, visible) in &prefs.visibility {
        rows.entry(column.as_str())
            .or_insert_with(|| ColumnRow::empty(column))
            .visible = Some(*visible);
    }
    rows.into_values().collect()
}

impl ColumnRow {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            width: None,
            visible: None,
        }
    }
}

fn assemble(grid: RecordKind, columns: Vec<ColumnRow>, sort: Vec<SortKey>) -> GridPreferences {
    let mut prefs = GridPreferences {
        sort,
        ..Default::default()
    };
    for row in columns {
        if let Some(width) = row.width {
            match u32::try_from(width) {
                Ok(width) => {
                    prefs.sizing.insert(row.column.clone(), width);
                }
                Err(_) => log::warn!("Ignoring width {width} of {grid}.{}", row.column),
            }
        }
        if let Some(visible) = row.visible {
            prefs.visibility.insert(row.column, visible);
        }
    }
    prefs
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn load(&self, grid: RecordKind) -> Result<GridPreferences, SettingsError> {
        if let Some(prefs) = self.cache.get(&grid) {
            return Ok(prefs.clone());
        }

        let table = grid.table();
        let (columns, sort) = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT column_id, width, visible FROM grid_columns WHERE grid = ?",
                )?;
                let columns = stmt
                    .query_map([table], |row| {
                        Ok(ColumnRow {
                            column: row.get(0)?,
                            width: row.get(1)?,
                            visible: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut stmt = conn.prepare(
                    "SELECT column_id, descending FROM grid_sort WHERE grid = ? ORDER BY position",
                )?;
                let sort = stmt
                    .query_map([table], |row| {
                        Ok(SortKey {
                            column: row.get(0)?,
                            desc: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((columns, sort))
            })
            .await?;

        let prefs = assemble(grid, columns, sort);
        self.cache.insert(grid, prefs.clone());
        Ok(prefs)
    }

    async fn save(&self, grid: RecordKind, prefs: &GridPreferences) -> Result<(), SettingsError> {
        let table = grid.table();
        let columns = column_rows(prefs);
        let sort = prefs.sort.clone();

        self.client
            .conn(move |conn| {
                let tx = conn.unchecked_transaction()?;
                tx.execute("DELETE FROM grid_columns WHERE grid = ?", [table])?;
                tx.execute("DELETE FROM grid_sort WHERE grid = ?", [table])?;
                {
                    let mut insert = tx.prepare(
                        "INSERT INTO grid_columns (grid, column_id, width, visible)
                         VALUES (?, ?, ?, ?)",
                    )?;
                    for row in &columns {
                        insert.execute(rusqlite::params![table, &row.column, row.width, row.visible])?;
                    }

                    let mut insert = tx.prepare(
                        "INSERT INTO grid_sort (grid, position, column_id, descending)
                         VALUES (?, ?, ?, ?)",
                    )?;
                    for (position, key) in (0i64..).zip(&sort) {
                        insert.execute(rusqlite::params![table, position, &key.column, key.desc])?;
                    }
                }
                tx.commit()
            })
            .await?;

        self.cache.insert(grid, prefs.clone());
        log::debug!("Saved {grid} grid preferences");
        Ok(())
    }

    async fn clear(&self, grid: RecordKind) -> Result<(), SettingsError> {
        let table = grid.table();

        self.client
            .conn(move |conn| {
                conn.execute("DELETE FROM grid_columns WHERE grid = ?", [table])?;
                conn.execute("DELETE FROM grid_sort WHERE grid = ?", [table])
            })
            .await?;

        self.cache.remove(&grid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn prefs() -> GridPreferences {
        GridPreferences {
            visibility: HashMap::from([
                ("comentario".to_string(), false),
                ("naviera".to_string(), true),
            ]),
            sizing: HashMap::from([("naviera".to_string(), 180), ("pol".to_string(), 140)]),
            sort: vec![SortKey::desc("etd"), SortKey::asc("refAsli")],
        }
    }

    #[test]
    fn test_column_rows_merge_width_and_visibility() {
        let rows = column_rows(&prefs());
        assert_eq!(
            rows,
            vec![
                ColumnRow {
                    column: "comentario".into(),
                    width: None,
                    visible: Some(false),
                },
                ColumnRow {
                    column: "naviera".into(),
                    width: Some(180),
                    visible: Some(true),
                },
                ColumnRow {
                    column: "pol".into(),
                    width: Some(140),
                    visible: None,
                },
            ]
        );
    }

    #[test]
    fn test_out_of_range_widths_are_dropped() {
        let rows = vec![ColumnRow {
            column: "pol".into(),
            width: Some(-5),
            visible: Some(false),
        }];
        let prefs = assemble(RecordKind::Shipment, rows, Vec::new());
        assert!(prefs.sizing.is_empty());
        assert_eq!(prefs.visibility.get("pol"), Some(&false));
    }

    #[tokio::test]
    async fn test_preferences_are_kept_per_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");
        let store = SqlitePreferences::open(&path).await.unwrap();

        store.save(RecordKind::Shipment, &prefs()).await.unwrap();
        assert_eq!(store.load(RecordKind::Shipment).await.unwrap(), prefs());
        assert!(store.load(RecordKind::Transport).await.unwrap().is_empty());

        // a second connection reads what the first wrote, sort order included
        let reopened = SqlitePreferences::open(&path).await.unwrap();
        assert_eq!(reopened.load(RecordKind::Shipment).await.unwrap(), prefs());

        reopened.clear(RecordKind::Shipment).await.unwrap();
        assert!(reopened.load(RecordKind::Shipment).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_earlier_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePreferences::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        store.save(RecordKind::Transport, &prefs()).await.unwrap();

        let narrower = GridPreferences {
            sizing: HashMap::from([("pol".to_string(), 120)]),
            ..Default::default()
        };
        store.save(RecordKind::Transport, &narrower).await.unwrap();

        let reopened = SqlitePreferences::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        assert_eq!(reopened.load(RecordKind::Transport).await.unwrap(), narrower);
    }
}
