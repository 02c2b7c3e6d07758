//! Where records come from: a JSON fixture or the REST backend.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use shipdeck_grid::GridConfig;
use shipdeck_lib::WriteQueue;
use shipdeck_lib::hooks::CommitHook;
use shipdeck_lib::hooks::TransportSync;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::store::CatalogSource;
use shipdeck_lib::store::MemoryStore;
use shipdeck_lib::store::RecordStore;
use shipdeck_lib::store::RestHistory;
use shipdeck_lib::store::RestStore;

use crate::error::ConsoleError;

pub const URL_VAR: &str = "SHIPDECK_STORE_URL";
pub const KEY_VAR: &str = "SHIPDECK_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Store, catalog source and commit hooks of one session.
///
/// Grid writes and hook writes share `queue`.
pub struct Backend {
    pub records: Arc<dyn RecordStore>,
    pub catalogs: Arc<dyn CatalogSource>,
    pub hooks: Vec<Arc<dyn CommitHook>>,
    pub queue: WriteQueue,
}

/// Fixture file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixture {
    shipments: Vec<serde_json::Value>,
    transports: Vec<serde_json::Value>,
    catalogs: HashMap<String, Vec<String>>,
}

/// Loads a JSON fixture into an in-memory store.
pub fn from_fixture(path: &Path) -> Result<Backend, ConsoleError> {
    let text = fs::read_to_string(path).map_err(|e| ConsoleError::io(path, e))?;
    let fixture: Fixture = serde_json::from_str(&text).map_err(|e| ConsoleError::json(path, e))?;
    let store = Arc::new(build_store(fixture)?);
    log::info!("Loaded fixture {}", path.display());
    let queue = WriteQueue::new();
    Ok(Backend {
        hooks: vec![Arc::new(
            TransportSync::new(store.clone()).with_queue(queue.clone()),
        )],
        catalogs: store.clone(),
        records: store,
        queue,
    })
}

fn build_store(fixture: Fixture) -> Result<MemoryStore, ConsoleError> {
    let rows = fixture
        .shipments
        .into_iter()
        .map(|row| (RecordKind::Shipment, row))
        .chain(
            fixture
                .transports
                .into_iter()
                .map(|row| (RecordKind::Transport, row)),
        );
    let records = rows
        .map(|(kind, row)| Record::from_json(kind, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(fixture
        .catalogs
        .into_iter()
        .fold(MemoryStore::new().with_records(records), |store, (name, options)| {
            store.with_catalog(name, options)
        }))
}

/// Connects to the REST backend named by the environment.
pub fn from_env() -> Result<Backend, ConsoleError> {
    let url = env::var(URL_VAR).map_err(|_| ConsoleError::MissingEnv(URL_VAR))?;
    let key = env::var(KEY_VAR).map_err(|_| ConsoleError::MissingEnv(KEY_VAR))?;
    let store = RestStore::builder()
        .url(url)
        .api_key(key)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    log::info!("Using store at {}", store.base_url());

    let shared: Arc<RestStore> = Arc::new(store.clone());
    let queue = WriteQueue::new();
    Ok(Backend {
        hooks: vec![
            Arc::new(TransportSync::new(shared.clone()).with_queue(queue.clone())),
            Arc::new(RestHistory::new(store)),
        ],
        catalogs: shared.clone(),
        records: shared,
        queue,
    })
}

/// Reads a grid configuration file over the grid's defaults.
///
/// Missing keys keep their default values.
pub fn load_config(path: Option<&Path>, kind: RecordKind) -> Result<GridConfig, ConsoleError> {
    let defaults = match kind {
        RecordKind::Shipment => GridConfig::shipments(),
        RecordKind::Transport => GridConfig::transports(),
    };
    let Some(path) = path else {
        return Ok(defaults);
    };
    let text = fs::read_to_string(path).map_err(|e| ConsoleError::io(path, e))?;
    let mut value = serde_json::to_value(&defaults).map_err(|e| ConsoleError::json(path, e))?;
    let overrides: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ConsoleError::json(path, e))?;
    merge(&mut value, overrides);
    serde_json::from_value(value).map_err(|e| ConsoleError::json(path, e))
}

fn merge(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdeck_lib::model::RecordId;

    const FIXTURE: &str = r#"{
        "shipments": [
            {"id": "r1", "refAsli": "A0001", "naviera": "MSC", "estado": "PENDIENTE"},
            {"id": 2, "refAsli": "A0002", "naviera": "ONE"}
        ],
        "catalogs": {"plantas": ["Rancagua"]}
    }"#;

    #[tokio::test]
    async fn test_fixture_builds_a_memory_store() {
        let store = build_store(serde_json::from_str(FIXTURE).unwrap()).unwrap();
        assert_eq!(store.len(RecordKind::Shipment), 2);
        assert!(store.is_empty(RecordKind::Transport));
        assert!(store.record(RecordKind::Shipment, &RecordId::from("2")).is_some());
        assert_eq!(store.fetch_catalog("plantas").await.unwrap(), vec!["Rancagua"]);
    }

    #[test]
    fn test_fixture_rows_need_an_id() {
        let fixture = serde_json::from_str(r#"{"shipments": [{"naviera": "MSC"}]}"#).unwrap();
        let result = build_store(fixture);
        assert!(matches!(result, Err(ConsoleError::Store(_))));
    }

    #[test]
    fn test_config_overrides_keep_grid_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        fs::write(
            &path,
            r#"{"row_height_estimate": 32.0, "autoscroll": {"max_speed": 10.0}}"#,
        )
        .unwrap();

        let config = load_config(Some(&path), RecordKind::Transport).unwrap();
        assert_eq!(config.row_height_estimate, 32.0);
        assert_eq!(config.autoscroll.max_speed, 10.0);
        assert_eq!(config.autoscroll.divisor, 14.0);
        assert_eq!(config.null_placeholder, "—");
    }
}
