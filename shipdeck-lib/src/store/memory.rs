//! In-memory store implementation using DashMap

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::DashSet;

use super::CatalogSource;
use super::RecordStore;
use crate::error::StoreError;
use crate::model::FieldPatch;
use crate::model::Record;
use crate::model::RecordId;
use crate::model::RecordKind;

/// A store kept entirely in process memory.
///
/// Backs fixture mode in the console and the engine tests. Failures and
/// write latency can be injected to exercise error and ordering paths.
///
/// # Example
///
/// ```
/// use shipdeck_lib::model::{Record, RecordKind};
/// use shipdeck_lib::store::MemoryStore;
///
/// let store = MemoryStore::new()
///     .with_records(vec![Record::new(RecordKind::Shipment, "r-1").set("naviera", "MSC")])
///     .with_catalog("plantas", vec!["Rancagua".into(), "Curicó".into()]);
/// assert_eq!(store.len(RecordKind::Shipment), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<RecordKind, Vec<Record>>,
    catalogs: DashMap<String, Vec<String>>,
    failing_records: DashMap<RecordId, String>,
    failing_catalogs: DashSet<String>,
    latencies: Mutex<VecDeque<Duration>>,
    writes: Mutex<Vec<(RecordId, FieldPatch)>>,
    catalog_fetches: AtomicUsize,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records to their tables (builder pattern).
    pub fn with_records(self, records: Vec<Record>) -> Self {
        for record in records {
            self.tables.entry(record.kind()).or_default().push(record);
        }
        self
    }

    /// Registers a catalog (builder pattern).
    pub fn with_catalog(self, name: impl Into<String>, options: Vec<String>) -> Self {
        self.catalogs.insert(name.into(), options);
        self
    }

    /// Makes every update of the record fail with the given message.
    pub fn fail_updates(&self, id: impl Into<RecordId>, message: impl Into<String>) {
        self.failing_records.insert(id.into(), message.into());
    }

    /// Makes updates of the record succeed again.
    pub fn heal_updates(&self, id: &RecordId) {
        self.failing_records.remove(id);
    }

    /// Makes fetching the catalog fail.
    pub fn fail_catalog(&self, name: impl Into<String>) {
        self.failing_catalogs.insert(name.into());
    }

    /// Queues a delay for the next update call, in call order.
    pub fn push_latency(&self, delay: Duration) {
        if let Ok(mut latencies) = self.latencies.lock() {
            latencies.push_back(delay);
        }
    }

    /// Returns the number of records in a table.
    pub fn len(&self, kind: RecordKind) -> usize {
        self.tables.get(&kind).map(|t| t.len()).unwrap_or(0)
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self, kind: RecordKind) -> bool {
        self.len(kind) == 0
    }

    /// Returns a copy of the stored record.
    pub fn record(&self, kind: RecordKind, id: &RecordId) -> Option<Record> {
        self.tables
            .get(&kind)
            .and_then(|table| table.iter().find(|r| r.id() == id).cloned())
    }

    /// Returns every applied write in the order it reached the store.
    pub fn writes(&self) -> Vec<(RecordId, FieldPatch)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Returns how many catalog fetches were served or failed.
    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    fn next_latency(&self) -> Option<Duration> {
        self.latencies.lock().ok().and_then(|mut l| l.pop_front())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .tables
            .get(&kind)
            .map(|table| table.clone())
            .unwrap_or_default())
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<(), StoreError> {
        if let Some(delay) = self.next_latency() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failing_records.get(id) {
            return Err(StoreError::Rejected(message.clone()));
        }

        {
            let mut table = self.tables.entry(kind).or_default();
            let record = table
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| StoreError::not_found(kind, id))?;
            record.apply(patch);
        }

        if let Ok(mut writes) = self.writes.lock() {
            writes.push((id.clone(), patch.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MemoryStore {
    async fn fetch_catalog(&self, name: &str) -> Result<Vec<String>, StoreError> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_catalogs.contains(name) {
            return Err(StoreError::http(503, format!("catalog '{name}' unavailable")));
        }
        Ok(self
            .catalogs
            .get(name)
            .map(|options| options.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn store() -> MemoryStore {
        MemoryStore::new().with_records(vec![
            Record::new(RecordKind::Shipment, "r-1").set("naviera", "MSC"),
            Record::new(RecordKind::Transport, "t-1").set("planta", "Rancagua"),
        ])
    }

    #[tokio::test]
    async fn test_load_by_kind() {
        let store = store();
        let shipments = store.load(RecordKind::Shipment).await.unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].id().as_str(), "r-1");
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store = store();
        let id = RecordId::from("r-1");
        store
            .update(RecordKind::Shipment, &id, &FieldPatch::single("naviera", "ONE"))
            .await
            .unwrap();

        let record = store.record(RecordKind::Shipment, &id).unwrap();
        assert_eq!(record.value("naviera"), &Value::from("ONE"));
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let store = store();
        let result = store
            .update(
                RecordKind::Shipment,
                &RecordId::from("nope"),
                &FieldPatch::single("naviera", "ONE"),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = store();
        store.fail_updates("r-1", "row locked");
        let result = store
            .update(
                RecordKind::Shipment,
                &RecordId::from("r-1"),
                &FieldPatch::single("naviera", "ONE"),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Rejected(ref m)) if m == "row locked"));
        assert!(store.writes().is_empty());
    }
}
