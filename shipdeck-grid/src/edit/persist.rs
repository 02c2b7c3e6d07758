//! Writing committed values.

use std::sync::Arc;

use futures::future::join_all;
use shipdeck_lib::WriteQueue;
use shipdeck_lib::derived::transit_days;
use shipdeck_lib::error::StoreError;
use shipdeck_lib::hooks::CommitEvent;
use shipdeck_lib::hooks::CommitHook;
use shipdeck_lib::model::FieldPatch;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::model::Value;
use shipdeck_lib::model::fields;
use shipdeck_lib::store::RecordStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Builds the patch a committed value writes.
///
/// Changing a shipment's departure or arrival also writes the transit time
/// derived from the new pair.
pub fn commit_patch(record: &Record, field: &str, value: Value) -> FieldPatch {
    let mut patch = FieldPatch::single(field, value);
    if record.kind() == RecordKind::Shipment && (field == fields::ETD || field == fields::ETA) {
        let date = |name: &str| {
            patch
                .get(name)
                .unwrap_or_else(|| record.value(name))
                .clone()
        };
        let tt = transit_days(&date(fields::ETD), &date(fields::ETA));
        patch.insert(fields::TT, tt);
    }
    patch
}

/// Sends patches through the write queue and runs commit hooks.
///
/// Hooks run on their own task once the write succeeded; a write never waits
/// for them. [`settle_hooks`](Self::settle_hooks) waits for the ones still
/// running.
#[derive(Clone)]
pub struct Persister {
    store: Arc<dyn RecordStore>,
    queue: WriteQueue,
    hooks: Vec<Arc<dyn CommitHook>>,
    refresh_fields: Vec<String>,
    running: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("queue", &self.queue)
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("refresh_fields", &self.refresh_fields)
            .finish()
    }
}

impl Persister {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            queue: WriteQueue::new(),
            hooks: Vec::new(),
            refresh_fields: Vec::new(),
            running: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shares an existing queue, e.g. with a second grid over the same store.
    pub fn with_queue(mut self, queue: WriteQueue) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Fields whose commits are marked as refresh commits for the hooks.
    pub fn with_refresh_fields(mut self, fields: Vec<String>) -> Self {
        self.refresh_fields = fields;
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn queue(&self) -> &WriteQueue {
        &self.queue
    }

    /// Writes a patch and returns the record as it is now stored.
    ///
    /// Returns as soon as the store accepted the patch. Hook failures are
    /// logged and do not fail the write.
    pub async fn write(&self, previous: &Record, patch: &FieldPatch) -> Result<Record, StoreError> {
        let kind = previous.kind();
        let id = previous.id();
        self.queue
            .run(kind, id, self.store.update(kind, id, patch))
            .await?;

        let mut current = previous.clone();
        current.apply(patch);
        self.spawn_hooks(CommitEvent::new(previous.clone(), current.clone(), patch.clone()))
            .await;
        Ok(current)
    }

    /// Waits for every hook task started so far.
    pub async fn settle_hooks(&self) {
        let running = std::mem::take(&mut *self.running.lock().await);
        for task in join_all(running).await {
            if let Err(e) = task {
                log::warn!("Commit hook task ended abnormally: {e}");
            }
        }
    }

    async fn spawn_hooks(&self, event: CommitEvent) {
        let refresh = event
            .patch
            .iter()
            .any(|(field, _)| self.refresh_fields.iter().any(|f| f == field));
        let event = event.with_refresh(refresh);
        let hooks: Vec<_> = self
            .hooks
            .iter()
            .filter(|h| h.applies_to(&event))
            .cloned()
            .collect();
        if hooks.is_empty() {
            return;
        }

        let task = tokio::spawn(async move {
            for hook in hooks {
                if let Err(e) = hook.after_commit(&event).await {
                    log::warn!("{} hook failed for {}: {e}", hook.name(), event.current.id());
                }
            }
        });
        let mut running = self.running.lock().await;
        running.retain(|t| !t.is_finished());
        running.push(task);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use async_trait::async_trait;
    use shipdeck_lib::hooks::TransportSync;
    use shipdeck_lib::model::RecordId;
    use shipdeck_lib::store::MemoryStore;

    use crate::config::GridConfig;

    fn shipment() -> Record {
        Record::new(RecordKind::Shipment, "r-1")
            .set(fields::ETD, "2024-03-01")
            .set(fields::ETA, "2024-03-20")
            .set(fields::BOOKING, "BK-1")
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_records(vec![
            shipment(),
            Record::new(RecordKind::Transport, "t-1").set(fields::REGISTRO_ID, "r-1"),
        ]))
    }

    /// Counts the commits it sees, after an optional delay.
    #[derive(Default)]
    struct Recorder {
        delay: Duration,
        seen: AtomicUsize,
    }

    #[async_trait]
    impl CommitHook for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn after_commit(&self, _event: &CommitEvent) -> Result<(), StoreError> {
            tokio::time::sleep(self.delay).await;
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_departure_change_rewrites_transit_time() {
        let patch = commit_patch(&shipment(), fields::ETA, Value::from("2024-03-31"));
        assert_eq!(patch.get(fields::TT), Some(&Value::Int(30)));

        let patch = commit_patch(&shipment(), fields::ETD, Value::from("2024-04-01"));
        assert_eq!(patch.get(fields::TT), Some(&Value::Null));

        let patch = commit_patch(&shipment(), fields::POL, Value::from("VALPARAISO"));
        assert_eq!(patch.len(), 1);
    }

    #[tokio::test]
    async fn test_hook_failure_does_not_fail_write() {
        let store = store();
        store.fail_updates("t-1", "transport table locked");

        let persister = Persister::new(store.clone())
            .with_hook(Arc::new(TransportSync::new(store.clone())))
            .with_refresh_fields(vec![fields::BOOKING.to_string()]);

        let patch = FieldPatch::single(fields::BOOKING, "BK-2");
        let current = persister.write(&shipment(), &patch).await.unwrap();
        assert_eq!(current.value(fields::BOOKING), &Value::from("BK-2"));
        persister.settle_hooks().await;

        let stored = store
            .record(RecordKind::Shipment, &RecordId::from("r-1"))
            .unwrap();
        assert_eq!(stored.value(fields::BOOKING), &Value::from("BK-2"));
    }

    #[tokio::test]
    async fn test_write_does_not_wait_for_slow_hooks() {
        let recorder = Arc::new(Recorder {
            delay: Duration::from_secs(2),
            ..Default::default()
        });
        let persister = Persister::new(store()).with_hook(recorder.clone());

        let patch = FieldPatch::single(fields::BOOKING, "BK-2");
        let written = tokio::time::timeout(
            Duration::from_millis(500),
            persister.write(&shipment(), &patch),
        )
        .await;
        assert!(written.is_ok(), "write waited for the hook");
        assert_eq!(recorder.seen.load(Ordering::SeqCst), 0);

        persister.settle_hooks().await;
        assert_eq!(recorder.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hooks_see_commits_outside_refresh_fields() {
        let recorder = Arc::new(Recorder::default());
        let persister = Persister::new(store())
            .with_hook(recorder.clone())
            .with_refresh_fields(GridConfig::shipments().refresh_fields);

        persister
            .write(&shipment(), &FieldPatch::single(fields::ETA, "2024-03-25"))
            .await
            .unwrap();
        persister.settle_hooks().await;
        assert_eq!(recorder.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_sync_skips_non_refresh_commits() {
        let store = store();
        let persister = Persister::new(store.clone())
            .with_hook(Arc::new(TransportSync::new(store.clone())))
            .with_refresh_fields(vec![fields::ESTADO.to_string()]);

        persister
            .write(&shipment(), &FieldPatch::single(fields::BOOKING, "BK-2"))
            .await
            .unwrap();
        persister.settle_hooks().await;

        let transport = store
            .record(RecordKind::Transport, &RecordId::from("t-1"))
            .unwrap();
        assert_eq!(transport.value(fields::BOOKING), &Value::Null);
    }

    #[tokio::test]
    async fn test_transport_sync_mirrors_refresh_commits() {
        let store = store();
        let persister = Persister::new(store.clone())
            .with_hook(Arc::new(TransportSync::new(store.clone())))
            .with_refresh_fields(GridConfig::shipments().refresh_fields);

        persister
            .write(&shipment(), &FieldPatch::single(fields::BOOKING, "BK-2"))
            .await
            .unwrap();
        persister.settle_hooks().await;

        let transport = store
            .record(RecordKind::Transport, &RecordId::from("t-1"))
            .unwrap();
        assert_eq!(transport.value(fields::BOOKING), &Value::from("BK-2"));
    }
}
