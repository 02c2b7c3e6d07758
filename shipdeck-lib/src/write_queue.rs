//! Per-record write serialization.
//!
//! Two saves on the same record reach the store in the order they were
//! issued; saves on different records run independently. Each record gets
//! a lane (a fair async mutex) that lives only while writes are queued on it.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::model::RecordId;
use crate::model::RecordKind;

type LaneKey = (RecordKind, RecordId);

/// Serializes writes per record.
///
/// Cloning shares the same lanes.
///
/// # Example
///
/// ```ignore
/// let queue = WriteQueue::new();
/// queue
///     .run(RecordKind::Shipment, &id, store.update(RecordKind::Shipment, &id, &patch))
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteQueue {
    lanes: Arc<DashMap<LaneKey, Arc<Mutex<()>>>>,
}

impl WriteQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `write` once every earlier write on the same record finished.
    ///
    /// The write future is not polled until its turn comes.
    pub async fn run<F, T>(&self, kind: RecordKind, id: &RecordId, write: F) -> T
    where
        F: Future<Output = T>,
    {
        let key = (kind, id.clone());
        let lane = self.lanes.entry(key.clone()).or_default().clone();

        let output = {
            let _turn = lane.lock().await;
            write.await
        };

        drop(lane);
        // Only the map holds the lane once nobody is queued on it
        self.lanes.remove_if(&key, |_, lane| Arc::strong_count(lane) == 1);
        output
    }

    /// Returns `true` if a write on the record is running or queued.
    pub fn is_busy(&self, kind: RecordKind, id: &RecordId) -> bool {
        self.lanes.contains_key(&(kind, id.clone()))
    }

    /// Returns the number of records with writes in flight.
    pub fn busy_records(&self) -> usize {
        self.lanes.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::FieldPatch;
    use crate::model::Record;
    use crate::store::MemoryStore;
    use crate::store::RecordStore;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_records(vec![
            Record::new(RecordKind::Shipment, "r-1"),
            Record::new(RecordKind::Shipment, "r-2"),
        ]))
    }

    #[tokio::test]
    async fn test_same_record_writes_land_in_issue_order() {
        let store = store();
        let queue = WriteQueue::new();
        let id = RecordId::from("r-1");
        let slow = FieldPatch::single("etd", "2024-03-05");
        let fast = FieldPatch::single("tt", 21i64);

        // First write is slow, second fast; the second must still land last
        store.push_latency(Duration::from_millis(40));
        store.push_latency(Duration::ZERO);

        let (a, b) = tokio::join!(
            queue.run(RecordKind::Shipment, &id, store.update(RecordKind::Shipment, &id, &slow)),
            queue.run(RecordKind::Shipment, &id, store.update(RecordKind::Shipment, &id, &fast)),
        );
        a.unwrap();
        b.unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].1, slow);
        assert_eq!(writes[1].1, fast);
        assert_eq!(queue.busy_records(), 0);
    }

    #[tokio::test]
    async fn test_unqueued_writes_can_overtake() {
        let store = store();
        let id = RecordId::from("r-1");
        let slow = FieldPatch::single("etd", "2024-03-05");
        let fast = FieldPatch::single("tt", 21i64);

        store.push_latency(Duration::from_millis(40));
        store.push_latency(Duration::ZERO);

        let (a, b) = tokio::join!(
            store.update(RecordKind::Shipment, &id, &slow),
            store.update(RecordKind::Shipment, &id, &fast),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(store.writes()[0].1, fast);
    }

    #[tokio::test]
    async fn test_different_records_do_not_wait() {
        let store = store();
        let queue = WriteQueue::new();
        let r1 = RecordId::from("r-1");
        let r2 = RecordId::from("r-2");
        let patch = FieldPatch::single("naviera", "MSC");

        store.push_latency(Duration::from_millis(40));
        store.push_latency(Duration::ZERO);

        let (a, b) = tokio::join!(
            queue.run(RecordKind::Shipment, &r1, store.update(RecordKind::Shipment, &r1, &patch)),
            queue.run(RecordKind::Shipment, &r2, store.update(RecordKind::Shipment, &r2, &patch)),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(store.writes()[0].0, r2);
    }
}
