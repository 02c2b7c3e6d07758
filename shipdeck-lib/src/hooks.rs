//! Follow-up work after a committed edit.
//!
//! Hooks run after the primary write has succeeded, on their own task. Their
//! failures are the caller's to log; they never undo or fail the commit
//! itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::FieldPatch;
use crate::model::Record;
use crate::model::RecordKind;
use crate::model::Value;
use crate::model::fields;
use crate::store::RecordStore;
use crate::write_queue::WriteQueue;

/// A committed change, as seen by hooks.
#[derive(Debug, Clone)]
pub struct CommitEvent {
    /// Table of the committed record.
    pub kind: RecordKind,
    /// The record before the patch.
    pub previous: Record,
    /// The record after the patch.
    pub current: Record,
    /// What was written.
    pub patch: FieldPatch,
    /// Whether the patch assigns one of the grid's refresh fields.
    pub refresh: bool,
}

impl CommitEvent {
    /// Creates an event for a patch written over `previous`.
    pub fn new(previous: Record, current: Record, patch: FieldPatch) -> Self {
        Self {
            kind: current.kind(),
            previous,
            current,
            patch,
            refresh: true,
        }
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Returns `true` if the patch assigns any of the fields.
    pub fn touches(&self, watched: &[&str]) -> bool {
        watched.iter().any(|field| self.patch.contains(field))
    }
}

/// Best-effort work triggered by a commit.
///
/// Each hook decides through [`applies_to`](Self::applies_to) which commits
/// it follows.
#[async_trait]
pub trait CommitHook: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Whether the hook cares about this commit.
    fn applies_to(&self, _event: &CommitEvent) -> bool {
        true
    }

    /// Runs the follow-up work.
    async fn after_commit(&self, event: &CommitEvent) -> Result<(), StoreError>;
}

// =============================================================================
// Transport sync
// =============================================================================

/// Shipment fields mirrored onto the shipment's transport legs.
const MIRRORED_FIELDS: &[&str] = &[
    fields::BOOKING,
    fields::NAVE_INICIAL,
    fields::NAVIERA,
    fields::CONTENEDOR,
    fields::REF_CLIENTE,
];

/// Copies booking, vessel, carrier, first container and client reference
/// from a committed shipment onto its transport records.
///
/// Transports are matched by `registro_id`, or by the old or new booking
/// for legs created before the link existed. Only refresh commits are
/// mirrored. Transport writes go through the write queue so they land in
/// order with inline edits of the same transport.
pub struct TransportSync {
    store: Arc<dyn RecordStore>,
    queue: WriteQueue,
}

impl TransportSync {
    /// Creates the hook over the store holding both tables.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            queue: WriteQueue::new(),
        }
    }

    /// Shares the queue the grids write through.
    pub fn with_queue(mut self, queue: WriteQueue) -> Self {
        self.queue = queue;
        self
    }

    fn mirrored_patch(shipment: &Record) -> FieldPatch {
        let first_container = shipment
            .get_list(fields::CONTENEDOR)
            .ok()
            .flatten()
            .and_then(|containers| containers.into_iter().next());

        FieldPatch::new()
            .set(fields::BOOKING, trimmed(shipment.value(fields::BOOKING)))
            .set(fields::NAVE, trimmed(shipment.value(fields::NAVE_INICIAL)))
            .set(fields::NAVIERA, trimmed(shipment.value(fields::NAVIERA)))
            .set(fields::CONTENEDOR, first_container)
            .set(
                fields::TRANSPORT_REF_CLIENTE,
                trimmed(shipment.value(fields::REF_CLIENTE)),
            )
    }

    fn is_linked(transport: &Record, event: &CommitEvent) -> bool {
        if let Some(Value::String(parent)) = transport.get(fields::REGISTRO_ID) {
            return parent == event.current.id().as_str();
        }
        let Some(booking) = transport.value(fields::BOOKING).as_str() else {
            return false;
        };
        [&event.current, &event.previous]
            .into_iter()
            .filter_map(|r| r.value(fields::BOOKING).as_str())
            .any(|b| !b.trim().is_empty() && b.trim() == booking.trim())
    }
}

fn trimmed(value: &Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

#[async_trait]
impl CommitHook for TransportSync {
    fn name(&self) -> &str {
        "transport-sync"
    }

    fn applies_to(&self, event: &CommitEvent) -> bool {
        event.kind == RecordKind::Shipment && event.refresh && event.touches(MIRRORED_FIELDS)
    }

    async fn after_commit(&self, event: &CommitEvent) -> Result<(), StoreError> {
        let transports = self.store.load(RecordKind::Transport).await?;
        let patch = Self::mirrored_patch(&event.current);

        let mut updated = 0usize;
        for transport in transports.iter().filter(|t| Self::is_linked(t, event)) {
            let id = transport.id();
            self.queue
                .run(
                    RecordKind::Transport,
                    id,
                    self.store.update(RecordKind::Transport, id, &patch),
                )
                .await?;
            updated += 1;
        }
        log::debug!(
            "synced {updated} transport(s) from shipment {}",
            event.current.id()
        );
        Ok(())
    }
}
