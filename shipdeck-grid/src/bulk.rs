//! Applying one value to every selected record.

use futures::future::join_all;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordId;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::model::Value;

use crate::GridConfig;
use crate::cache::RecordCache;
use crate::edit::EditCapabilities;
use crate::edit::Persister;
use crate::edit::commit_patch;
use crate::error::BulkEditError;
use crate::selection::Selection;

/// A checked bulk edit, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPlan {
    pub kind: RecordKind,
    pub field: String,
    pub value: Value,
    /// Selected records that are loaded, in load order.
    pub targets: Vec<RecordId>,
}

/// Per-record outcome of a bulk edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub field: String,
    pub updated: Vec<RecordId>,
    pub failed: Vec<(RecordId, String)>,
}

impl BulkReport {
    /// Returns `true` if every record was updated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

/// Returns `true` if the field offers bulk editing.
pub fn allows_bulk(config: &GridConfig, field: &str) -> bool {
    !config.is_bulk_denied(field)
}

/// Checks a bulk edit against the denylist, the capabilities and the
/// selection.
pub fn plan(
    config: &GridConfig,
    capabilities: &EditCapabilities,
    cache: &RecordCache,
    selection: &Selection,
    field: &str,
    value: Value,
) -> Result<BulkPlan, BulkEditError> {
    if !allows_bulk(config, field) {
        return Err(BulkEditError::NotBulkEditable(field.to_string()));
    }
    if !capabilities.allows(cache.kind(), field) {
        return Err(BulkEditError::NotEditable(field.to_string()));
    }
    let targets: Vec<RecordId> = cache
        .iter()
        .filter(|r| selection.is_selected(r.id()))
        .map(|r| r.id().clone())
        .collect();
    if targets.is_empty() {
        return Err(BulkEditError::EmptySelection);
    }
    Ok(BulkPlan {
        kind: cache.kind(),
        field: field.to_string(),
        value,
        targets,
    })
}

/// Runs a plan: one write per record, concurrently, each through the
/// record's write lane.
///
/// Returns the report and the updated records.
pub async fn execute(
    plan: &BulkPlan,
    cache: &RecordCache,
    persister: &Persister,
) -> (BulkReport, Vec<Record>) {
    let writes = plan
        .targets
        .iter()
        .filter_map(|id| cache.get(id))
        .map(|previous| async move {
            let patch = commit_patch(previous, &plan.field, plan.value.clone());
            let result = persister.write(previous, &patch).await;
            (previous.id().clone(), result)
        });

    let mut report = BulkReport {
        field: plan.field.clone(),
        ..Default::default()
    };
    let mut records = Vec::new();
    for (id, result) in join_all(writes).await {
        match result {
            Ok(record) => {
                report.updated.push(id);
                records.push(record);
            }
            Err(e) => {
                log::warn!("Bulk update of {} on {id} failed: {e}", plan.field);
                report.failed.push((id, e.to_string()));
            }
        }
    }
    log::info!(
        "Bulk edit of {}: {} updated, {} failed",
        plan.field,
        report.updated.len(),
        report.failed.len()
    );
    (report, records)
}
