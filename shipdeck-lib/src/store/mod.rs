//! Record persistence
//!
//! The console reads whole tables once and writes back one record at a time.
//! [`RecordStore`] is that contract; [`CatalogSource`] serves the option lists
//! behind select editors.

mod memory;
mod rest;

pub use memory::*;
pub use rest::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::FieldPatch;
use crate::model::Record;
use crate::model::RecordId;
use crate::model::RecordKind;

/// Remote record store with single-record updates.
///
/// # Example
///
/// ```ignore
/// use shipdeck_lib::model::{FieldPatch, RecordId, RecordKind};
/// use shipdeck_lib::store::{MemoryStore, RecordStore};
///
/// let store = MemoryStore::new();
/// let id = RecordId::from("r-1");
/// store
///     .update(RecordKind::Shipment, &id, &FieldPatch::single("naviera", "MSC"))
///     .await?;
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads every live record of a table.
    async fn load(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError>;

    /// Writes the patch to the record with the given id.
    async fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<(), StoreError>;
}

/// Source of named option lists (plants, depots, carriers...).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the ordered option list of a catalog.
    async fn fetch_catalog(&self, name: &str) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn load(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        (**self).load(kind).await
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<(), StoreError> {
        (**self).update(kind, id, patch).await
    }
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn fetch_catalog(&self, name: &str) -> Result<Vec<String>, StoreError> {
        (**self).fetch_catalog(name).await
    }
}
