//! Shared fixtures for the grid integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use shipdeck_grid::GridConfig;
use shipdeck_grid::RecordGrid;
use shipdeck_grid::column::PLANT_CATALOG;
use shipdeck_grid::column::shipment_columns;
use shipdeck_grid::column::transport_columns;
use shipdeck_grid::edit::EditCapabilities;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::model::fields;
use shipdeck_lib::store::MemoryStore;

pub fn shipment(id: &str, carrier: &str, vessel: &str, status: &str) -> Record {
    Record::new(RecordKind::Shipment, id)
        .set(fields::REF_ASLI, format!("A{}", id.trim_start_matches('r')))
        .set(fields::NAVIERA, carrier)
        .set(fields::NAVE_INICIAL, vessel)
        .set(fields::ESTADO, status)
}

pub fn transport(id: &str) -> Record {
    Record::new(RecordKind::Transport, id)
        .set(fields::SEMANA, 12)
        .set(fields::BOOKING, format!("BK-{id}"))
}

/// Five shipments: two confirmed, two pending, one cancelled.
pub fn fleet() -> Vec<Record> {
    vec![
        shipment("r1", "MSC", "MSC ANNA", "CONFIRMADO"),
        shipment("r2", "ONE", "MSC ANNA", "PENDIENTE"),
        shipment("r3", "ONE", "ONE APUS", "CONFIRMADO"),
        shipment("r4", "HAPAG", "SANTOS EXPRESS", "PENDIENTE"),
        shipment("r5", "MSC", "MSC LENA", "CANCELADO"),
    ]
}

pub fn many_shipments(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| shipment(&format!("r{i:04}"), "MSC", "MSC ANNA", "CONFIRMADO"))
        .collect()
}

pub fn store(records: Vec<Record>) -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_records(records)
            .with_catalog(PLANT_CATALOG, vec!["Rancagua".into(), "Curicó".into()]),
    )
}

pub async fn shipment_grid(store: Arc<MemoryStore>, config: GridConfig) -> RecordGrid {
    let mut grid = RecordGrid::new(
        RecordKind::Shipment,
        config,
        shipment_columns(),
        store.clone(),
        store,
    )
    .with_capabilities(EditCapabilities::editor());
    grid.reload().await.unwrap();
    grid.set_viewport(1_280.0, 400.0);
    grid
}

pub async fn transport_grid(store: Arc<MemoryStore>) -> RecordGrid {
    let mut grid = RecordGrid::new(
        RecordKind::Transport,
        GridConfig::transports(),
        transport_columns(),
        store.clone(),
        store,
    )
    .with_capabilities(EditCapabilities::editor());
    grid.reload().await.unwrap();
    grid.set_viewport(1_280.0, 400.0);
    grid
}
