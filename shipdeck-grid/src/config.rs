//! Grid configuration
//!
//! Every tunable of the engine in one serializable struct. The defaults
//! reproduce the shipment grid; [`GridConfig::transports`] adjusts them for
//! the transport grid.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use shipdeck_lib::model::fields;

use crate::autoscroll::AutoScrollConfig;
use crate::column::AutoFitConfig;
use crate::edit::InvalidInputPolicy;
use crate::filter::SortKey;
use crate::window::Overscan;

/// Configuration of one record grid.
///
/// # Example
///
/// ```
/// use shipdeck_grid::GridConfig;
///
/// let config = GridConfig::default();
/// assert_eq!(config.row_height_estimate, 40.0);
/// assert_eq!(config.fixed_widths.get("booking"), Some(&230));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Height assumed for rows that were never measured, in pixels.
    pub row_height_estimate: f64,
    /// Extra scrollable space after the last row, in pixels.
    pub padding_end: f64,
    /// How many rows to mount beyond the viewport on each side.
    pub overscan: Overscan,

    /// Width used when a column declares neither default nor minimum.
    pub fallback_column_width: u32,
    /// Columns whose width never changes.
    pub fixed_widths: BTreeMap<String, u32>,
    /// Column pinned to the left edge while scrolling horizontally.
    pub sticky_column: Option<String>,
    /// Columns that visibility toggles never hide.
    pub always_visible: Vec<String>,
    /// Columns hidden until the user shows them.
    pub hidden_by_default: Vec<String>,
    /// Double-click auto-fit measurement.
    pub auto_fit: AutoFitConfig,

    /// Sort applied on load and after a reset.
    pub default_sort: Vec<SortKey>,
    /// Field filtered by the exclusive status pills.
    pub status_field: String,
    /// Status values counted in the summary.
    pub statuses: Vec<String>,
    /// Field compared by the executive filter.
    pub executive_field: String,
    /// Carrier field of the cross-referenced carrier filter.
    pub carrier_field: String,
    /// Vessel field whose carriers also satisfy the carrier filter.
    pub vessel_field: String,
    /// Voyage field shown next to the vessel.
    pub voyage_field: String,

    /// Fields that hold per-record unique values.
    pub bulk_denylist: Vec<String>,
    /// What to do with drafts that do not parse.
    pub invalid_input: InvalidInputPolicy,
    /// Separator of displayed dates (`DD/MM/YYYY`).
    pub date_separator: char,
    /// Offset of local wall-clock input from UTC, in minutes.
    ///
    /// `None` uses the machine's local offset.
    pub utc_offset_minutes: Option<i32>,
    /// Text shown for empty cells.
    pub null_placeholder: String,
    /// Fields whose commits are flagged as refresh commits for the hooks.
    pub refresh_fields: Vec<String>,

    /// Middle-button auto-scroll physics.
    pub autoscroll: AutoScrollConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height_estimate: 40.0,
            padding_end: 20.0,
            overscan: Overscan::default(),
            fallback_column_width: 150,
            fixed_widths: BTreeMap::from([
                (fields::SHIPPER.to_string(), 250),
                (fields::NAVE_INICIAL.to_string(), 250),
                (fields::CONTRATO.to_string(), 300),
                (fields::BOOKING.to_string(), 230),
            ]),
            sticky_column: Some(fields::REF_CLIENTE.to_string()),
            always_visible: vec![
                fields::REF_ASLI.to_string(),
                fields::REF_CLIENTE.to_string(),
                fields::BOOKING.to_string(),
                fields::HISTORIAL.to_string(),
            ],
            hidden_by_default: vec![fields::ID.to_string()],
            auto_fit: AutoFitConfig::default(),
            default_sort: vec![SortKey::desc(fields::REF_ASLI)],
            status_field: fields::ESTADO.to_string(),
            statuses: vec![
                fields::status::CONFIRMED.to_string(),
                fields::status::PENDING.to_string(),
                fields::status::CANCELLED.to_string(),
            ],
            executive_field: fields::EJECUTIVO.to_string(),
            carrier_field: fields::NAVIERA.to_string(),
            vessel_field: fields::NAVE_INICIAL.to_string(),
            voyage_field: fields::VIAJE.to_string(),
            bulk_denylist: vec![fields::BOOKING.to_string(), fields::CONTENEDOR.to_string()],
            invalid_input: InvalidInputPolicy::default(),
            date_separator: '/',
            utc_offset_minutes: None,
            null_placeholder: "-".to_string(),
            refresh_fields: vec![
                fields::BOOKING.to_string(),
                fields::NAVE_INICIAL.to_string(),
                fields::VIAJE.to_string(),
                fields::NAVIERA.to_string(),
                fields::POL.to_string(),
                fields::POD.to_string(),
                fields::ETD.to_string(),
                fields::ESTADO.to_string(),
                fields::CONTENEDOR.to_string(),
                fields::REF_CLIENTE.to_string(),
            ],
            autoscroll: AutoScrollConfig::default(),
        }
    }
}

impl GridConfig {
    /// Configuration of the shipment grid.
    pub fn shipments() -> Self {
        Self::default()
    }

    /// Configuration of the transport grid.
    pub fn transports() -> Self {
        Self {
            fixed_widths: BTreeMap::new(),
            sticky_column: Some(fields::BOOKING.to_string()),
            always_visible: vec![fields::BOOKING.to_string()],
            default_sort: vec![SortKey::desc(fields::SEMANA)],
            carrier_field: fields::NAVIERA.to_string(),
            vessel_field: fields::NAVE.to_string(),
            voyage_field: String::new(),
            bulk_denylist: vec![fields::BOOKING.to_string(), fields::CONTENEDOR.to_string()],
            null_placeholder: "—".to_string(),
            refresh_fields: Vec::new(),
            ..Self::default()
        }
    }

    /// Returns `true` if the field may not be edited in bulk.
    pub fn is_bulk_denied(&self, field: &str) -> bool {
        self.bulk_denylist.iter().any(|f| f == field)
    }
}
