//! Display text of cells.

use chrono::FixedOffset;
use shipdeck_lib::derived::split_multi_value;
use shipdeck_lib::derived::split_vessel_voyage;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::Value;

use crate::GridConfig;
use crate::edit;

/// How a cell value is turned into text.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellFormat {
    #[default]
    Text,
    /// Multi-value field shown space separated.
    List,
    /// Number with an optional unit suffix.
    Number { unit: Option<String> },
    /// Stored date shown `DD/MM/YYYY`.
    Date,
    /// Stored UTC timestamp shown in local time.
    DateTime,
    /// `Sí` / `No`.
    Bool,
    /// Vessel name followed by the voyage in brackets.
    VesselVoyage { voyage_field: String },
}

impl CellFormat {
    pub fn unit(unit: impl Into<String>) -> Self {
        Self::Number {
            unit: Some(unit.into()),
        }
    }

    pub fn vessel(voyage_field: impl Into<String>) -> Self {
        Self::VesselVoyage {
            voyage_field: voyage_field.into(),
        }
    }

    /// Renders a value of `record`.
    pub fn render(&self, value: &Value, record: &Record, ctx: &FormatContext) -> String {
        if value.is_blank() {
            return ctx.placeholder.clone();
        }
        let text = value.to_text();
        match self {
            Self::Text => text,
            Self::List => split_multi_value(value).join(" "),
            Self::Number { unit } => match unit {
                Some(unit) => format!("{text}{unit}"),
                None => text,
            },
            Self::Date => edit::display_date(&text, ctx.date_separator).unwrap_or(text),
            Self::DateTime => {
                edit::display_datetime(&text, ctx.offset, ctx.date_separator).unwrap_or(text)
            }
            Self::Bool => match value {
                Value::Bool(true) => "Sí".to_string(),
                Value::Bool(false) => "No".to_string(),
                _ => text,
            },
            Self::VesselVoyage { voyage_field } => {
                let (name, voyage) = split_vessel_voyage(&text);
                let voyage = voyage.or_else(|| {
                    let v = record.value(voyage_field).to_text();
                    (!v.trim().is_empty()).then(|| v.trim().to_string())
                });
                match voyage {
                    Some(voyage) => format!("{name} [{voyage}]"),
                    None => name,
                }
            }
        }
    }
}

/// Settings shared by every rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatContext {
    pub placeholder: String,
    pub date_separator: char,
    pub offset: FixedOffset,
}

impl FormatContext {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            placeholder: config.null_placeholder.clone(),
            date_separator: config.date_separator,
            offset: edit::offset_from_minutes(config.utc_offset_minutes),
        }
    }
}
