//! Row filtering and the summary counters.

use shipdeck_lib::model::Record;
use shipdeck_lib::model::Value;

use super::FilterFn;
use super::FilterState;
use super::FilterValue;
use super::VesselCarrierIndex;
use crate::column::ColumnDef;
use crate::column::find_column;

/// What the row filter needs besides the filter state.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub columns: &'a [ColumnDef],
    pub carriers: &'a VesselCarrierIndex,
    pub vessel_field: &'a str,
    pub executive_field: &'a str,
}

/// Indices of the records passing every filter, in load order.
pub fn filter_rows(records: &[Record], filters: &FilterState, ctx: &FilterContext<'_>) -> Vec<usize> {
    let global = filters.global().trim().to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            matches_executive(record, filters, ctx)
                && filters
                    .column_filters()
                    .iter()
                    .all(|(id, value)| matches_column(record, id, value, ctx))
                && (global.is_empty() || matches_global(record, &global, ctx.columns))
        })
        .map(|(i, _)| i)
        .collect()
}

fn matches_executive(record: &Record, filters: &FilterState, ctx: &FilterContext<'_>) -> bool {
    filters
        .executive()
        .is_none_or(|wanted| record.value(ctx.executive_field).to_text().trim() == wanted)
}

fn matches_column(record: &Record, id: &str, value: &FilterValue, ctx: &FilterContext<'_>) -> bool {
    let (cell, filter) = match find_column(ctx.columns, id) {
        Some(column) => (column.value(record), column.filter),
        None => (record.value(id).clone(), FilterFn::Text),
    };
    match filter {
        FilterFn::None => true,
        FilterFn::Text => match value {
            FilterValue::Text(text) => contains_ignore_case(&cell, &text.trim().to_lowercase()),
            FilterValue::OneOf(_) => equals_any(&cell, &value.values()),
        },
        FilterFn::Exact => equals_any(&cell, &value.values()),
        FilterFn::Carrier => ctx.carriers.matches(
            &value.values(),
            &cell.to_text(),
            &record.value(ctx.vessel_field).to_text(),
        ),
    }
}

fn matches_global(record: &Record, query: &str, columns: &[ColumnDef]) -> bool {
    columns
        .iter()
        .filter(|c| c.filter != FilterFn::None)
        .any(|column| contains_ignore_case(&column.value(record), query))
}

fn contains_ignore_case(cell: &Value, needle: &str) -> bool {
    cell.to_text().to_lowercase().contains(needle)
}

fn equals_any(cell: &Value, wanted: &[&str]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    match cell {
        Value::List(items) => items.iter().any(|item| wanted.contains(&item.trim())),
        _ => wanted.contains(&cell.to_text().trim()),
    }
}

/// Row totals shown above the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridCounts {
    /// Filtered rows when a panel filter is active, else every record.
    pub total: usize,
    /// Filtered rows per status, in configured order.
    pub by_status: Vec<(String, usize)>,
}

impl GridCounts {
    /// Counts `rows` (indices into `records`) per status.
    pub fn compute(
        records: &[Record],
        rows: &[usize],
        filters: &FilterState,
        status_field: &str,
        statuses: &[String],
    ) -> Self {
        let total = if filters.has_panel_filters() {
            rows.len()
        } else {
            records.len()
        };
        let by_status = statuses
            .iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .filter(|&&i| records[i].value(status_field).as_str() == Some(status.as_str()))
                    .count();
                (status.clone(), count)
            })
            .collect();
        Self { total, by_status }
    }

    pub fn status(&self, status: &str) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}
