//! Filtering, sorting and the summary counters.
//!
//! Filters run in a fixed order: the executive filter narrows the loaded
//! records first, then every column filter and the global text must match.
//! The carrier filter is cross-referenced through the vessels each carrier
//! operates, see [`VesselCarrierIndex`].

mod carrier;
mod pipeline;
mod sort;

pub use carrier::*;
pub use pipeline::*;
pub use sort::*;

/// How a column's filter value is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterFn {
    /// Case-insensitive substring.
    #[default]
    Text,
    /// Whole-value equality.
    Exact,
    /// Carrier equality, or a vessel operated by one of the carriers.
    Carrier,
    /// The column cannot be filtered.
    None,
}

/// A column filter's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    /// Any of the values; an empty list matches everything.
    OneOf(Vec<String>),
}

impl FilterValue {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if the value filters nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::OneOf(values) => values.is_empty(),
        }
    }

    /// The wanted values, for set-based matching.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.trim()],
            Self::OneOf(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Every active filter of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    status_field: String,
    columns: Vec<(String, FilterValue)>,
    global: String,
    executive: Option<String>,
}

impl FilterState {
    /// Creates an empty filter state whose status pills filter `status_field`.
    pub fn new(status_field: impl Into<String>) -> Self {
        Self {
            status_field: status_field.into(),
            columns: Vec::new(),
            global: String::new(),
            executive: None,
        }
    }

    pub fn column_filters(&self) -> &[(String, FilterValue)] {
        &self.columns
    }

    pub fn column_filter(&self, column: &str) -> Option<&FilterValue> {
        self.columns
            .iter()
            .find(|(id, _)| id == column)
            .map(|(_, value)| value)
    }

    /// Sets or clears one column's filter, keeping the others in order.
    ///
    /// An empty value clears the filter.
    pub fn set_column_filter(&mut self, column: &str, value: Option<FilterValue>) {
        let value = value.filter(|v| !v.is_empty());
        let existing = self.columns.iter().position(|(id, _)| id == column);
        match (existing, value) {
            (Some(i), Some(value)) => self.columns[i].1 = value,
            (Some(i), None) => {
                self.columns.remove(i);
            }
            (None, Some(value)) => self.columns.push((column.to_string(), value)),
            (None, None) => {}
        }
    }

    /// The active status pill, if any.
    pub fn status(&self) -> Option<&str> {
        match self.column_filter(&self.status_field) {
            Some(FilterValue::Text(status)) => Some(status),
            _ => None,
        }
    }

    /// Activates a status pill, replacing any previous one; `None` shows
    /// every status.
    pub fn set_status(&mut self, status: Option<&str>) {
        let field = self.status_field.clone();
        self.set_column_filter(&field, status.map(FilterValue::from));
    }

    pub fn global(&self) -> &str {
        &self.global
    }

    pub fn set_global(&mut self, text: &str) {
        self.global = text.to_string();
    }

    pub fn executive(&self) -> Option<&str> {
        self.executive.as_deref()
    }

    pub fn set_executive(&mut self, executive: Option<&str>) {
        self.executive = executive
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
    }

    /// Returns `true` if any filter other than the status pill narrows the
    /// rows.
    pub fn has_panel_filters(&self) -> bool {
        self.columns.iter().any(|(id, _)| *id != self.status_field)
            || !self.global.trim().is_empty()
            || self.executive.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && !self.has_panel_filters()
    }

    /// Removes every filter.
    pub fn clear(&mut self) {
        self.columns.clear();
        self.global.clear();
        self.executive = None;
    }
}
