//! Row ordering.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::Value;

use crate::column::ColumnDef;
use crate::column::find_column;

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    #[serde(default)]
    pub desc: bool,
}

impl SortKey {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            desc: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            desc: true,
        }
    }
}

/// Active sort keys, most significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn set(&mut self, keys: Vec<SortKey>) {
        self.keys = keys;
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Direction of a column, if sorted.
    pub fn direction(&self, column: &str) -> Option<bool> {
        self.keys.iter().find(|k| k.column == column).map(|k| k.desc)
    }

    /// Header click: a sorted column flips direction, an unsorted one
    /// sorts ascending. Without `multi` the column becomes the only key.
    pub fn toggle(&mut self, column: &str, multi: bool) {
        let key = match self.keys.iter().find(|k| k.column == column) {
            Some(existing) => SortKey {
                column: column.to_string(),
                desc: !existing.desc,
            },
            None => SortKey::asc(column),
        };
        if multi {
            match self.keys.iter_mut().find(|k| k.column == column) {
                Some(existing) => *existing = key,
                None => self.keys.push(key),
            }
        } else {
            self.keys = vec![key];
        }
    }

    /// Stable-sorts row indices into `records`.
    ///
    /// Keys naming unknown or unsortable columns are ignored.
    pub fn sort(&self, rows: &mut [usize], records: &[Record], columns: &[ColumnDef]) {
        let keys: Vec<(&ColumnDef, bool)> = self
            .keys
            .iter()
            .filter_map(|key| {
                find_column(columns, &key.column)
                    .filter(|c| c.sortable)
                    .map(|c| (c, key.desc))
            })
            .collect();
        if keys.is_empty() {
            return;
        }

        rows.sort_by(|&a, &b| {
            keys.iter()
                .map(|(column, desc)| {
                    compare_values(&column.value(&records[a]), &column.value(&records[b]), *desc)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Compares two cell values for a sort direction.
///
/// Blank values go last in both directions. Numbers compare numerically,
/// everything else alphanumerically.
pub fn compare_values(a: &Value, b: &Value, desc: bool) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let ordering = match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => alphanumeric_cmp(&a.to_text(), &b.to_text()),
    };
    if desc { ordering.reverse() } else { ordering }
}

/// Case-insensitive comparison where digit runs compare as numbers.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use shipdeck_grid::filter::alphanumeric_cmp;
///
/// assert_eq!(alphanumeric_cmp("A2", "a10"), Ordering::Less);
/// assert_eq!(alphanumeric_cmp("B1", "a99"), Ordering::Greater);
/// ```
pub fn alphanumeric_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    let mut left = chunks(&a);
    let mut right = chunks(&b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_chunks(x, y);
                if ordering.is_ne() {
                    return ordering;
                }
            }
        }
    }
}

fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

fn compare_chunks(x: &str, y: &str) -> Ordering {
    let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if numeric(x) && numeric(y) {
        let (x, y) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
    } else {
        x.cmp(y)
    }
}
