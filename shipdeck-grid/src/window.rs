//! Row windowing.
//!
//! Only rows intersecting the viewport, plus an overscan margin, are
//! mounted. Everything else exists as spacer height above and below the
//! mounted slice. Row tops come from a cumulative-height table so lookups by
//! offset stay logarithmic; rows default to an estimated height until the
//! host reports a measurement.

use std::collections::HashMap;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::config::GridConfig;
use crate::scroll::ScrollRequest;
use crate::scroll::ScrollState;

/// How many rows to mount beyond each edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Overscan {
    /// Always the same margin.
    Fixed { rows: usize },
    /// `large` rows once the collection exceeds `threshold`, else `small`.
    Adaptive {
        threshold: usize,
        large: usize,
        small: usize,
    },
}

impl Default for Overscan {
    fn default() -> Self {
        Overscan::Adaptive {
            threshold: 50,
            large: 5,
            small: 10,
        }
    }
}

impl Overscan {
    /// Margin for a collection of `row_count` rows.
    pub fn rows(self, row_count: usize) -> usize {
        match self {
            Overscan::Fixed { rows } => rows,
            Overscan::Adaptive {
                threshold,
                large,
                small,
            } => {
                if row_count > threshold {
                    large
                } else {
                    small
                }
            }
        }
    }
}

/// The mounted slice of rows and the spacers around it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowWindow {
    /// Indices of mounted rows, contiguous within `[0, row_count)`.
    pub indices: Range<usize>,
    /// Height of the spacer above the first mounted row.
    pub padding_before: f64,
    /// Height of the spacer below the last mounted row, trailing pad included.
    pub padding_after: f64,
    /// Scrollable height of the whole collection.
    pub total_height: f64,
}

impl RowWindow {
    fn empty(total_height: f64) -> Self {
        Self {
            indices: 0..0,
            padding_before: 0.0,
            padding_after: total_height,
            total_height,
        }
    }

    /// Number of mounted rows.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if the row is mounted.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

/// Computes row windows for a collection of variable-height rows.
///
/// # Example
///
/// ```
/// use shipdeck_grid::scroll::ScrollState;
/// use shipdeck_grid::window::{Overscan, RowVirtualizer};
///
/// let mut rows = RowVirtualizer::new(40.0, Overscan::Fixed { rows: 2 }, 20.0);
/// rows.set_count(1_000);
///
/// let mut scroll = ScrollState::with_content(rows.total_height());
/// scroll.set_viewport(400.0);
/// scroll.apply_delta(4_000.0);
///
/// let window = rows.window(&scroll);
/// assert_eq!(window.indices, 98..112);
/// ```
#[derive(Debug, Clone)]
pub struct RowVirtualizer {
    estimate: f64,
    overscan: Overscan,
    padding_end: f64,
    count: usize,
    measured: HashMap<usize, f64>,
    /// offsets[i] = top of row i; offsets[count] = bottom of the last row.
    offsets: Vec<f64>,
}

impl RowVirtualizer {
    /// Creates a virtualizer for an empty collection.
    pub fn new(estimate: f64, overscan: Overscan, padding_end: f64) -> Self {
        Self {
            estimate: estimate.max(1.0),
            overscan,
            padding_end: padding_end.max(0.0),
            count: 0,
            measured: HashMap::new(),
            offsets: vec![0.0],
        }
    }

    /// Creates a virtualizer from the grid configuration.
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.row_height_estimate, config.overscan, config.padding_end)
    }

    /// Number of rows in the collection.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sets the row count, dropping measurements past the end.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count {
            return;
        }
        self.count = count;
        self.measured.retain(|&index, _| index < count);
        self.rebuild_from(0);
    }

    /// Forgets every measurement, e.g. after the row order changed.
    pub fn reset_measurements(&mut self) {
        if !self.measured.is_empty() {
            self.measured.clear();
            self.rebuild_from(0);
        }
    }

    /// Records the rendered height of a row.
    pub fn measure(&mut self, index: usize, height: f64) {
        if index >= self.count || height <= 0.0 {
            return;
        }
        if self.measured.get(&index) == Some(&height) {
            return;
        }
        self.measured.insert(index, height);
        self.rebuild_from(index);
    }

    fn rebuild_from(&mut self, index: usize) {
        let index = index.min(self.count);
        self.offsets.truncate(index + 1);
        if self.offsets.is_empty() {
            self.offsets.push(0.0);
        }
        let mut y = self.offsets[index];
        for i in index..self.count {
            y += self.row_height(i);
            self.offsets.push(y);
        }
    }

    /// Height of a row, measured or estimated.
    pub fn row_height(&self, index: usize) -> f64 {
        self.measured.get(&index).copied().unwrap_or(self.estimate)
    }

    /// Top of a row within the content.
    pub fn row_top(&self, index: usize) -> f64 {
        self.offsets[index.min(self.count)]
    }

    /// Scrollable height: every row plus the trailing pad.
    pub fn total_height(&self) -> f64 {
        self.offsets[self.count] + self.padding_end
    }

    /// Index of the row covering a content offset.
    pub fn row_at_offset(&self, y: f64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let index = self.offsets[1..].partition_point(|&bottom| bottom <= y);
        Some(index.min(self.count - 1))
    }

    /// Computes the mounted window for the current scroll state.
    pub fn window(&self, scroll: &ScrollState) -> RowWindow {
        let total_height = self.total_height();
        if self.count == 0 || scroll.viewport <= 0.0 {
            return RowWindow::empty(total_height);
        }

        let top = scroll.offset.max(0.0);
        let bottom = top + scroll.viewport;

        let first = self.offsets[1..]
            .partition_point(|&row_bottom| row_bottom <= top)
            .min(self.count - 1);
        let last = self.offsets[..self.count]
            .partition_point(|&row_top| row_top < bottom)
            .saturating_sub(1)
            .max(first);

        let overscan = self.overscan.rows(self.count);
        let start = first.saturating_sub(overscan);
        let end = (last + 1 + overscan).min(self.count);

        RowWindow {
            indices: start..end,
            padding_before: self.offsets[start],
            padding_after: total_height - self.offsets[end],
            total_height,
        }
    }

    /// Resolves a scroll request that needs row positions.
    ///
    /// Other requests are applied as-is.
    pub fn apply_request(&self, scroll: &mut ScrollState, request: ScrollRequest) {
        scroll.set_content(self.total_height());
        if let Some(ScrollRequest::IntoView(index)) = scroll.apply_request(request)
            && index < self.count
        {
            scroll.reveal(self.row_top(index), self.row_top(index + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn virtualizer(count: usize) -> RowVirtualizer {
        let mut v = RowVirtualizer::from_config(&GridConfig::default());
        v.set_count(count);
        v
    }

    fn scroll(v: &RowVirtualizer, viewport: f64, offset: f64) -> ScrollState {
        let mut s = ScrollState::with_content(v.total_height());
        s.set_viewport(viewport);
        s.apply_delta(offset);
        s
    }

    #[test]
    fn test_adaptive_overscan() {
        assert_eq!(Overscan::default().rows(51), 5);
        assert_eq!(Overscan::default().rows(50), 10);
    }

    #[test]
    fn test_small_collection_fits_entirely() {
        let v = virtualizer(8);
        let window = v.window(&scroll(&v, 800.0, 0.0));
        assert_eq!(window.indices, 0..8);
        assert_eq!(window.padding_before, 0.0);
        assert_eq!(window.padding_after, 20.0);
        assert_eq!(window.total_height, 340.0);
    }

    #[test]
    fn test_large_collection_mounts_a_slice() {
        let v = virtualizer(10_000);
        let window = v.window(&scroll(&v, 600.0, 40_000.0));
        // rows 1000..1015 visible, 5 rows of overscan each side
        assert_eq!(window.indices, 995..1020);
        assert_eq!(window.padding_before, 995.0 * 40.0);
    }

    #[test]
    fn test_spacers_and_rows_add_up() {
        let mut v = virtualizer(300);
        v.measure(120, 64.0);
        v.measure(121, 12.0);
        for offset in [0.0, 3_000.0, 4_790.0, 11_000.0, 50_000.0] {
            let window = v.window(&scroll(&v, 500.0, offset));
            let mounted: f64 = window.indices.clone().map(|i| v.row_height(i)).sum();
            assert!(window.indices.end <= 300);
            assert_eq!(
                window.padding_before + mounted + window.padding_after,
                window.total_height
            );
        }
    }

    #[test]
    fn test_empty_and_unlaid_out() {
        let v = virtualizer(0);
        assert!(v.window(&scroll(&v, 500.0, 0.0)).is_empty());

        let v = virtualizer(100);
        assert!(v.window(&ScrollState::new()).is_empty());
    }

    #[test]
    fn test_measure_shifts_following_rows() {
        let mut v = virtualizer(10);
        v.measure(2, 100.0);
        assert_eq!(v.row_top(3), 180.0);
        assert_eq!(v.row_at_offset(150.0), Some(2));
        assert_eq!(v.row_at_offset(180.0), Some(3));
        assert_eq!(v.total_height(), 9.0 * 40.0 + 100.0 + 20.0);
    }

    #[test]
    fn test_set_count_drops_stale_measurements() {
        let mut v = virtualizer(10);
        v.measure(9, 100.0);
        v.set_count(5);
        v.set_count(10);
        assert_eq!(v.row_height(9), 40.0);
    }

    #[test]
    fn test_scroll_into_view() {
        let v = virtualizer(1_000);
        let mut s = scroll(&v, 400.0, 0.0);
        v.apply_request(&mut s, ScrollRequest::IntoView(50));
        assert_eq!(s.offset, 51.0 * 40.0 - 400.0);
    }
}
