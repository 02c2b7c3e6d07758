//! Column widths, visibility and the sticky column.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

use super::ColumnDef;
use super::measure::AutoFitConfig;
use super::measure::TextMeasure;
use super::measure::fit_width;
use crate::GridConfig;

/// Narrowest width a drag can produce when a column declares no minimum.
const MIN_DRAG_WIDTH: u32 = 40;

/// Lifecycle of the user size map.
///
/// Sizes persisted by an earlier session are handed to the layout before the
/// grid first mounts. Mounting discards them so a layout change between
/// sessions never leaves stale widths; only drags and auto-fits after that
/// populate the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizingState {
    #[default]
    Uninitialized,
    Ready,
}

/// Paint order of a cell. Later variants paint above earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Body,
    StickyBody,
    Header,
    StickyHeader,
}

impl Layer {
    pub fn z_index(self) -> u32 {
        match self {
            Layer::Body => 0,
            Layer::StickyBody => 240,
            Layer::Header => 250,
            Layer::StickyHeader => 260,
        }
    }
}

/// A visible column with its resolved geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub id: String,
    pub width: u32,
    /// Offset from the table's left edge.
    pub left: u32,
    pub sticky: bool,
}

impl ResolvedColumn {
    pub fn layer(&self, header: bool) -> Layer {
        match (header, self.sticky) {
            (false, false) => Layer::Body,
            (false, true) => Layer::StickyBody,
            (true, false) => Layer::Header,
            (true, true) => Layer::StickyHeader,
        }
    }

    /// Where the column is drawn for a horizontal scroll offset.
    pub fn rendered_left(&self, scroll_left: f64) -> f64 {
        let left = f64::from(self.left);
        if self.sticky { left.max(scroll_left) } else { left }
    }

    /// Whether the sticky column has content scrolled beneath it.
    pub fn shows_separator(&self, scroll_left: f64) -> bool {
        self.sticky && scroll_left > f64::from(self.left)
    }
}

/// Mutable column state: user widths, visibility and the container width.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    fixed: BTreeMap<String, u32>,
    fallback: u32,
    sticky: Option<String>,
    always_visible: HashSet<String>,
    hidden_by_default: HashSet<String>,
    auto_fit: AutoFitConfig,

    state: SizingState,
    sizing: HashMap<String, u32>,
    visibility: HashMap<String, bool>,
    container_width: u32,
}

impl ColumnLayout {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            fixed: config.fixed_widths.clone(),
            fallback: config.fallback_column_width,
            sticky: config.sticky_column.clone(),
            always_visible: config.always_visible.iter().cloned().collect(),
            hidden_by_default: config.hidden_by_default.iter().cloned().collect(),
            auto_fit: config.auto_fit.clone(),
            state: SizingState::Uninitialized,
            sizing: HashMap::new(),
            visibility: HashMap::new(),
            container_width: 0,
        }
    }

    pub fn state(&self) -> SizingState {
        self.state
    }

    /// First mount. Discards `persisted` and makes the size map writable.
    ///
    /// Returns `false` if the layout was already mounted.
    pub fn mount(&mut self, persisted: HashMap<String, u32>) -> bool {
        if self.state == SizingState::Ready {
            return false;
        }
        if !persisted.is_empty() {
            log::debug!("Discarding {} persisted column width(s)", persisted.len());
        }
        self.sizing.clear();
        self.state = SizingState::Ready;
        true
    }

    pub fn set_container_width(&mut self, width: u32) {
        self.container_width = width;
    }

    pub fn container_width(&self) -> u32 {
        self.container_width
    }

    /// User widths, for saving between sessions.
    pub fn sizing(&self) -> &HashMap<String, u32> {
        &self.sizing
    }

    /// Visibility overrides, for saving between sessions.
    pub fn visibility(&self) -> &HashMap<String, bool> {
        &self.visibility
    }

    /// Restores saved visibility overrides.
    pub fn restore_visibility(&mut self, visibility: HashMap<String, bool>) {
        self.visibility = visibility;
    }

    pub fn is_fixed(&self, id: &str) -> bool {
        self.fixed.contains_key(id)
    }

    /// Width of a column.
    ///
    /// Fixed widths always win, then a positive user width, then the
    /// declared default, minimum, and finally the fallback.
    pub fn width_of(&self, column: &ColumnDef) -> u32 {
        if let Some(&width) = self.fixed.get(&column.id) {
            return width;
        }
        if self.state == SizingState::Ready
            && let Some(&width) = self.sizing.get(&column.id)
            && width > 0
        {
            return width;
        }
        column
            .size
            .default
            .or(column.size.min)
            .unwrap_or(self.fallback)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        if self.always_visible.contains(id) {
            return true;
        }
        self.visibility
            .get(id)
            .copied()
            .unwrap_or_else(|| !self.hidden_by_default.contains(id))
    }

    /// Shows or hides a column. Always-visible columns ignore hiding.
    ///
    /// Returns `true` if visibility changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        if !visible && self.always_visible.contains(id) {
            return false;
        }
        let changed = self.is_visible(id) != visible;
        self.visibility.insert(id.to_string(), visible);
        changed
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let visible = !self.is_visible(id);
        self.set_visible(id, visible)
    }

    /// Shows or hides every hideable column.
    pub fn set_all_visible(&mut self, columns: &[ColumnDef], visible: bool) {
        for column in columns.iter().filter(|c| c.hideable) {
            self.set_visible(&column.id, visible);
        }
    }

    /// Visible columns with widths and offsets, in declaration order.
    pub fn resolve(&self, columns: &[ColumnDef]) -> Vec<ResolvedColumn> {
        let mut left = 0;
        columns
            .iter()
            .filter(|c| self.is_visible(&c.id))
            .map(|column| {
                let width = self.width_of(column);
                let resolved = ResolvedColumn {
                    id: column.id.clone(),
                    width,
                    left,
                    sticky: self.sticky.as_deref() == Some(column.id.as_str()),
                };
                left += width;
                resolved
            })
            .collect()
    }

    /// Width of the table: the container width or the columns' sum,
    /// whichever is larger.
    pub fn table_width(&self, columns: &[ColumnDef]) -> u32 {
        let sum: u32 = columns
            .iter()
            .filter(|c| self.is_visible(&c.id))
            .map(|c| self.width_of(c))
            .sum();
        sum.max(self.container_width)
    }

    /// Applies a drag delta to a column's width.
    ///
    /// Returns the new width, or `None` if the column cannot be resized or
    /// the layout is not mounted yet.
    pub fn resize_by(&mut self, column: &ColumnDef, delta: i32) -> Option<u32> {
        if self.state != SizingState::Ready || !column.resizable || self.is_fixed(&column.id) {
            return None;
        }
        let min = column.size.min.unwrap_or(MIN_DRAG_WIDTH);
        let max = column.size.max.unwrap_or(u32::MAX).max(min);
        let current = i64::from(self.width_of(column));
        let width = (current + i64::from(delta)).clamp(i64::from(min), i64::from(max));
        let width = u32::try_from(width).unwrap_or(min);
        self.sizing.insert(column.id.clone(), width);
        Some(width)
    }

    /// Sets a column's user width.
    pub fn set_width(&mut self, column: &ColumnDef, width: u32) -> Option<u32> {
        if self.state != SizingState::Ready || self.is_fixed(&column.id) {
            return None;
        }
        self.sizing.insert(column.id.clone(), width);
        Some(width)
    }

    /// Fits a column to its header and the given cell texts.
    ///
    /// Only the first rows, as configured, are measured. Fixed and
    /// non-resizable columns keep their width.
    pub fn auto_fit<I>(
        &mut self,
        column: &ColumnDef,
        cells: I,
        measure: &dyn TextMeasure,
    ) -> Option<u32>
    where
        I: IntoIterator<Item = String>,
    {
        if !column.resizable || self.is_fixed(&column.id) {
            return None;
        }
        let width = fit_width(&column.header, cells, measure, &self.auto_fit);
        self.set_width(column, width)
    }

    /// Forgets user widths and visibility overrides.
    pub fn reset(&mut self) {
        self.sizing.clear();
        self.visibility.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::MonospaceMeasure;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::field("refAsli", "REF ASLI").width(150).min_width(150),
            ColumnDef::field("refCliente", "Ref Externa").min_width(120),
            ColumnDef::field("booking", "Booking").min_width(120),
            ColumnDef::field("pol", "POL"),
            ColumnDef::field("id", "ID"),
        ]
    }

    fn mounted() -> ColumnLayout {
        let mut layout = ColumnLayout::from_config(&GridConfig::default());
        layout.mount(HashMap::new());
        layout
    }

    #[test]
    fn test_width_resolution() {
        let mut layout = mounted();
        let cols = columns();
        assert_eq!(layout.width_of(&cols[0]), 150);
        assert_eq!(layout.width_of(&cols[1]), 120);
        assert_eq!(layout.width_of(&cols[2]), 230);
        assert_eq!(layout.width_of(&cols[3]), 150);

        layout.set_width(&cols[3], 0);
        assert_eq!(layout.width_of(&cols[3]), 150);
        assert_eq!(layout.set_width(&cols[2], 400), None);
        assert_eq!(layout.width_of(&cols[2]), 230);
    }

    #[test]
    fn test_mount_discards_persisted_sizes() {
        let mut layout = ColumnLayout::from_config(&GridConfig::default());
        let cols = columns();
        assert_eq!(layout.resize_by(&cols[3], 30), None);

        assert!(layout.mount(HashMap::from([("pol".to_string(), 500)])));
        assert_eq!(layout.state(), SizingState::Ready);
        assert_eq!(layout.width_of(&cols[3]), 150);
        assert!(!layout.mount(HashMap::new()));

        assert_eq!(layout.resize_by(&cols[3], 30), Some(180));
        assert_eq!(layout.resize_by(&cols[3], -500), Some(MIN_DRAG_WIDTH));
    }

    #[test]
    fn test_resolve_sticky_and_hidden() {
        let mut layout = mounted();
        layout.set_container_width(2_000);
        let resolved = layout.resolve(&columns());

        let ids: Vec<_> = resolved.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["refAsli", "refCliente", "booking", "pol"]);
        let sticky = &resolved[1];
        assert!(sticky.sticky);
        assert_eq!(sticky.left, 150);
        assert_eq!(sticky.rendered_left(400.0), 400.0);
        assert!(sticky.shows_separator(400.0));
        assert!(!sticky.shows_separator(0.0));
        assert_eq!(resolved[3].rendered_left(400.0), 500.0);
        assert!(sticky.layer(true) > resolved[0].layer(true));
        assert!(resolved[0].layer(true) > sticky.layer(false));
        assert_eq!(layout.table_width(&columns()), 2_000);

        layout.set_container_width(300);
        assert_eq!(layout.table_width(&columns()), 650);
    }

    #[test]
    fn test_visibility_rules() {
        let mut layout = mounted();
        assert!(!layout.set_visible("refAsli", false));
        assert!(layout.is_visible("refAsli"));
        assert!(!layout.is_visible("id"));
        assert!(layout.toggle("id"));
        assert!(layout.is_visible("id"));

        layout.set_all_visible(&columns(), false);
        assert!(layout.is_visible("booking"));
        assert!(!layout.is_visible("pol"));

        layout.reset();
        assert!(layout.is_visible("pol"));
        assert!(!layout.is_visible("id"));
    }

    #[test]
    fn test_auto_fit_is_clamped() {
        let mut layout = mounted();
        let cols = columns();
        let measure = MonospaceMeasure::default();

        let width = layout
            .auto_fit(&cols[3], vec!["VALPARAISO".to_string()], &measure)
            .unwrap();
        assert_eq!(width, 120);

        let long = "X".repeat(200);
        let width = layout.auto_fit(&cols[3], vec![long], &measure).unwrap();
        assert_eq!(width, 600);
        assert_eq!(layout.width_of(&cols[3]), 600);
    }

    #[test]
    fn test_auto_fit_skips_unresizable_columns() {
        let mut layout = mounted();
        let history = ColumnDef::field("historial", "Historial").width(90).unresizable();
        let measure = MonospaceMeasure::default();

        let before = layout.width_of(&history);
        let width = layout.auto_fit(&history, vec!["X".repeat(80)], &measure);
        assert_eq!(width, None);
        assert_eq!(layout.width_of(&history), before);
    }
}
