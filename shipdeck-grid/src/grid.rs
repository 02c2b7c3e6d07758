//! The record grid.
//!
//! [`RecordGrid`] composes the engine: it owns the record cache and every
//! piece of view state, keeps the filtered and sorted row order current, and
//! drives the edit session against the store. Store calls are its only
//! suspension points.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::FixedOffset;
use shipdeck_lib::CatalogCache;
use shipdeck_lib::WriteQueue;
use shipdeck_lib::derived::split_multi_value;
use shipdeck_lib::error::StoreError;
use shipdeck_lib::hooks::CommitHook;
use shipdeck_lib::model::Record;
use shipdeck_lib::model::RecordId;
use shipdeck_lib::model::RecordKind;
use shipdeck_lib::model::Value;
use shipdeck_lib::store::CatalogSource;
use shipdeck_lib::store::RecordStore;

use crate::GridConfig;
use crate::autoscroll::AutoScroll;
use crate::autoscroll::PointerButton;
use crate::bulk;
use crate::bulk::BulkReport;
use crate::cache::RecordCache;
use crate::column::ColumnDef;
use crate::column::ColumnLayout;
use crate::column::FormatContext;
use crate::column::ResolvedColumn;
use crate::column::TextMeasure;
use crate::column::find_column;
use crate::edit::ActiveEdit;
use crate::edit::CellState;
use crate::edit::CommitOutcome;
use crate::edit::EditCapabilities;
use crate::edit::EditSession;
use crate::edit::EditTarget;
use crate::edit::EditorKind;
use crate::edit::Handoff;
use crate::edit::OptionSource;
use crate::edit::PendingCommit;
use crate::edit::Persister;
use crate::edit::PreviousOutcome;
use crate::edit::Release;
use crate::edit::commit_patch;
use crate::error::BulkEditError;
use crate::error::EditError;
use crate::filter::CarrierIndexMemo;
use crate::filter::FilterContext;
use crate::filter::FilterState;
use crate::filter::FilterValue;
use crate::filter::GridCounts;
use crate::filter::SortKey;
use crate::filter::SortState;
use crate::filter::alphanumeric_cmp;
use crate::filter::filter_rows;
use crate::filter::filterable_vessels;
use crate::scroll::ScrollRequest;
use crate::scroll::ScrollState;
use crate::selection::SelectAllScope;
use crate::selection::Selection;
use crate::window::RowVirtualizer;
use crate::window::RowWindow;

// =============================================================================
// View
// =============================================================================

/// One cell of a mounted row.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub column: String,
    pub text: String,
    pub state: CellState,
    /// Draft and inline error while the cell is open.
    pub draft: Option<String>,
    pub error: Option<String>,
    /// The cell is part of a multi-selection a commit would apply to.
    pub bulk: bool,
}

/// One mounted row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    /// Position in the filtered, sorted row order.
    pub index: usize,
    pub id: RecordId,
    pub top: f64,
    pub height: f64,
    pub selected: bool,
    pub cells: Vec<CellView>,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub window: RowWindow,
    pub columns: Vec<ResolvedColumn>,
    pub table_width: u32,
    pub scroll_left: f64,
    pub rows: Vec<RowView>,
    pub counts: GridCounts,
    pub select_all: SelectAllScope,
}

// =============================================================================
// RecordGrid
// =============================================================================

/// An editable, virtualized grid over one record table.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(MemoryStore::new().with_records(records));
/// let mut grid = RecordGrid::new(
///     RecordKind::Shipment,
///     GridConfig::shipments(),
///     shipment_columns(),
///     store.clone(),
///     store,
/// )
/// .with_capabilities(EditCapabilities::editor());
///
/// grid.reload().await?;
/// grid.set_viewport(1_280.0, 720.0);
/// grid.request_edit(RecordId::from("r-1"), "naviera").await?;
/// grid.edit_input("ONE")?;
/// grid.commit_edit().await?;
/// ```
pub struct RecordGrid {
    kind: RecordKind,
    config: GridConfig,
    columns: Vec<ColumnDef>,
    cache: RecordCache,
    /// Filtered, sorted indices into the cache.
    rows: Vec<usize>,

    layout: ColumnLayout,
    filters: FilterState,
    sort: SortState,
    carriers: CarrierIndexMemo,
    selection: Selection,

    virtualizer: RowVirtualizer,
    vertical: ScrollState,
    horizontal: ScrollState,
    autoscroll: AutoScroll,

    session: EditSession,
    capabilities: EditCapabilities,
    persister: Persister,
    catalogs: CatalogCache,
    format: FormatContext,
}

impl RecordGrid {
    /// Creates an empty grid. Editing is off until capabilities are given.
    pub fn new(
        kind: RecordKind,
        config: GridConfig,
        columns: Vec<ColumnDef>,
        store: Arc<dyn RecordStore>,
        catalogs: Arc<dyn CatalogSource>,
    ) -> Self {
        let persister = Persister::new(store).with_refresh_fields(config.refresh_fields.clone());
        Self {
            kind,
            cache: RecordCache::new(kind),
            rows: Vec::new(),
            layout: ColumnLayout::from_config(&config),
            filters: FilterState::new(config.status_field.clone()),
            sort: SortState::new(config.default_sort.clone()),
            carriers: CarrierIndexMemo::new(),
            selection: Selection::new(),
            virtualizer: RowVirtualizer::from_config(&config),
            vertical: ScrollState::new(),
            horizontal: ScrollState::new(),
            autoscroll: AutoScroll::new(config.autoscroll.clone()),
            session: EditSession::new(),
            capabilities: EditCapabilities::viewer(),
            persister,
            catalogs: CatalogCache::new(catalogs),
            format: FormatContext::from_config(&config),
            columns,
            config,
        }
    }

    pub fn with_capabilities(mut self, capabilities: EditCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Registers a hook run after every successful commit.
    ///
    /// Commits of the configured refresh fields are flagged on the event.
    pub fn with_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
        self.persister = self.persister.with_hook(hook);
        self
    }

    /// Shares a write queue with other grids over the same store.
    pub fn with_queue(mut self, queue: WriteQueue) -> Self {
        self.persister = self.persister.with_queue(queue);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn capabilities(&self) -> &EditCapabilities {
        &self.capabilities
    }

    fn offset(&self) -> FixedOffset {
        self.format.offset
    }

    // -------------------------------------------------------------------------
    // Records and rows
    // -------------------------------------------------------------------------

    /// Loads every record of the grid's kind from the store.
    ///
    /// Clears the selection. Returns the number of records loaded.
    pub async fn reload(&mut self) -> Result<usize, StoreError> {
        let records = self.persister.store().load(self.kind).await?;
        self.selection.clear();
        self.set_records(records);
        log::info!("Loaded {} {} record(s)", self.cache.len(), self.kind);
        Ok(self.cache.len())
    }

    /// Replaces the records.
    ///
    /// Selected ids that are gone are dropped; an open cell on a vanished
    /// record is cancelled.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.cache.replace(records);
        let cache = &self.cache;
        self.selection.retain(|id| cache.contains(id));
        if self
            .session
            .target()
            .is_some_and(|t| !self.cache.contains(&t.record))
        {
            self.session.cancel();
        }
        self.refresh_rows();
    }

    pub fn records(&self) -> &[Record] {
        self.cache.records()
    }

    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.cache.get(id)
    }

    /// Number of rows passing the filters.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Record at a position of the row order.
    pub fn row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index).map(|&i| &self.cache.records()[i])
    }

    /// Records passing the filters, in row order.
    pub fn visible_records(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().map(|&i| &self.cache.records()[i])
    }

    /// Ids of the records passing the filters, in row order.
    pub fn row_ids(&self) -> Vec<RecordId> {
        self.visible_records().map(|r| r.id().clone()).collect()
    }

    /// Position of a record in the row order.
    pub fn row_index(&self, id: &RecordId) -> Option<usize> {
        let position = self.cache.position(id)?;
        self.rows.iter().position(|&i| i == position)
    }

    fn refresh_rows(&mut self) {
        let carriers = self.carriers.get(
            &self.cache,
            &self.config.vessel_field,
            &self.config.carrier_field,
        );
        let ctx = FilterContext {
            columns: &self.columns,
            carriers,
            vessel_field: &self.config.vessel_field,
            executive_field: &self.config.executive_field,
        };
        let mut rows = filter_rows(self.cache.records(), &self.filters, &ctx);
        self.sort.sort(&mut rows, self.cache.records(), &self.columns);

        if rows != self.rows {
            self.virtualizer.reset_measurements();
        }
        self.rows = rows;
        self.virtualizer.set_count(self.rows.len());
        self.vertical.set_content(self.virtualizer.total_height());
    }

    /// Distinct non-blank values of a field across every loaded record,
    /// lists split into items.
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values: Vec<String> = self
            .cache
            .iter()
            .flat_map(|r| match r.value(field) {
                list @ Value::List(_) => split_multi_value(list),
                value => vec![value.to_text().trim().to_string()],
            })
            .filter(|v| !v.is_empty() && seen.insert(v.clone()))
            .collect();
        values.sort_by(|a, b| alphanumeric_cmp(a, b));
        values
    }

    // -------------------------------------------------------------------------
    // Filters and sort
    // -------------------------------------------------------------------------

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_column_filter(&mut self, column: &str, value: Option<FilterValue>) {
        self.filters.set_column_filter(column, value);
        self.refresh_rows();
    }

    /// Activates a status pill; `None` shows every status.
    pub fn set_status_filter(&mut self, status: Option<&str>) {
        self.filters.set_status(status);
        self.refresh_rows();
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.filters.set_global(text);
        self.refresh_rows();
    }

    pub fn set_executive_filter(&mut self, executive: Option<&str>) {
        self.filters.set_executive(executive);
        self.refresh_rows();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refresh_rows();
    }

    /// Summary counters for the current filters.
    pub fn counts(&self) -> GridCounts {
        GridCounts::compute(
            self.cache.records(),
            &self.rows,
            &self.filters,
            &self.config.status_field,
            &self.config.statuses,
        )
    }

    /// Vessels for the filter panel: `(raw name, display name)`.
    pub fn filterable_vessels(&self) -> Vec<(String, String)> {
        filterable_vessels(
            self.cache.iter(),
            &self.config.vessel_field,
            &self.config.voyage_field,
        )
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        self.sort.keys()
    }

    /// Header click on a column.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) {
        if find_column(&self.columns, column).is_some_and(|c| c.sortable) {
            self.sort.toggle(column, multi);
            self.refresh_rows();
        }
    }

    pub fn set_sort(&mut self, keys: Vec<SortKey>) {
        self.sort.set(keys);
        self.refresh_rows();
    }

    /// Restores the default sort, column sizes and visibility, and clears
    /// filters and selection.
    pub fn reset(&mut self) {
        self.sort.set(self.config.default_sort.clone());
        self.layout.reset();
        self.filters.clear();
        self.selection.clear();
        self.session.cancel();
        self.refresh_rows();
        self.sync_horizontal();
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// First mount of the grid; persisted sizes are discarded.
    pub fn mount(&mut self, persisted_sizes: HashMap<String, u32>) {
        self.layout.mount(persisted_sizes);
        self.sync_horizontal();
    }

    pub fn restore_visibility(&mut self, visibility: HashMap<String, bool>) {
        self.layout.restore_visibility(visibility);
        self.sync_horizontal();
    }

    pub fn resolved_columns(&self) -> Vec<ResolvedColumn> {
        self.layout.resolve(&self.columns)
    }

    pub fn table_width(&self) -> u32 {
        self.layout.table_width(&self.columns)
    }

    /// Applies a resize-handle drag delta.
    pub fn resize_column(&mut self, id: &str, delta: i32) -> Option<u32> {
        let column = find_column(&self.columns, id)?;
        let width = self.layout.resize_by(column, delta);
        self.sync_horizontal();
        width
    }

    /// Double-click auto-fit over the first rows of the current order.
    pub fn auto_fit_column(&mut self, id: &str, measure: &dyn TextMeasure) -> Option<u32> {
        let column = find_column(&self.columns, id)?;
        let cells: Vec<String> = self
            .visible_records()
            .take(self.config.auto_fit.sample_rows)
            .map(|r| column.format.render(&column.value(r), r, &self.format))
            .collect();
        let width = self.layout.auto_fit(column, cells, measure);
        self.sync_horizontal();
        width
    }

    pub fn toggle_column(&mut self, id: &str) -> bool {
        let changed = self.layout.toggle(id);
        self.sync_horizontal();
        changed
    }

    pub fn set_column_visible(&mut self, id: &str, visible: bool) -> bool {
        let changed = self.layout.set_visible(id, visible);
        self.sync_horizontal();
        changed
    }

    pub fn set_all_columns_visible(&mut self, visible: bool) {
        self.layout.set_all_visible(&self.columns, visible);
        self.sync_horizontal();
    }

    fn sync_horizontal(&mut self) {
        let width = self.layout.table_width(&self.columns);
        self.horizontal.set_content(f64::from(width));
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    /// Sets the viewport size in pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.layout.set_container_width(width.max(0.0) as u32);
        self.horizontal.set_viewport(width);
        self.vertical.set_viewport(height);
        self.sync_horizontal();
    }

    pub fn vertical_scroll(&self) -> &ScrollState {
        &self.vertical
    }

    pub fn horizontal_scroll(&self) -> &ScrollState {
        &self.horizontal
    }

    /// Applies a vertical scroll request.
    pub fn scroll(&mut self, request: ScrollRequest) {
        self.virtualizer.apply_request(&mut self.vertical, request);
    }

    /// Applies a horizontal scroll delta.
    pub fn scroll_horizontally(&mut self, delta: f64) {
        self.horizontal.apply_delta(delta);
    }

    /// Scrolls the least distance that shows a row.
    pub fn scroll_into_view(&mut self, index: usize) {
        self.scroll(ScrollRequest::IntoView(index));
    }

    /// Applies requests queued on the scroll states since the last frame.
    pub fn process_scroll_requests(&mut self) {
        if let Some(request) = self.vertical.take_request() {
            self.scroll(request);
        }
        if let Some(request) = self.horizontal.take_request() {
            self.horizontal.apply_request(request);
        }
    }

    /// Reports the rendered height of a row.
    pub fn measure_row(&mut self, index: usize, height: f64) {
        self.virtualizer.measure(index, height);
        self.vertical.set_content(self.virtualizer.total_height());
    }

    /// Rows to mount for the current scroll position.
    pub fn window(&self) -> RowWindow {
        self.virtualizer.window(&self.vertical)
    }

    // -------------------------------------------------------------------------
    // Auto-scroll
    // -------------------------------------------------------------------------

    pub fn autoscroll(&self) -> &AutoScroll {
        &self.autoscroll
    }

    /// Returns `true` if the press was consumed by auto-scroll.
    pub fn pointer_press(&mut self, button: PointerButton, x: f64, y: f64) -> bool {
        self.autoscroll.press(button, x, y)
    }

    pub fn pointer_release(&mut self, button: PointerButton) {
        self.autoscroll.release(button);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.autoscroll.pointer_move(x, y);
    }

    /// Escape closes auto-scroll first, then the open cell.
    pub fn escape(&mut self) -> Option<EditTarget> {
        if self.autoscroll.is_armed() {
            self.autoscroll.escape();
            return None;
        }
        self.cancel_edit()
    }

    /// Advances auto-scroll one frame. Returns `true` while armed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.autoscroll
            .tick(now_ms, &mut self.horizontal, &mut self.vertical)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggles one row. Returns `true` if it is now selected.
    pub fn toggle_selected(&mut self, id: &RecordId) -> bool {
        if !self.cache.contains(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    /// Shift-click: selects the visible rows from the anchor to `id`.
    pub fn select_range(&mut self, id: &RecordId) -> usize {
        let ordered = self.row_ids();
        self.selection.range_select(id, &ordered)
    }

    /// Header checkbox over the rows passing the filters.
    pub fn toggle_select_all(&mut self) -> SelectAllScope {
        let visible = self.row_ids();
        self.selection.toggle_all(&visible);
        self.select_all_scope()
    }

    /// What the header checkbox covers.
    pub fn select_all_scope(&self) -> SelectAllScope {
        SelectAllScope::new(self.rows.len(), self.cache.len())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -------------------------------------------------------------------------
    // Inline editing
    // -------------------------------------------------------------------------

    pub fn active_edit(&self) -> Option<&ActiveEdit> {
        self.session.active()
    }

    pub fn cell_state(&self, record: &RecordId, field: &str) -> CellState {
        self.session.state_of(record, field)
    }

    /// Returns the editor of a field if the current user may edit it.
    pub fn editor_for(&self, field: &str) -> Result<EditorKind, EditError> {
        find_column(&self.columns, field)
            .filter(|c| c.is_editable() && self.capabilities.allows(self.kind, field))
            .and_then(|c| c.editor.clone())
            .ok_or_else(|| EditError::not_editable(field))
    }

    /// Parses text for a field the way its editor would.
    pub fn parse_input(&self, field: &str, text: &str) -> Result<Value, EditError> {
        let editor = self.editor_for(field)?;
        let parsed = editor.parse(&editor.mask(text), self.offset());
        self.config.invalid_input.resolve(parsed)
    }

    /// Opens a cell for editing.
    ///
    /// Whatever cell is open is resolved first: a changed draft is saved
    /// (and awaited), an unchanged one is cancelled. The new cell is opened
    /// even when that save fails; the failure is in the returned
    /// [`Handoff`]. A cell that may not be edited leaves everything as is.
    pub async fn request_edit(
        &mut self,
        record: impl Into<RecordId>,
        field: &str,
    ) -> Result<Handoff, EditError> {
        let record = record.into();
        let editor = self.editor_for(field)?;
        if !self.cache.contains(&record) {
            return Err(EditError::UnknownRecord(record));
        }
        let target = EditTarget::new(record, field);
        let options = self.options_for(field, &editor).await;
        if self.session.target() == Some(&target) {
            return Ok(Handoff {
                previous: None,
                granted: target,
                options,
            });
        }

        let offset = self.offset();
        let previous = match self.session.release(self.config.invalid_input, offset) {
            Release::Nothing => None,
            Release::Cancelled(t) => Some(PreviousOutcome::Cancelled(t)),
            Release::Detached(t) => Some(PreviousOutcome::Detached(t)),
            Release::Commit(pending) => {
                let released = pending.target.clone();
                Some(match self.write_pending(pending).await {
                    Ok(CommitOutcome::Bulk(report)) if !report.is_complete() => {
                        PreviousOutcome::Failed {
                            target: released,
                            message: format!("{} record(s) not updated", report.failed.len()),
                        }
                    }
                    Ok(_) => PreviousOutcome::Saved(released),
                    Err(e) => {
                        log::warn!("Saving {released} before switching cells failed: {e}");
                        PreviousOutcome::Failed {
                            target: released,
                            message: e.to_string(),
                        }
                    }
                })
            }
        };

        let value = self
            .cache
            .get(&target.record)
            .map(|r| r.value(field).clone())
            .ok_or_else(|| EditError::UnknownRecord(target.record.clone()))?;
        let seed = editor.seed(&value, offset, self.config.date_separator);
        self.session.grant(target.clone(), editor, seed)?;
        Ok(Handoff {
            previous,
            granted: target,
            options,
        })
    }

    /// Replaces the open cell's draft. Returns the masked draft.
    pub fn edit_input(&mut self, raw: &str) -> Result<String, EditError> {
        self.session.input(raw).map(str::to_string)
    }

    /// Closes the open cell without saving.
    pub fn cancel_edit(&mut self) -> Option<EditTarget> {
        self.session.cancel()
    }

    /// Saves the open cell.
    ///
    /// An unchanged draft closes the cell without writing. A commit on a
    /// record that is part of a multi-selection applies to the whole
    /// selection unless the field is bulk-denied. On failure the cell stays
    /// open with the draft and an inline error.
    pub async fn commit_edit(&mut self) -> Result<CommitOutcome, EditError> {
        let target = self.session.target().cloned().ok_or(EditError::NoActiveEdit)?;
        let offset = self.offset();
        let Some(pending) = self
            .session
            .begin_save(self.config.invalid_input, offset)?
        else {
            return Ok(CommitOutcome::Unchanged(target));
        };

        let result = self.write_pending(pending).await;
        match &result {
            Ok(_) => self.session.complete_save(&target, Ok(())),
            Err(e) => self.session.complete_save(&target, Err(e.to_string())),
        };
        result
    }

    fn routes_to_bulk(&self, target: &EditTarget) -> bool {
        self.selection.len() > 1
            && self.selection.is_selected(&target.record)
            && bulk::allows_bulk(&self.config, &target.field)
    }

    async fn write_pending(&mut self, pending: PendingCommit) -> Result<CommitOutcome, EditError> {
        let PendingCommit { target, value } = pending;
        if self.routes_to_bulk(&target) {
            let report = self.bulk_edit(&target.field, value).await?;
            return Ok(CommitOutcome::Bulk(report));
        }

        let previous = self
            .cache
            .get(&target.record)
            .cloned()
            .ok_or_else(|| EditError::UnknownRecord(target.record.clone()))?;
        let patch = commit_patch(&previous, &target.field, value);
        let current = self.persister.write(&previous, &patch).await?;
        let value = current.value(&target.field).clone();
        log::debug!("Saved {target}");

        self.cache.put(current);
        self.refresh_rows();
        Ok(CommitOutcome::Saved { target, value })
    }

    async fn options_for(&self, field: &str, editor: &EditorKind) -> Arc<Vec<String>> {
        match editor {
            EditorKind::Select { options } => match options {
                OptionSource::Static(options) => Arc::new(options.clone()),
                OptionSource::Catalog(name) => self.catalogs.options(name).await,
                OptionSource::Distinct => Arc::new(self.distinct_values(field)),
            },
            _ => Arc::new(Vec::new()),
        }
    }

    /// Waits for commit hooks still running in the background.
    pub async fn settle_hooks(&self) {
        self.persister.settle_hooks().await;
    }

    // -------------------------------------------------------------------------
    // Bulk editing
    // -------------------------------------------------------------------------

    /// Returns `true` if the field offers bulk editing.
    pub fn allows_bulk(&self, field: &str) -> bool {
        bulk::allows_bulk(&self.config, field)
    }

    /// Writes one value to every selected record.
    ///
    /// Successful records are updated in the cache and the selection is
    /// cleared. A denied field is rejected before anything is written.
    pub async fn bulk_edit(&mut self, field: &str, value: Value) -> Result<BulkReport, BulkEditError> {
        if !find_column(&self.columns, field).is_some_and(|c| c.is_editable()) {
            return Err(BulkEditError::NotEditable(field.to_string()));
        }
        let plan = bulk::plan(
            &self.config,
            &self.capabilities,
            &self.cache,
            &self.selection,
            field,
            value,
        )?;
        let (report, records) = bulk::execute(&plan, &self.cache, &self.persister).await;
        for record in records {
            self.cache.put(record);
        }
        self.selection.clear();
        self.refresh_rows();
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Frame
    // -------------------------------------------------------------------------

    /// Builds the view of the mounted rows.
    pub fn view(&self) -> GridView {
        let window = self.window();
        let columns = self.resolved_columns();
        let multi = self.selection.len() > 1;

        let rows = window
            .indices
            .clone()
            .filter_map(|index| {
                let record = self.row(index)?;
                let selected = self.selection.is_selected(record.id());
                let cells = columns
                    .iter()
                    .filter_map(|resolved| find_column(&self.columns, &resolved.id))
                    .map(|column| self.cell_view(record, column, selected && multi))
                    .collect();
                Some(RowView {
                    index,
                    id: record.id().clone(),
                    top: self.virtualizer.row_top(index),
                    height: self.virtualizer.row_height(index),
                    selected,
                    cells,
                })
            })
            .collect();

        GridView {
            window,
            table_width: self.table_width(),
            scroll_left: self.horizontal.offset,
            columns,
            rows,
            counts: self.counts(),
            select_all: self.select_all_scope(),
        }
    }

    fn cell_view(&self, record: &Record, column: &ColumnDef, in_multi_selection: bool) -> CellView {
        let state = self.session.state_of(record.id(), &column.id);
        let (draft, error) = match (state, self.session.active()) {
            (CellState::Idle, _) | (_, None) => (None, None),
            (_, Some(active)) => (Some(active.draft.clone()), active.error.clone()),
        };
        CellView {
            column: column.id.clone(),
            text: column.format.render(&column.value(record), record, &self.format),
            state,
            draft,
            error,
            bulk: in_multi_selection && column.is_editable() && self.allows_bulk(&column.id),
        }
    }
}
