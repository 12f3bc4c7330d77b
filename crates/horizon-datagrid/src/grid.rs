//! The grid facade.
//!
//! [`DataGrid`] owns the row set, the column declarations and every state
//! machine, and exposes the entry points a rendering collaborator drives:
//! filter edits, sort clicks, scrolling, selection, editing, drag gestures
//! and infinite loading. Each state change invalidates the cached pipeline
//! output; [`DataGrid::view`] recomputes it on demand in the fixed order
//! Filter -> Quick filter -> Sort -> (Group | Page + Window).
//!
//! All processing is synchronous on the caller's thread. The only
//! asynchronous boundary is the load-more future returned by
//! [`DataGrid::on_scroll`], which the host awaits.

use std::sync::Arc;

use parking_lot::RwLock;

use horizon_datagrid_core::Signal;

use crate::editing::{EditController, EditSession};
use crate::error::{GridError, GridResult};
use crate::interaction::InteractionController;
use crate::loader::{LoadCoordinator, LoadMoreFn, PendingLoad};
use crate::model::accessor::cell_value;
use crate::model::column::{ColumnDef, InternalColumn, resolve_columns};
use crate::model::row::{GridRow, RowKey, RowKeyFn, RowSet};
use crate::model::value::CellValue;
use crate::pipeline::filter::{FilterModel, FilterSet, apply_column_filters, apply_quick_filter};
use crate::pipeline::group::{GroupEngine, RowGroup};
use crate::pipeline::pager::{PageState, RowWindow, Viewport, compute_window};
use crate::pipeline::sort::{SortDirection, SortState, next_sort_state, sort_rows};
use crate::selection::SelectionModel;

use serde::{Deserialize, Serialize};

/// Vertical chrome (header, filter row, footer) subtracted from the grid
/// height to get the scrollable body height.
const GRID_CHROME_PX: f32 = 110.0;
/// Width reserved for the selection-checkbox column.
const CHECKBOX_COLUMN_PX: f32 = 44.0;

/// Grid configuration, fixed per instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Overall widget height in pixels.
    pub height: f32,
    /// Uniform row height in pixels.
    pub row_height: f32,
    /// Rows per page in paged mode.
    pub page_size: usize,
    /// Page sizes offered to the user.
    pub page_size_options: Vec<usize>,
    /// Whether a selection-checkbox column is shown (narrows the container).
    pub checkbox_selection: bool,
    /// Sort applied before any user interaction.
    pub initial_sort: Option<SortState>,
    /// Quick-filter text applied before any user interaction.
    pub quick_filter: Option<String>,
    /// Whether column headers can be drag-reordered.
    pub enable_column_reorder: bool,
    /// Filters applied before any user interaction.
    pub initial_filters: FilterSet,
    /// Explicit group-by keys; wins over panel-accumulated grouping.
    pub group_by: Vec<String>,
    /// Infinite-scroll mode instead of paging.
    pub infinite_scroll: bool,
    /// Whether the source has more rows to load.
    pub has_more: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            height: 520.0,
            row_height: 44.0,
            page_size: 25,
            page_size_options: vec![10, 25, 50, 100],
            checkbox_selection: false,
            initial_sort: None,
            quick_filter: None,
            enable_column_reorder: true,
            initial_filters: FilterSet::new(),
            group_by: Vec::new(),
            infinite_scroll: false,
            has_more: false,
        }
    }
}

impl GridConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the widget height.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Sets the row height.
    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Enables the selection-checkbox column.
    pub fn with_checkbox_selection(mut self, enabled: bool) -> Self {
        self.checkbox_selection = enabled;
        self
    }

    /// Sets the initial sort.
    pub fn with_initial_sort(mut self, sort: SortState) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    /// Sets the initial filters.
    pub fn with_initial_filters(mut self, filters: FilterSet) -> Self {
        self.initial_filters = filters;
        self
    }

    /// Sets the explicit group-by keys.
    pub fn with_group_by(mut self, keys: Vec<String>) -> Self {
        self.group_by = keys;
        self
    }

    /// Switches to infinite-scroll mode.
    pub fn with_infinite_scroll(mut self, has_more: bool) -> Self {
        self.infinite_scroll = true;
        self.has_more = has_more;
        self
    }
}

/// Payload of a selection-change notification.
#[derive(Debug, Clone)]
pub struct SelectionChange<R> {
    /// Selected identities, in selection order.
    pub selected_row_keys: Vec<RowKey>,
    /// Selected row objects, materialized from the unfiltered source set in
    /// source order - including rows the current filter hides.
    pub selected_rows: Vec<R>,
}

/// Payload of a committed cell edit.
#[derive(Debug, Clone)]
pub struct CellEdit<R> {
    /// Identity of the edited row.
    pub row_key: RowKey,
    /// Key of the edited column.
    pub column_key: String,
    /// The committed value.
    pub value: CellValue,
    /// The updated row object that replaced the original.
    pub row: R,
}

/// Outbound notifications. All fire-and-forget; no return value is
/// consumed.
pub struct GridSignals<R> {
    /// Emitted on every selection mutation.
    pub selection_changed: Signal<SelectionChange<R>>,
    /// Emitted when a cell edit commits.
    pub cell_edited: Signal<CellEdit<R>>,
    /// Emitted when a drag-reorder changes the column order.
    pub column_order_changed: Signal<Vec<String>>,
    /// Emitted when the filter set changes.
    pub filters_changed: Signal<FilterSet>,
    /// Emitted when the group-by key list changes.
    pub group_by_changed: Signal<Vec<String>>,
    /// Emitted when the sort state changes.
    pub sort_changed: Signal<Option<SortState>>,
}

impl<R> GridSignals<R> {
    fn new() -> Self {
        Self {
            selection_changed: Signal::new(),
            cell_edited: Signal::new(),
            column_order_changed: Signal::new(),
            filters_changed: Signal::new(),
            group_by_changed: Signal::new(),
            sort_changed: Signal::new(),
        }
    }
}

/// Cached output of the row-processing pipeline. Paging and the
/// virtualization window are cheap and derived per [`DataGrid::view`] call;
/// this part is the expensive one.
struct PipelineOutput<R> {
    columns: Arc<Vec<InternalColumn<R>>>,
    processed: Arc<Vec<usize>>,
    groups: Option<Arc<Vec<RowGroup>>>,
}

impl<R> Clone for PipelineOutput<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            processed: self.processed.clone(),
            groups: self.groups.clone(),
        }
    }
}

/// A consistent snapshot of everything the renderer needs for one frame.
pub struct GridView<R> {
    /// Resolved columns in visible order.
    pub columns: Arc<Vec<InternalColumn<R>>>,
    /// The processed row sequence (arena indices into the source set).
    pub processed: Arc<Vec<usize>>,
    /// Group buckets when grouping is active. Grouped mode renders in full:
    /// paging and the virtualization window do not apply.
    pub groups: Option<Arc<Vec<RowGroup>>>,
    /// Total pages (always 1 in infinite-scroll or grouped mode).
    pub total_pages: usize,
    /// Clamped current page.
    pub current_page: usize,
    /// Start of the page slice within `processed`.
    pub page_start: usize,
    /// End of the page slice within `processed`.
    pub page_end: usize,
    /// The virtualization window over the page slice.
    pub window: RowWindow,
}

impl<R> GridView<R> {
    /// The current page's rows as arena indices.
    pub fn page_rows(&self) -> &[usize] {
        &self.processed[self.page_start..self.page_end]
    }

    /// The materialized (windowed) slice of the current page.
    pub fn window_rows(&self) -> &[usize] {
        let page = self.page_rows();
        &page[self.window.start..self.window.end]
    }

    /// Returns `true` when grouping is active.
    pub fn is_grouped(&self) -> bool {
        self.groups.is_some()
    }
}

/// The data-grid engine.
///
/// # Example
///
/// ```
/// use horizon_datagrid::{ColumnDef, DataGrid, GridConfig};
/// use serde_json::json;
///
/// let columns = vec![
///     ColumnDef::new("name", "Name").with_field("name"),
///     ColumnDef::new("age", "Age").with_field("age"),
/// ];
/// let rows = vec![
///     json!({"id": 1, "name": "Ada", "age": 36}),
///     json!({"id": 2, "name": "Grace", "age": 45}),
/// ];
///
/// let grid = DataGrid::new(columns, rows, GridConfig::default());
/// let view = grid.view();
/// assert_eq!(view.processed.len(), 2);
/// ```
pub struct DataGrid<R: GridRow> {
    rows: RowSet<R>,
    columns: Vec<ColumnDef<R>>,
    config: GridConfig,
    container_width: Option<f32>,
    quick_filter: Option<String>,
    filters: FilterSet,
    sort: Option<SortState>,
    pager: PageState,
    viewport: Viewport,
    selection: SelectionModel,
    edit: EditController,
    interaction: InteractionController,
    groups: GroupEngine,
    loader: LoadCoordinator,
    signals: GridSignals<R>,
    pipeline: RwLock<Option<PipelineOutput<R>>>,
}

impl<R: GridRow> DataGrid<R> {
    /// Creates a grid over the given columns and rows, deriving row
    /// identity through the default chain (`id`, `_id`, fingerprint).
    pub fn new(columns: Vec<ColumnDef<R>>, rows: Vec<R>, config: GridConfig) -> Self {
        Self::build(columns, rows, config, None)
    }

    /// Creates a grid with an explicit row-identity function. Supplying one
    /// is the one contract an integrator must get right for correctness.
    pub fn with_key_fn(
        columns: Vec<ColumnDef<R>>,
        rows: Vec<R>,
        config: GridConfig,
        key_fn: RowKeyFn<R>,
    ) -> Self {
        Self::build(columns, rows, config, Some(key_fn))
    }

    fn build(
        columns: Vec<ColumnDef<R>>,
        rows: Vec<R>,
        config: GridConfig,
        key_fn: Option<RowKeyFn<R>>,
    ) -> Self {
        let mut row_set = match key_fn {
            Some(f) => RowSet::with_key_fn(f),
            None => RowSet::new(),
        };
        row_set.replace_all(rows);

        let order: Vec<String> = columns.iter().map(|c| c.key.clone()).collect();
        let body_height = (config.height - GRID_CHROME_PX).max(config.row_height);

        let mut groups = GroupEngine::new();
        groups.set_explicit_keys(config.group_by.clone());

        let loader = LoadCoordinator::new();
        loader.set_has_more(config.has_more);

        Self {
            rows: row_set,
            filters: config.initial_filters.clone(),
            sort: config.initial_sort.clone(),
            quick_filter: config.quick_filter.clone(),
            pager: PageState::new(config.page_size)
                .with_options(config.page_size_options.clone()),
            viewport: Viewport::new(body_height, config.row_height),
            selection: SelectionModel::new(),
            edit: EditController::new(),
            interaction: InteractionController::new(order),
            groups,
            loader,
            signals: GridSignals::new(),
            pipeline: RwLock::new(None),
            container_width: None,
            columns,
            config,
        }
    }

    /// The outbound notification signals.
    pub fn signals(&self) -> &GridSignals<R> {
        &self.signals
    }

    /// The grid configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The unfiltered source rows, in source order.
    pub fn source_rows(&self) -> &[R] {
        self.rows.rows()
    }

    /// The row with the given identity.
    pub fn row(&self, key: &RowKey) -> Option<&R> {
        self.rows.index_of(key).and_then(|i| self.rows.get(i))
    }

    /// The identity of the row at the given arena index.
    pub fn row_key_at(&self, index: usize) -> Option<&RowKey> {
        self.rows.key_at(index)
    }

    fn invalidate(&self) {
        *self.pipeline.write() = None;
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Replaces the row collection, triggering full reprocessing. Selection
    /// and edit state are keyed by identity and survive as far as the new
    /// collection carries the same identities.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows.replace_all(rows);
        self.invalidate();
    }

    /// Appends rows (infinite-scroll loads).
    pub fn append_rows(&mut self, rows: Vec<R>) {
        self.rows.append(rows);
        self.invalidate();
    }

    /// Replaces the column declarations. Known keys keep their order;
    /// new columns append.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<R>>) {
        self.interaction
            .sync_order(columns.iter().map(|c| c.key.clone()));
        self.columns = columns;
        self.invalidate();
    }

    /// Sets the measured container width (`None` = not yet measured).
    pub fn set_container_width(&mut self, width: Option<f32>) {
        self.container_width = width;
        self.invalidate();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// The active filter set.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Sets or clears one column's filter and notifies.
    pub fn set_filter(&mut self, key: impl Into<String>, filter: Option<FilterModel>) {
        self.filters.set(key, filter);
        self.invalidate();
        self.signals.filters_changed.emit(self.filters.clone());
    }

    /// Clears every filter and notifies.
    pub fn clear_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear();
        self.invalidate();
        self.signals.filters_changed.emit(self.filters.clone());
    }

    /// Sets the quick-filter text (`None` or empty disables it).
    pub fn set_quick_filter(&mut self, text: Option<String>) {
        self.quick_filter = text.filter(|t| !t.is_empty());
        self.invalidate();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// The active sort state.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Header click: cycles the column through asc -> desc -> unsorted.
    /// No-op on unknown or non-sortable columns.
    pub fn toggle_sort(&mut self, key: &str) {
        if !self.is_sortable(key) {
            return;
        }
        self.sort = next_sort_state(self.sort.as_ref(), key, None);
        self.invalidate();
        self.signals.sort_changed.emit(self.sort.clone());
    }

    /// Header menu: applies a direction outright. No-op on unknown or
    /// non-sortable columns.
    pub fn set_sort(&mut self, key: &str, direction: SortDirection) {
        if !self.is_sortable(key) {
            return;
        }
        self.sort = next_sort_state(self.sort.as_ref(), key, Some(direction));
        self.invalidate();
        self.signals.sort_changed.emit(self.sort.clone());
    }

    /// Clears the sort, restoring insertion order.
    pub fn clear_sort(&mut self) {
        if self.sort.is_none() {
            return;
        }
        self.sort = None;
        self.invalidate();
        self.signals.sort_changed.emit(None);
    }

    fn is_sortable(&self, key: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.key == key && c.sortable)
    }

    // =========================================================================
    // Paging and scrolling
    // =========================================================================

    /// Requests a page (clamped on read).
    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page);
    }

    /// Changes the page size; the current page re-clamps on read.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    /// Scroll-offset change. Updates the virtualization window, and in
    /// infinite-scroll mode returns the pending load for the host to await
    /// when the position warrants one - at most one load is in flight
    /// regardless of how often this fires.
    pub fn on_scroll(&mut self, scroll_top: f32) -> Option<PendingLoad> {
        self.viewport.scroll_top = scroll_top.max(0.0);
        if !self.config.infinite_scroll {
            return None;
        }
        let content_height = self.view().window.content_height;
        self.loader
            .poll_scroll(self.viewport.scroll_top, self.viewport.height, content_height)
    }

    /// Installs the external load-more callback.
    pub fn set_load_more(&mut self, loader: LoadMoreFn) {
        let coordinator = &self.loader;
        coordinator.set_loader(move || loader());
    }

    /// Updates the external `has_more` flag.
    pub fn set_has_more(&mut self, has_more: bool) {
        self.loader.set_has_more(has_more);
    }

    /// Returns `true` while a load-more call is pending.
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// The load coordinator (loading-indicator signal lives there).
    pub fn load_coordinator(&self) -> &LoadCoordinator {
        &self.loader
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Checks whether a row is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selection.is_selected(key)
    }

    /// Toggles one row and notifies.
    pub fn toggle_row_selected(&mut self, key: RowKey) {
        self.selection.toggle(key);
        self.emit_selection_changed();
    }

    /// Unions the current page's identities into the selection and
    /// notifies.
    pub fn select_all_on_page(&mut self) {
        let keys = self.current_page_keys();
        self.selection.select_page(keys.iter());
        self.emit_selection_changed();
    }

    /// Removes exactly the current page's identities from the selection and
    /// notifies; selections on other pages survive.
    pub fn deselect_all_on_page(&mut self) {
        let keys = self.current_page_keys();
        self.selection.deselect_page(keys.iter());
        self.emit_selection_changed();
    }

    /// Selected identities in selection order.
    pub fn selected_keys(&self) -> Vec<RowKey> {
        self.selection.selected_keys().to_vec()
    }

    /// Selected row objects drawn from the unfiltered source set, in source
    /// order. Rows hidden by the current filter are still here - callers
    /// can tell "selected but off-screen" from "selected and visible".
    pub fn selected_rows(&self) -> Vec<R> {
        self.rows
            .rows()
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                self.rows
                    .key_at(*i)
                    .is_some_and(|k| self.selection.is_selected(k))
            })
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn current_page_keys(&self) -> Vec<RowKey> {
        let view = self.view();
        let indices: Vec<usize> = if view.is_grouped() {
            view.processed.as_ref().clone()
        } else {
            view.page_rows().to_vec()
        };
        indices
            .into_iter()
            .filter_map(|i| self.rows.key_at(i).cloned())
            .collect()
    }

    fn emit_selection_changed(&self) {
        self.signals.selection_changed.emit(SelectionChange {
            selected_row_keys: self.selected_keys(),
            selected_rows: self.selected_rows(),
        });
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// The active edit session, if any.
    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.session()
    }

    /// Begins editing a cell, seeding the draft with the cell's current
    /// value. A prior session is committed first, so at most one cell is
    /// mid-edit system-wide. Refused for non-editable columns.
    pub fn begin_edit(&mut self, row_key: RowKey, column_key: &str) -> GridResult<()> {
        let col = self
            .columns
            .iter()
            .find(|c| c.key == column_key)
            .ok_or_else(|| GridError::UnknownColumn(column_key.to_string()))?;
        if !col.editable {
            return Err(GridError::NotEditable(column_key.to_string()));
        }
        let row = self
            .row(&row_key)
            .ok_or_else(|| GridError::RowNotFound(row_key.clone()))?;
        let initial = cell_value(row, col);

        if self.edit.is_editing() {
            self.commit_edit();
        }
        self.edit.begin(row_key, column_key.to_string(), initial);
        Ok(())
    }

    /// Updates the draft value of the active session. No-op when idle.
    pub fn update_edit_draft(&mut self, value: CellValue) {
        self.edit.update_draft(value);
    }

    /// Commits the active session: writes the draft into a copy of the
    /// owning row (identity-matched replace; the original row object is
    /// never mutated) and notifies. A column with no writable field target
    /// ends the session without writing or notifying.
    pub fn commit_edit(&mut self) {
        let Some(session) = self.edit.take_for_commit() else {
            return;
        };
        let Some(col) = self.columns.iter().find(|c| c.key == session.column_key) else {
            return;
        };
        let Some(field) = col.field.clone() else {
            tracing::debug!(
                target: "horizon_datagrid::editing",
                column = %session.column_key,
                "commit dropped: no writable field target"
            );
            return;
        };
        let Some(old_row) = self.row(&session.row_key).cloned() else {
            return;
        };
        let Some(new_row) = old_row.replace_field(&field, session.draft.clone()) else {
            tracing::debug!(
                target: "horizon_datagrid::editing",
                column = %session.column_key,
                "commit dropped: row type is read-only"
            );
            return;
        };
        self.rows.replace_row(&session.row_key, new_row.clone());
        self.invalidate();
        self.signals.cell_edited.emit(CellEdit {
            row_key: session.row_key,
            column_key: session.column_key,
            value: session.draft,
            row: new_row,
        });
    }

    /// Cancels the active session, discarding the draft.
    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
    }

    // =========================================================================
    // Column interaction
    // =========================================================================

    /// The current column order.
    pub fn column_order(&self) -> &[String] {
        self.interaction.order()
    }

    /// Starts a resize gesture at the given pointer x.
    pub fn begin_column_resize(&mut self, key: &str, start_x: f32) -> GridResult<()> {
        let current_width = self
            .view()
            .columns
            .iter()
            .find(|c| c.key() == key)
            .map(|c| c.computed_width)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))?;
        let col = self
            .columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))?;
        self.interaction.begin_resize(col, start_x, current_width)
    }

    /// Pointer move during a resize; returns the applied width.
    pub fn resize_column_to(&mut self, current_x: f32) -> Option<f32> {
        let width = self.interaction.resize_to(current_x);
        if width.is_some() {
            self.invalidate();
        }
        width
    }

    /// Pointer up: ends the resize gesture.
    pub fn end_column_resize(&mut self) {
        self.interaction.end_resize();
    }

    /// Starts dragging a column header. Refused when reordering is disabled
    /// or the column is mid-resize.
    pub fn begin_column_drag(&mut self, key: &str) -> bool {
        if !self.config.enable_column_reorder {
            return false;
        }
        self.interaction.begin_column_drag(key)
    }

    /// Drop on another header: splices the dragged column to the target's
    /// position and notifies with the new order.
    pub fn drop_on_column(&mut self, target_key: &str) {
        if let Some(order) = self.interaction.drop_on_column(target_key) {
            self.invalidate();
            self.signals.column_order_changed.emit(order);
        }
    }

    /// Drop on the group panel: appends the dragged column's key to the
    /// group-by list (idempotent) and notifies.
    pub fn drop_on_group_panel(&mut self) {
        if let Some(key) = self.interaction.drop_on_group_panel()
            && self.groups.add_key(key)
        {
            self.invalidate();
            self.signals
                .group_by_changed
                .emit(self.groups.effective_keys().to_vec());
        }
    }

    /// Removes a group chip's key from the group-by list and notifies.
    pub fn remove_group_key(&mut self, key: &str) {
        if self.groups.remove_key(key) {
            self.invalidate();
            self.signals
                .group_by_changed
                .emit(self.groups.effective_keys().to_vec());
        }
    }

    /// Replaces the explicit group-by configuration and notifies.
    pub fn set_group_by(&mut self, keys: Vec<String>) {
        self.groups.set_explicit_keys(keys);
        self.invalidate();
        self.signals
            .group_by_changed
            .emit(self.groups.effective_keys().to_vec());
    }

    /// The effective group-by keys.
    pub fn group_by(&self) -> &[String] {
        self.groups.effective_keys()
    }

    /// Toggles a group bucket's expand flag.
    pub fn toggle_group(&mut self, group_key: &str) {
        self.groups.toggle(group_key);
        self.invalidate();
    }

    /// Starts dragging a row.
    pub fn begin_row_drag(&mut self, key: RowKey) {
        self.interaction.begin_row_drag(key);
    }

    /// Drop on another row: moves the dragged row to the target's position
    /// in the source order.
    pub fn drop_on_row(&mut self, target_key: &RowKey) {
        if let Some((from, to)) = self.interaction.drop_on_row(target_key)
            && self.rows.move_row(&from, &to)
        {
            self.invalidate();
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Produces the view snapshot for the current state, recomputing the
    /// pipeline only when an input changed since the last call.
    pub fn view(&self) -> GridView<R> {
        let pipeline = {
            let cached = self.pipeline.read().clone();
            match cached {
                Some(p) => p,
                None => {
                    let computed = self.compute_pipeline();
                    *self.pipeline.write() = Some(computed.clone());
                    computed
                }
            }
        };

        let n = pipeline.processed.len();
        let grouped = pipeline.groups.is_some();

        let (page_start, page_end, total_pages, current_page) =
            if grouped || self.config.infinite_scroll {
                (0, n, 1, 0)
            } else {
                let (start, end) = self.pager.page_bounds(n);
                (start, end, self.pager.total_pages(n), self.pager.current_page(n))
            };

        let window = if grouped {
            // Grouped rows render in full; the spacer geometry still
            // reflects the total row count.
            RowWindow {
                start: 0,
                end: page_end - page_start,
                offset_y: 0.0,
                content_height: n as f32 * self.viewport.row_height,
            }
        } else {
            compute_window(&self.viewport, page_end - page_start)
        };

        GridView {
            columns: pipeline.columns,
            processed: pipeline.processed,
            groups: pipeline.groups,
            total_pages,
            current_page,
            page_start,
            page_end,
            window,
        }
    }

    fn compute_pipeline(&self) -> PipelineOutput<R> {
        let container = self.container_width.map(|w| {
            if self.config.checkbox_selection {
                w - CHECKBOX_COLUMN_PX
            } else {
                w
            }
        });
        let columns = resolve_columns(
            &self.columns,
            container,
            self.interaction.order(),
            self.interaction.width_overrides(),
        );

        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        indices = apply_column_filters(&self.rows, indices, &self.filters, &columns);
        if let Some(needle) = &self.quick_filter {
            indices = apply_quick_filter(&self.rows, indices, needle, &columns);
        }
        indices = sort_rows(&self.rows, indices, self.sort.as_ref(), &columns);

        let groups = self
            .groups
            .partition(&self.rows, &indices, &columns)
            .map(Arc::new);

        tracing::trace!(
            target: "horizon_datagrid::pipeline",
            rows = self.rows.len(),
            processed = indices.len(),
            grouped = groups.is_some(),
            "pipeline recomputed"
        );

        PipelineOutput {
            columns: Arc::new(columns),
            processed: Arc::new(indices),
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;
    use crate::pipeline::filter::FilterOperator;
    use parking_lot::Mutex;
    use serde_json::json;

    type Row = serde_json::Value;

    fn columns() -> Vec<ColumnDef<Row>> {
        vec![
            ColumnDef::new("name", "Name").with_field("name"),
            ColumnDef::new("n", "N")
                .with_field("n")
                .with_data_type(DataType::Number),
            ColumnDef::new("city", "City").with_field("city"),
            ColumnDef::new("locked", "Locked")
                .with_field("name")
                .with_editable(false),
        ]
    }

    fn rows() -> Vec<Row> {
        vec![
            json!({"id": 1, "n": 5, "name": "Apple", "city": "Oslo"}),
            json!({"id": 2, "n": 15, "name": "Banana", "city": "Lima"}),
            json!({"id": 3, "n": 25, "name": "Cherry", "city": "Oslo"}),
        ]
    }

    fn grid() -> DataGrid<Row> {
        DataGrid::new(columns(), rows(), GridConfig::default())
    }

    fn processed_ids(grid: &DataGrid<Row>) -> Vec<i64> {
        let view = grid.view();
        view.processed
            .iter()
            .map(|&i| grid.source_rows()[i]["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_number_filter_example() {
        // rows [{id:1,n:5},{id:2,n:15}], filter {gt, 10} on n -> [{id:2}]
        let mut grid = DataGrid::new(
            columns(),
            vec![json!({"id": 1, "n": 5}), json!({"id": 2, "n": 15})],
            GridConfig::default(),
        );
        grid.set_filter("n", Some(FilterModel::new(FilterOperator::Gt, 10)));
        assert_eq!(processed_ids(&grid), vec![2]);
    }

    #[test]
    fn test_sort_click_cycle_through_facade() {
        let mut grid = grid();
        grid.toggle_sort("n");
        assert_eq!(
            grid.sort(),
            Some(&SortState::new("n", SortDirection::Asc))
        );
        grid.toggle_sort("n");
        assert_eq!(
            grid.sort(),
            Some(&SortState::new("n", SortDirection::Desc))
        );
        assert_eq!(processed_ids(&grid), vec![3, 2, 1]);
        grid.toggle_sort("n");
        assert_eq!(grid.sort(), None);
        assert_eq!(processed_ids(&grid), vec![1, 2, 3]);
    }

    #[test]
    fn test_selection_survives_filter_round_trip() {
        let mut grid = grid();
        grid.toggle_row_selected(RowKey::Int(1));

        // Hide row 1.
        grid.set_filter("n", Some(FilterModel::new(FilterOperator::Gt, 10)));
        assert_eq!(processed_ids(&grid), vec![2, 3]);
        assert!(grid.is_selected(&RowKey::Int(1)));
        // Selected rows still materialize from the unfiltered source.
        assert_eq!(grid.selected_rows().len(), 1);

        // Clear the filter; row 1 is back and still selected.
        grid.clear_filters();
        assert_eq!(processed_ids(&grid), vec![1, 2, 3]);
        assert!(grid.is_selected(&RowKey::Int(1)));
    }

    #[test]
    fn test_select_and_deselect_page() {
        let mut grid = grid();
        grid.toggle_row_selected(RowKey::Int(99)); // phantom off-page key
        grid.select_all_on_page();
        assert_eq!(grid.selected_keys().len(), 4);
        grid.deselect_all_on_page();
        // Only the out-of-page selection survives.
        assert_eq!(grid.selected_keys(), vec![RowKey::Int(99)]);
    }

    #[test]
    fn test_selection_notification_payload() {
        let mut grid = grid();
        let captured: Arc<Mutex<Vec<(Vec<RowKey>, usize)>>> = Arc::new(Mutex::new(Vec::new()));

        let captured_clone = captured.clone();
        grid.signals()
            .selection_changed
            .connect(move |change: &SelectionChange<Row>| {
                captured_clone
                    .lock()
                    .push((change.selected_row_keys.clone(), change.selected_rows.len()));
            });

        grid.toggle_row_selected(RowKey::Int(2));
        let events = captured.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, vec![RowKey::Int(2)]);
        assert_eq!(events[0].1, 1);
    }

    #[test]
    fn test_edit_commit_example() {
        // rows [{id:1, name:"A"}], edit name -> "B", commit.
        let mut grid = DataGrid::new(
            vec![ColumnDef::new("name", "Name").with_field("name")],
            vec![json!({"id": 1, "name": "A"})],
            GridConfig::default(),
        );

        let captured: Arc<Mutex<Vec<CellEdit<Row>>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        grid.signals()
            .cell_edited
            .connect(move |edit: &CellEdit<Row>| {
                captured_clone.lock().push(edit.clone());
            });

        grid.begin_edit(RowKey::Int(1), "name").unwrap();
        grid.update_edit_draft(CellValue::from("B"));
        grid.commit_edit();

        // The row sequence holds a new row object with the committed value.
        assert_eq!(grid.source_rows()[0], json!({"id": 1, "name": "B"}));

        let events = captured.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].row_key, RowKey::Int(1));
        assert_eq!(events[0].column_key, "name");
        assert_eq!(events[0].value, CellValue::from("B"));
        assert_eq!(events[0].row, json!({"id": 1, "name": "B"}));
    }

    #[test]
    fn test_edit_refused_for_non_editable() {
        let mut grid = grid();
        assert_eq!(
            grid.begin_edit(RowKey::Int(1), "locked"),
            Err(GridError::NotEditable("locked".into()))
        );
        assert!(grid.editing().is_none());
    }

    #[test]
    fn test_begin_edit_commits_prior_session() {
        let mut grid = grid();
        grid.begin_edit(RowKey::Int(1), "name").unwrap();
        grid.update_edit_draft(CellValue::from("Apricot"));
        // Starting another edit resolves the first one by committing it.
        grid.begin_edit(RowKey::Int(2), "name").unwrap();
        assert_eq!(grid.source_rows()[0]["name"], "Apricot");
        assert!(grid.editing().is_some());
        assert_eq!(grid.editing().unwrap().row_key, RowKey::Int(2));
    }

    #[test]
    fn test_cancel_edit_discards() {
        let mut grid = grid();
        grid.begin_edit(RowKey::Int(1), "name").unwrap();
        grid.update_edit_draft(CellValue::from("Changed"));
        grid.cancel_edit();
        assert_eq!(grid.source_rows()[0]["name"], "Apple");
        assert!(grid.editing().is_none());
    }

    #[test]
    fn test_pagination_covers_all_rows() {
        let rows: Vec<Row> = (0..53).map(|i| json!({"id": i, "n": i})).collect();
        let mut grid = DataGrid::new(
            columns(),
            rows,
            GridConfig::default().with_page_size(10),
        );
        let mut covered = 0;
        let total_pages = grid.view().total_pages;
        assert_eq!(total_pages, 6);
        for page in 0..total_pages {
            grid.set_page(page);
            covered += grid.view().page_rows().len();
        }
        assert_eq!(covered, 53);
    }

    #[test]
    fn test_virtualization_window_at_top() {
        let rows: Vec<Row> = (0..200).map(|i| json!({"id": i})).collect();
        let mut grid = DataGrid::new(
            columns(),
            rows,
            GridConfig::default()
                .with_page_size(500)
                .with_height(550.0)
                .with_row_height(44.0),
        );
        let view = grid.view();
        assert_eq!(view.window.start, 0);
        assert!(view.window.end > 0);
        assert_eq!(view.window.offset_y, 0.0);

        // Scrolling moves the window and the spacer together.
        grid.on_scroll(44.0 * 50.0);
        let view = grid.view();
        assert_eq!(view.window.start, 48);
        assert_eq!(view.window.offset_y, 48.0 * 44.0);
    }

    #[test]
    fn test_grouping_partitions_processed_rows() {
        let mut grid = grid();
        grid.set_group_by(vec!["city".to_string()]);
        let view = grid.view();
        let groups = view.groups.as_ref().unwrap();
        assert_eq!(groups.len(), 2);
        let total: usize = groups.iter().map(|g| g.rows.len()).sum();
        assert_eq!(total, view.processed.len());
        // Grouped mode disables paging.
        assert_eq!(view.total_pages, 1);
        assert_eq!((view.page_start, view.page_end), (0, 3));
    }

    #[test]
    fn test_column_reorder_emits_new_order() {
        let mut grid = grid();
        let captured: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        grid.signals()
            .column_order_changed
            .connect(move |order: &Vec<String>| {
                captured_clone.lock().push(order.clone());
            });

        assert!(grid.begin_column_drag("name"));
        grid.drop_on_column("city");
        assert_eq!(
            grid.column_order(),
            ["n", "city", "name", "locked"]
        );
        assert_eq!(captured.lock().len(), 1);

        let view = grid.view();
        assert_eq!(view.columns[0].key(), "n");
    }

    #[test]
    fn test_reorder_disabled_by_config() {
        let mut grid = DataGrid::new(columns(), rows(), GridConfig {
            enable_column_reorder: false,
            ..GridConfig::default()
        });
        assert!(!grid.begin_column_drag("name"));
    }

    #[test]
    fn test_resize_applies_override() {
        let mut grid = grid();
        grid.begin_column_resize("name", 100.0).unwrap();
        grid.resize_column_to(140.0);
        grid.end_column_resize();
        let view = grid.view();
        let name_col = view.columns.iter().find(|c| c.key() == "name").unwrap();
        // Default width 160 plus a 40 px drag.
        assert_eq!(name_col.computed_width, 200.0);
    }

    #[test]
    fn test_group_panel_drop_and_chip_removal() {
        let mut grid = grid();
        let captured: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        grid.signals()
            .group_by_changed
            .connect(move |keys: &Vec<String>| {
                captured_clone.lock().push(keys.clone());
            });

        assert!(grid.begin_column_drag("city"));
        grid.drop_on_group_panel();
        assert_eq!(grid.group_by(), ["city"]);
        assert!(grid.view().is_grouped());

        // Dropping the same column again is idempotent: no second signal.
        assert!(grid.begin_column_drag("city"));
        grid.drop_on_group_panel();
        assert_eq!(captured.lock().len(), 1);

        grid.remove_group_key("city");
        assert!(grid.group_by().is_empty());
        assert!(!grid.view().is_grouped());
        assert_eq!(captured.lock().len(), 2);
    }

    #[test]
    fn test_group_expand_collapse_flow() {
        let mut grid = grid();
        grid.begin_column_drag("city");
        grid.drop_on_group_panel();
        // Panel-grouped buckets start collapsed.
        let view = grid.view();
        assert!(view.groups.as_ref().unwrap().iter().all(|g| !g.expanded));

        grid.toggle_group("Oslo");
        let view = grid.view();
        let oslo = view
            .groups
            .as_ref()
            .unwrap()
            .iter()
            .find(|g| g.key == "Oslo")
            .unwrap();
        assert!(oslo.expanded);
    }

    #[test]
    fn test_row_drag_reorders_source() {
        let mut grid = grid();
        grid.begin_row_drag(RowKey::Int(1));
        grid.drop_on_row(&RowKey::Int(3));
        assert_eq!(processed_ids(&grid), vec![2, 3, 1]);
    }

    #[test]
    fn test_replacing_rows_reprocesses() {
        let mut grid = grid();
        grid.set_filter("n", Some(FilterModel::new(FilterOperator::Gt, 10)));
        assert_eq!(processed_ids(&grid), vec![2, 3]);
        grid.set_rows(vec![json!({"id": 9, "n": 90})]);
        assert_eq!(processed_ids(&grid), vec![9]);
    }

    #[test]
    fn test_quick_filter_then_sort_order() {
        let mut grid = grid();
        // "o" matches the two Oslo rows through their city cells.
        grid.set_quick_filter(Some("o".to_string()));
        grid.toggle_sort("n");
        grid.toggle_sort("n"); // descending
        assert_eq!(processed_ids(&grid), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_infinite_scroll_single_flight_through_facade() {
        let rows: Vec<Row> = (0..100).map(|i| json!({"id": i})).collect();
        let mut grid = DataGrid::new(
            columns(),
            rows,
            GridConfig::default().with_infinite_scroll(true),
        );
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_clone = calls.clone();
        grid.set_load_more(Arc::new(move || -> crate::loader::LoadFuture {
            calls_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }));

        // Scroll far past the bottom twice in a row.
        let first = grid.on_scroll(1.0e6);
        let second = grid.on_scroll(1.0e6 + 10.0);
        assert!(first.is_some());
        assert!(second.is_none());

        first.unwrap().await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(!grid.is_loading());
    }

    #[test]
    fn test_checkbox_selection_narrows_container() {
        let defs = vec![ColumnDef::<Row>::new("a", "A").with_flex(1.0)];
        let mut grid = DataGrid::new(
            defs.clone(),
            vec![],
            GridConfig::default().with_checkbox_selection(true),
        );
        grid.set_container_width(Some(444.0));
        let with_checkbox = grid.view().columns[0].computed_width;

        let mut plain = DataGrid::new(defs, vec![], GridConfig::default());
        plain.set_container_width(Some(400.0));
        assert_eq!(plain.view().columns[0].computed_width, with_checkbox);
    }
}
