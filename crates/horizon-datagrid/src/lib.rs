//! Horizon DataGrid - a headless data-grid engine.
//!
//! Given an arbitrary collection of rows and a column schema, the engine
//! turns user-driven view state (filters, sort, quick search, grouping,
//! paging or infinite scroll, column order and widths, selection, edit
//! sessions) into the exact ordered, windowed set of rows and column
//! geometry to display. Rendering, styling and input widgets are the
//! host's job; the engine's boundary is a set of entry points and
//! fire-and-forget signals.
//!
//! # Example
//!
//! ```
//! use horizon_datagrid::prelude::*;
//! use serde_json::json;
//!
//! let columns = vec![
//!     ColumnDef::new("name", "Name").with_field("name"),
//!     ColumnDef::new("n", "N")
//!         .with_field("n")
//!         .with_data_type(DataType::Number),
//! ];
//! let rows = vec![
//!     json!({"id": 1, "name": "Apple", "n": 5}),
//!     json!({"id": 2, "name": "Banana", "n": 15}),
//! ];
//!
//! let mut grid = DataGrid::new(columns, rows, GridConfig::default());
//! grid.set_filter("n", Some(FilterModel::new(FilterOperator::Gt, 10)));
//! grid.toggle_sort("name");
//!
//! let view = grid.view();
//! assert_eq!(view.processed.len(), 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! rows ──> Filter ──> Quick filter ──> Sort ──┬──> Group
//!                                             └──> Page + Window
//! ```
//!
//! Selection, the edit session, drag/resize gestures and the infinite-load
//! coordinator are independent state machines that read the pipeline's
//! latest output and never block it. All processing is synchronous on the
//! caller's thread; the one asynchronous boundary is the external
//! load-more callback.

pub mod editing;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod selection;

pub use editing::{EditController, EditSession};
pub use error::{GridError, GridResult};
pub use grid::{CellEdit, DataGrid, GridConfig, GridSignals, GridView, SelectionChange};
pub use interaction::{ColumnDragGesture, InteractionController, ResizeGesture, RowDragGesture};
pub use loader::{LOAD_THRESHOLD_PX, LoadCoordinator, LoadFuture, LoadMoreFn, PendingLoad};
pub use model::{
    CellFormatter, CellValue, ColumnDef, DataType, GridRow, HorizontalAlign, InternalColumn,
    RowKey, RowSet, cell_value, format_cell, resolve_columns,
};
pub use pipeline::{
    FilterModel, FilterOperator, FilterSet, GroupEngine, PageState, RowGroup, RowWindow,
    SortDirection, SortState, Viewport, compute_window,
};
pub use selection::SelectionModel;

/// Convenience re-exports for the common surface.
pub mod prelude {
    pub use crate::editing::EditSession;
    pub use crate::error::{GridError, GridResult};
    pub use crate::grid::{
        CellEdit, DataGrid, GridConfig, GridSignals, GridView, SelectionChange,
    };
    pub use crate::model::{
        CellValue, ColumnDef, DataType, GridRow, HorizontalAlign, InternalColumn, RowKey,
    };
    pub use crate::pipeline::{
        FilterModel, FilterOperator, FilterSet, RowGroup, SortDirection, SortState,
    };
    pub use horizon_datagrid_core::Signal;
}
