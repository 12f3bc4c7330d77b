//! The row-processing pipeline.
//!
//! Every state change recomputes the presented row sequence in a fixed
//! order: structured column filters, then the quick filter, then the sort,
//! then either grouping or paging plus the virtualization window. The
//! stages pass an ordered sequence of row-arena indices along; rows
//! themselves are never copied or mutated by the pipeline.

pub mod filter;
pub mod group;
pub mod pager;
pub mod sort;

pub use filter::{FilterModel, FilterOperator, FilterSet, apply_column_filters, apply_quick_filter};
pub use group::{GroupEngine, RowGroup};
pub use pager::{
    OVERSCAN_ROWS, PageState, RowWindow, Viewport, WINDOW_LEAD_ROWS, compute_window,
};
pub use sort::{SortDirection, SortState, next_sort_state, sort_rows};
