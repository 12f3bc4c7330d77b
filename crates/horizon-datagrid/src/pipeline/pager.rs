//! Paging and the virtualization window.
//!
//! Two mutually exclusive modes per grid instance: paged (fixed-size slices
//! of the processed sequence) and infinite scroll (the full sequence,
//! with the load coordinator fetching more source rows). Independently of
//! the mode, the virtualization window limits row materialization to the
//! rows near the scroll offset; it recomputes on every scroll change and on
//! any change to the processed row count.

use serde::{Deserialize, Serialize};

/// Rows materialized beyond what fills the viewport.
pub const OVERSCAN_ROWS: usize = 4;
/// Rows the window starts ahead of the first visible row.
pub const WINDOW_LEAD_ROWS: usize = 2;

/// Paging state for the finite mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    page: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
}

impl PageState {
    /// Creates paging state with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            page_size_options: Vec::new(),
        }
    }

    /// Sets the page sizes offered to the user.
    pub fn with_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    /// The requested page (before clamping against a row count).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page sizes offered to the user.
    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Requests a page; the effective page is clamped per row count.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Changes the page size. The current page is kept and re-clamped
    /// against the new page count on the next read.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// Total pages for a processed row count; never less than one.
    pub fn total_pages(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size).max(1)
    }

    /// The current page clamped into `[0, total_pages - 1]`.
    pub fn current_page(&self, row_count: usize) -> usize {
        self.page.min(self.total_pages(row_count) - 1)
    }

    /// The `[start, end)` slice bounds of the current page.
    pub fn page_bounds(&self, row_count: usize) -> (usize, usize) {
        let start = self.current_page(row_count) * self.page_size;
        let end = (start + self.page_size).min(row_count);
        (start, end)
    }
}

/// Scroll geometry the window derives from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Scroll offset from the top of the content, in pixels.
    pub scroll_top: f32,
    /// Height of the scrollable body area, in pixels.
    pub height: f32,
    /// Uniform row height, in pixels.
    pub row_height: f32,
}

impl Viewport {
    /// Creates a viewport with the given body height and row height.
    pub fn new(height: f32, row_height: f32) -> Self {
        Self {
            scroll_top: 0.0,
            height,
            row_height: row_height.max(1.0),
        }
    }
}

/// The materialization window for the current scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowWindow {
    /// First materialized row index (into the page slice).
    pub start: usize,
    /// One past the last materialized row index.
    pub end: usize,
    /// Pixel offset of the spacer positioning the materialized rows.
    pub offset_y: f32,
    /// Total scrollable content height.
    pub content_height: f32,
}

/// Computes the virtualization window over `row_count` rows.
///
/// Only rows in `[start, end)` are materialized; a spacer of `offset_y`
/// pixels positions them, and the scrollable height is
/// `row_count * row_height`.
pub fn compute_window(viewport: &Viewport, row_count: usize) -> RowWindow {
    let row_height = viewport.row_height.max(1.0);
    let visible = (viewport.height / row_height).ceil() as usize + OVERSCAN_ROWS;
    let first_visible = (viewport.scroll_top.max(0.0) / row_height).floor() as usize;
    // A scroll offset past the content must not push the window past the
    // last row.
    let start = first_visible
        .saturating_sub(WINDOW_LEAD_ROWS)
        .min(row_count);
    let end = (start + visible).min(row_count);
    RowWindow {
        start,
        end,
        offset_y: start as f32 * row_height,
        content_height: row_count as f32 * row_height,
    }
}
