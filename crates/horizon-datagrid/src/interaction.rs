//! Column drag/resize gestures and the group-panel drop target.
//!
//! Each pointer-drag sequence is modeled as a short-lived gesture value
//! created at pointer-down and consumed at pointer-up, so gesture state
//! cannot leak past the gesture's lifetime. Only one gesture of each kind
//! exists at a time, and a column being resized cannot simultaneously be
//! dragged for reordering.
//!
//! The controller also owns the two pieces of column view state the
//! gestures produce: the order list and the per-column width overrides.

use std::collections::HashMap;

use crate::error::{GridError, GridResult};
use crate::model::column::{DEFAULT_MAX_WIDTH, DEFAULT_MIN_WIDTH};
use crate::model::{ColumnDef, RowKey};

/// An in-flight column resize: pointer-down anchor plus clamp bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    /// Key of the column being resized.
    pub column_key: String,
    /// Pointer x at gesture start.
    pub start_x: f32,
    /// Column width at gesture start.
    pub start_width: f32,
    min_width: f32,
    max_width: f32,
}

impl ResizeGesture {
    /// The width the column should take for the current pointer position.
    pub fn width_at(&self, current_x: f32) -> f32 {
        (self.start_width + (current_x - self.start_x))
            .max(self.min_width)
            .min(self.max_width)
    }
}

/// An in-flight column drag (reorder or group-by drop).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDragGesture {
    /// Key of the dragged column.
    pub column_key: String,
}

/// An in-flight row drag.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDragGesture {
    /// Identity of the dragged row.
    pub row_key: RowKey,
}

/// Owns column order, width overrides, and the transient gesture state that
/// mutates them.
#[derive(Debug, Default)]
pub struct InteractionController {
    order: Vec<String>,
    width_overrides: HashMap<String, f32>,
    resize: Option<ResizeGesture>,
    column_drag: Option<ColumnDragGesture>,
    row_drag: Option<RowDragGesture>,
}

impl InteractionController {
    /// Creates a controller with the given initial column order.
    pub fn new(order: Vec<String>) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    /// The current column order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Replaces the column order wholesale (column set changed).
    pub fn set_order(&mut self, order: Vec<String>) {
        self.order = order;
    }

    /// Appends keys that are missing from the order (new columns).
    pub fn sync_order(&mut self, keys: impl IntoIterator<Item = String>) {
        for key in keys {
            if !self.order.contains(&key) {
                self.order.push(key);
            }
        }
    }

    /// The per-column width overrides produced by resize gestures.
    pub fn width_overrides(&self) -> &HashMap<String, f32> {
        &self.width_overrides
    }

    // =========================================================================
    // Resize
    // =========================================================================

    /// Starts a resize gesture on a column's resize affordance.
    ///
    /// `current_width` is the column's resolved width at pointer-down; the
    /// gesture clamps into the column's `[min, max]` range.
    pub fn begin_resize<R>(
        &mut self,
        col: &ColumnDef<R>,
        start_x: f32,
        current_width: f32,
    ) -> GridResult<()> {
        if !col.resizable {
            return Err(GridError::NotResizable(col.key.clone()));
        }
        tracing::debug!(
            target: "horizon_datagrid::interaction",
            column = %col.key,
            start_width = current_width,
            "begin resize"
        );
        self.resize = Some(ResizeGesture {
            column_key: col.key.clone(),
            start_x,
            start_width: current_width,
            min_width: col.min_width.unwrap_or(DEFAULT_MIN_WIDTH),
            max_width: col.max_width.unwrap_or(DEFAULT_MAX_WIDTH),
        });
        Ok(())
    }

    /// Pointer move during a resize: applies the clamped width as an
    /// override. Returns the new width, or `None` when no resize is active.
    pub fn resize_to(&mut self, current_x: f32) -> Option<f32> {
        let gesture = self.resize.as_ref()?;
        let width = gesture.width_at(current_x);
        self.width_overrides.insert(gesture.column_key.clone(), width);
        Some(width)
    }

    /// Pointer up: ends the resize gesture.
    pub fn end_resize(&mut self) -> Option<ResizeGesture> {
        let gesture = self.resize.take();
        if let Some(g) = &gesture {
            tracing::debug!(
                target: "horizon_datagrid::interaction",
                column = %g.column_key,
                "end resize"
            );
        }
        gesture
    }

    /// The column currently being resized, if any.
    pub fn resizing_column(&self) -> Option<&str> {
        self.resize.as_ref().map(|g| g.column_key.as_str())
    }

    // =========================================================================
    // Column reorder / group-by drop
    // =========================================================================

    /// Starts dragging a column header. Refused while that column is being
    /// resized.
    pub fn begin_column_drag(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.resizing_column() == Some(key.as_str()) {
            return false;
        }
        tracing::debug!(
            target: "horizon_datagrid::interaction",
            column = %key,
            "begin column drag"
        );
        self.column_drag = Some(ColumnDragGesture { column_key: key });
        true
    }

    /// The column currently being dragged, if any.
    pub fn dragging_column(&self) -> Option<&str> {
        self.column_drag.as_ref().map(|g| g.column_key.as_str())
    }

    /// Drop on another column header: splices the dragged key out of the
    /// order and re-inserts it at the target's position.
    ///
    /// Returns the new order, or `None` for the no-op cases (nothing
    /// dragged, self-drop, unknown keys). The gesture ends either way.
    pub fn drop_on_column(&mut self, target_key: &str) -> Option<Vec<String>> {
        let gesture = self.column_drag.take()?;
        let source_key = gesture.column_key;
        if source_key == target_key {
            return None;
        }
        let from = self.order.iter().position(|k| k == &source_key)?;
        let to = self.order.iter().position(|k| k == target_key)?;
        let moved = self.order.remove(from);
        self.order.insert(to, moved);
        tracing::debug!(
            target: "horizon_datagrid::interaction",
            column = %source_key,
            target = %target_key,
            "column reordered"
        );
        Some(self.order.clone())
    }

    /// Drop on the group panel: yields the key to append to the group-by
    /// list. The gesture ends.
    pub fn drop_on_group_panel(&mut self) -> Option<String> {
        self.column_drag.take().map(|g| g.column_key)
    }

    /// Abandons an in-flight column drag (pointer left, escape pressed).
    pub fn cancel_column_drag(&mut self) {
        self.column_drag = None;
    }

    // =========================================================================
    // Row drag
    // =========================================================================

    /// Starts dragging a row by identity.
    pub fn begin_row_drag(&mut self, row_key: RowKey) {
        self.row_drag = Some(RowDragGesture { row_key });
    }

    /// The row currently being dragged, if any.
    pub fn dragging_row(&self) -> Option<&RowKey> {
        self.row_drag.as_ref().map(|g| &g.row_key)
    }

    /// Drop on another row: yields `(source, target)` identities for the
    /// facade to apply to the row set. `None` on self-drop or no drag.
    pub fn drop_on_row(&mut self, target_key: &RowKey) -> Option<(RowKey, RowKey)> {
        let gesture = self.row_drag.take()?;
        if &gesture.row_key == target_key {
            return None;
        }
        Some((gesture.row_key, target_key.clone()))
    }

    /// Abandons an in-flight row drag.
    pub fn cancel_row_drag(&mut self) {
        self.row_drag = None;
    }
}
