//! Column definitions and width resolution.
//!
//! A [`ColumnDef`] is the caller's declaration of one column: identity,
//! header text, how to pull a value out of a row, sizing constraints and
//! behavior flags. [`resolve_columns`] turns the declared set into
//! [`InternalColumn`]s with resolved pixel widths and order positions; it is
//! a pure function of its inputs and runs again whenever the column set,
//! container width, order or a width override changes.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::accessor::{CellFormatter, ClosureFormatter, DefaultFormatter};
use super::row::GridRow;
use super::value::CellValue;

/// Data type of a column, scoping filter operators and editor choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Free text (the default; also the fallback for filter evaluation).
    #[default]
    Text,
    /// Numeric values.
    Number,
    /// Timestamps.
    Date,
    /// Booleans.
    Boolean,
    /// One of a fixed set of choices (see [`ColumnDef::filter_options`]).
    Select,
}

/// Horizontal alignment hint for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    /// Align to the left edge (default).
    #[default]
    Left,
    /// Align to the center.
    Center,
    /// Align to the end edge.
    End,
}

/// Extracts a cell value from a row.
pub type ValueGetter<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Formats a cell value for display.
pub type ValueFormatter<R> = Arc<dyn Fn(&CellValue, &R) -> String + Send + Sync>;

/// Custom three-way comparison for sorting: `(a, b, row_a, row_b)`.
pub type Comparator<R> = Arc<dyn Fn(&CellValue, &CellValue, &R, &R) -> Ordering + Send + Sync>;

/// Default width for a column with no explicit width.
pub const DEFAULT_COLUMN_WIDTH: f32 = 160.0;
/// Minimum resolved width when the column declares none.
pub const DEFAULT_MIN_WIDTH: f32 = 80.0;
/// Maximum resolved width when the column declares none.
pub const DEFAULT_MAX_WIDTH: f32 = 800.0;

/// Declaration of one grid column.
///
/// `key` must be unique within a column set and stable across renders. A
/// column with neither `field` nor `value_getter` always yields
/// `CellValue::Null` (an empty cell, not an error).
///
/// # Example
///
/// ```
/// use horizon_datagrid::model::{ColumnDef, DataType};
///
/// let col: ColumnDef<serde_json::Value> = ColumnDef::new("age", "Age")
///     .with_field("age")
///     .with_data_type(DataType::Number)
///     .with_width(90.0);
/// ```
pub struct ColumnDef<R> {
    /// Unique, stable column identity.
    pub key: String,
    /// Header display text.
    pub header_name: String,
    /// Property name on the row, used when no `value_getter` is set.
    pub field: Option<String>,
    /// Explicit width in pixels.
    pub width: Option<f32>,
    /// Minimum width in pixels (defaults to [`DEFAULT_MIN_WIDTH`]).
    pub min_width: Option<f32>,
    /// Maximum width in pixels (defaults to [`DEFAULT_MAX_WIDTH`]).
    pub max_width: Option<f32>,
    /// Flex grow weight for distributing leftover container space.
    pub flex: Option<f32>,
    /// Data type, scoping filter operators.
    pub data_type: DataType,
    /// Whether the column participates in sorting.
    pub sortable: bool,
    /// Whether the column participates in filtering and quick search.
    pub filterable: bool,
    /// Whether the column can be resized interactively.
    pub resizable: bool,
    /// Whether cells in this column can be edited.
    pub editable: bool,
    /// Horizontal alignment hint.
    pub hoz_align: HorizontalAlign,
    /// Choices offered by a `Select`-typed filter editor.
    pub filter_options: Vec<CellValue>,
    /// Custom value extraction, taking precedence over `field`.
    pub value_getter: Option<ValueGetter<R>>,
    /// Custom display formatting.
    pub value_formatter: Option<ValueFormatter<R>>,
    /// Custom sort comparator.
    pub comparator: Option<Comparator<R>>,
}

impl<R> ColumnDef<R> {
    /// Creates a column with the given key and header text. All behavior
    /// flags default to enabled.
    pub fn new(key: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header_name: header_name.into(),
            field: None,
            width: None,
            min_width: None,
            max_width: None,
            flex: None,
            data_type: DataType::default(),
            sortable: true,
            filterable: true,
            resizable: true,
            editable: true,
            hoz_align: HorizontalAlign::default(),
            filter_options: Vec::new(),
            value_getter: None,
            value_formatter: None,
            comparator: None,
        }
    }

    /// Sets the row property this column reads (and writes on edit commit).
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets an explicit pixel width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the minimum pixel width.
    pub fn with_min_width(mut self, width: f32) -> Self {
        self.min_width = Some(width);
        self
    }

    /// Sets the maximum pixel width.
    pub fn with_max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Sets the flex grow weight.
    pub fn with_flex(mut self, flex: f32) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Sets the data type.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets the horizontal alignment hint.
    pub fn with_hoz_align(mut self, align: HorizontalAlign) -> Self {
        self.hoz_align = align;
        self
    }

    /// Sets the choices offered by a select-typed filter editor.
    pub fn with_filter_options(mut self, options: Vec<CellValue>) -> Self {
        self.filter_options = options;
        self
    }

    /// Sets whether the column participates in sorting.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column participates in filtering and quick search.
    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets whether the column can be resized interactively.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Sets whether cells in this column can be edited.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets a custom value extractor, taking precedence over `field`.
    pub fn with_value_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.value_getter = Some(Arc::new(getter));
        self
    }

    /// Sets a custom display formatter.
    pub fn with_value_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellValue, &R) -> String + Send + Sync + 'static,
    {
        self.value_formatter = Some(Arc::new(formatter));
        self
    }

    /// Sets a custom sort comparator.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&CellValue, &CellValue, &R, &R) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    fn clamp_width(&self, width: f32) -> f32 {
        width
            .max(self.min_width.unwrap_or(DEFAULT_MIN_WIDTH))
            .min(self.max_width.unwrap_or(DEFAULT_MAX_WIDTH))
    }
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header_name: self.header_name.clone(),
            field: self.field.clone(),
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            flex: self.flex,
            data_type: self.data_type,
            sortable: self.sortable,
            filterable: self.filterable,
            resizable: self.resizable,
            editable: self.editable,
            hoz_align: self.hoz_align,
            filter_options: self.filter_options.clone(),
            value_getter: self.value_getter.clone(),
            value_formatter: self.value_formatter.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("header_name", &self.header_name)
            .field("field", &self.field)
            .field("width", &self.width)
            .field("flex", &self.flex)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

/// A column with resolved geometry, produced by [`resolve_columns`].
///
/// Recomputed on every column/width/order change; never persisted.
pub struct InternalColumn<R> {
    /// The source definition.
    pub def: ColumnDef<R>,
    /// Resolved pixel width.
    pub computed_width: f32,
    /// Position in the visible order.
    pub position: usize,
    /// The formatting capability selected for this column.
    pub formatter: Arc<dyn CellFormatter<R>>,
}

impl<R> Clone for InternalColumn<R> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            computed_width: self.computed_width,
            position: self.position,
            formatter: self.formatter.clone(),
        }
    }
}

impl<R> fmt::Debug for InternalColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalColumn")
            .field("key", &self.def.key)
            .field("computed_width", &self.computed_width)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<R> InternalColumn<R> {
    /// The column's key.
    pub fn key(&self) -> &str {
        &self.def.key
    }
}

/// Resolves declared columns into width-resolved, ordered internal columns.
///
/// - Order follows `order`; entries naming no declared column are dropped
///   silently, and declared columns missing from `order` are appended in
///   declaration order.
/// - `overrides` (interactive resize results) win verbatim, clamped into
///   the column's `[min, max]` range.
/// - Otherwise the explicit width applies, or [`DEFAULT_COLUMN_WIDTH`] when
///   the container has not been measured yet.
/// - Positive leftover container space is distributed across flex columns
///   proportionally to their flex weights, clamped the same way.
pub fn resolve_columns<R: GridRow>(
    defs: &[ColumnDef<R>],
    container_width: Option<f32>,
    order: &[String],
    overrides: &HashMap<String, f32>,
) -> Vec<InternalColumn<R>> {
    let mut ordered: Vec<&ColumnDef<R>> = order
        .iter()
        .filter_map(|key| defs.iter().find(|c| &c.key == key))
        .collect();
    for def in defs {
        if !order.contains(&def.key) {
            ordered.push(def);
        }
    }

    let total_flex: f32 = ordered.iter().filter_map(|c| c.flex).sum();
    let explicit_sum: f32 = ordered.iter().map(|c| c.width.unwrap_or(0.0)).sum();

    ordered
        .into_iter()
        .enumerate()
        .map(|(position, def)| {
            let computed_width = if let Some(&override_width) = overrides.get(&def.key) {
                def.clamp_width(override_width)
            } else if let (Some(container), Some(flex)) = (container_width, def.flex)
                && total_flex > 0.0
            {
                let leftover = (container - explicit_sum).max(0.0);
                let share = leftover * flex / total_flex;
                def.clamp_width(def.width.unwrap_or(0.0) + share)
            } else {
                def.width.unwrap_or(DEFAULT_COLUMN_WIDTH)
            };

            let formatter: Arc<dyn CellFormatter<R>> = match &def.value_formatter {
                Some(f) => Arc::new(ClosureFormatter::new(f.clone())),
                None => Arc::new(DefaultFormatter),
            };

            InternalColumn {
                def: def.clone(),
                computed_width,
                position,
                formatter,
            }
        })
        .collect()
}
