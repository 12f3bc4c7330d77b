//! Row and column model for the data grid.
//!
//! This module provides the foundational types the processing pipeline
//! operates on:
//!
//! - `CellValue`: type-tagged cell data with filter coercions
//! - `GridRow` / `RowKey` / `RowSet`: row access, identity and storage
//! - `ColumnDef` / `InternalColumn` / `resolve_columns`: column declarations
//!   and width/order resolution
//! - `cell_value` / `format_cell` / `CellFormatter`: uniform cell access and
//!   per-column formatting capability
//!
//! # Example
//!
//! ```
//! use horizon_datagrid::model::{ColumnDef, resolve_columns};
//! use std::collections::HashMap;
//!
//! let columns = vec![
//!     ColumnDef::<serde_json::Value>::new("name", "Name").with_field("name"),
//!     ColumnDef::new("age", "Age").with_field("age").with_flex(1.0),
//! ];
//!
//! let order: Vec<String> = columns.iter().map(|c| c.key.clone()).collect();
//! let resolved = resolve_columns(&columns, Some(640.0), &order, &HashMap::new());
//! assert_eq!(resolved.len(), 2);
//! ```

pub mod accessor;
pub mod column;
pub mod row;
pub mod value;

pub use accessor::{CellFormatter, ClosureFormatter, DefaultFormatter, cell_value, format_cell};
pub use column::{
    ColumnDef, Comparator, DEFAULT_COLUMN_WIDTH, DEFAULT_MAX_WIDTH, DEFAULT_MIN_WIDTH, DataType,
    HorizontalAlign, InternalColumn, ValueFormatter, ValueGetter, resolve_columns,
};
pub use row::{GridRow, RowKey, RowKeyFn, RowSet, default_row_key};
pub use value::CellValue;
