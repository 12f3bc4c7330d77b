//! Error types for the grid engine.
//!
//! No error here is fatal to the engine: malformed data degrades inside the
//! pipeline (empty cells, excluded rows, no-op sorts) without surfacing at
//! all. `GridError` covers the interactive entry points that can be refused
//! outright - editing a non-editable column, resizing an unknown one.

use thiserror::Error;

use crate::model::RowKey;

/// Errors returned by interactive grid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The referenced column key is not in the column set.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The column is marked non-editable.
    #[error("column is not editable: {0}")]
    NotEditable(String),

    /// The column is marked non-resizable.
    #[error("column is not resizable: {0}")]
    NotResizable(String),

    /// The referenced row identity matched no row.
    #[error("row not found: {0}")]
    RowNotFound(RowKey),
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
