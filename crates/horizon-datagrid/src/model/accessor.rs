//! Uniform cell access and formatting.
//!
//! All value extraction goes through [`cell_value`]: custom getter first,
//! then the declared row field, else `Null`. Absence never errors - a
//! missing field is an empty cell.
//!
//! Formatting is a per-column capability: [`resolve_columns`] selects a
//! [`CellFormatter`] implementation for each column at resolve time
//! (a [`ClosureFormatter`] when the column declares one, [`DefaultFormatter`]
//! otherwise), so rendering collaborators dispatch through one interface.
//!
//! [`resolve_columns`]: super::column::resolve_columns

use super::column::{ColumnDef, InternalColumn, ValueFormatter};
use super::row::GridRow;
use super::value::CellValue;

/// Extracts the cell value for a row/column pair.
///
/// Uses the column's `value_getter` if present, else reads the declared
/// `field`, else yields `CellValue::Null`.
pub fn cell_value<R: GridRow>(row: &R, col: &ColumnDef<R>) -> CellValue {
    if let Some(getter) = &col.value_getter {
        return getter(row);
    }
    match &col.field {
        Some(field) => row.field(field),
        None => CellValue::Null,
    }
}

/// Formats the cell value for a row/column pair using the column's resolved
/// formatting capability.
pub fn format_cell<R: GridRow>(row: &R, col: &InternalColumn<R>) -> String {
    let value = cell_value(row, &col.def);
    col.formatter.format(&value, row)
}

/// Per-column formatting capability.
///
/// Implementations turn a raw cell value into display text. The grid ships
/// [`DefaultFormatter`]; columns with a custom `value_formatter` get a
/// [`ClosureFormatter`] wrapping it.
pub trait CellFormatter<R>: Send + Sync {
    /// Formats a value extracted from `row`.
    fn format(&self, value: &CellValue, row: &R) -> String;
}

/// Default formatting: display string of the value, empty for `Null`.
pub struct DefaultFormatter;

impl<R> CellFormatter<R> for DefaultFormatter {
    fn format(&self, value: &CellValue, _row: &R) -> String {
        value.display_string()
    }
}

/// Formatting backed by a column's `value_formatter` closure.
pub struct ClosureFormatter<R> {
    formatter: ValueFormatter<R>,
}

impl<R> ClosureFormatter<R> {
    /// Wraps a value-formatter closure.
    pub fn new(formatter: ValueFormatter<R>) -> Self {
        Self { formatter }
    }
}

impl<R: Send + Sync> CellFormatter<R> for ClosureFormatter<R> {
    fn format(&self, value: &CellValue, row: &R) -> String {
        (self.formatter)(value, row)
    }
}
