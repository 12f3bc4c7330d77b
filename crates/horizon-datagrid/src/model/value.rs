//! Cell values for the data grid.
//!
//! [`CellValue`] is the type-tagged container every cell access funnels
//! through. Columns extract a `CellValue` from a row, the filter engine
//! coerces it per data type, the sort engine compares it, and formatters
//! turn it into display text.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type-tagged container for cell data.
///
/// A cell can hold text, numbers, booleans or timestamps; `Null` represents
/// an absent value and renders as an empty string. Absence is a valid,
/// renderable state - extracting a missing field never fails.
///
/// # Example
///
/// ```
/// use horizon_datagrid::model::CellValue;
///
/// let value = CellValue::from("hello");
/// assert_eq!(value.as_str(), Some("hello"));
///
/// let missing = CellValue::Null;
/// assert_eq!(missing.display_string(), "");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum CellValue {
    /// No value.
    #[default]
    Null,
    /// String data.
    Text(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Timestamp data.
    Date(DateTime<Utc>),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a timestamp.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Coerces the value to a number for number-typed filtering.
    ///
    /// Integers, floats and booleans (1/0) convert directly; text is parsed;
    /// dates yield their millisecond timestamp. `None` means the value is
    /// not coercible and the row fails a number filter.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Date(d) => Some(d.timestamp_millis() as f64),
            CellValue::Null => None,
        }
    }

    /// Coerces the value to a millisecond timestamp for date-typed filtering.
    ///
    /// Dates convert directly, integers are taken as milliseconds since the
    /// epoch, text is parsed (RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
    /// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`). `None` means the value is not
    /// coercible and the row fails a date filter.
    pub fn as_timestamp_ms(&self) -> Option<i64> {
        match self {
            CellValue::Date(d) => Some(d.timestamp_millis()),
            CellValue::Int(n) => Some(*n),
            CellValue::Float(n) => Some(*n as i64),
            CellValue::Text(s) => parse_date_str(s).map(|d| d.timestamp_millis()),
            _ => None,
        }
    }

    /// Renders the value as display text. `Null` renders empty.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.to_rfc3339(),
        }
    }

    /// Default three-way comparison used when a column has no custom
    /// comparator.
    ///
    /// Same-type values compare naturally; ints and floats compare
    /// numerically across the two variants. Everything else (including any
    /// comparison involving `Null`) is treated as equal, so malformed data
    /// degrades to "unordered" instead of panicking.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Int(a), CellValue::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Float(a), CellValue::Int(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    /// Converts a JSON value into a cell value.
    ///
    /// JSON arrays and objects have no cell representation and become
    /// `Null`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            _ => CellValue::Null,
        }
    }

    /// Converts the cell value into a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Int(n) => serde_json::Value::from(*n),
            CellValue::Float(n) => serde_json::Value::from(*n),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Date(d) => serde_json::Value::String(d.to_rfc3339()),
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

/// Parses a date string in the formats the grid accepts.
fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Float(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(d: DateTime<Utc>) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}
