//! Row identity and row storage.
//!
//! The grid never interprets row types directly; it goes through the
//! [`GridRow`] trait for field access and through a [`RowKey`] for identity.
//! Identity is the one contract an integrator must get right: selection,
//! editing and drag state are all keyed by it, and an unstable key silently
//! desyncs them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::value::CellValue;

/// Stable identity of a logical row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RowKey {
    /// String identity.
    Str(String),
    /// Integer identity.
    Int(i64),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Str(s) => write!(f, "{s}"),
            RowKey::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::Str(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey::Str(s)
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        RowKey::Int(n)
    }
}

impl From<i32> for RowKey {
    fn from(n: i32) -> Self {
        RowKey::Int(n as i64)
    }
}

/// The trait caller-owned row types implement to participate in the grid.
///
/// Only [`field`](GridRow::field) is required. `replace_field` opts a type
/// into cell editing (commit writes a modified *copy*; rows are never
/// mutated in place), and `fingerprint` opts it into structural identity
/// fallback.
///
/// # Example
///
/// ```
/// use horizon_datagrid::model::{CellValue, GridRow};
///
/// #[derive(Clone)]
/// struct Ticket {
///     id: i64,
///     title: String,
/// }
///
/// impl GridRow for Ticket {
///     fn field(&self, name: &str) -> CellValue {
///         match name {
///             "id" => CellValue::from(self.id),
///             "title" => CellValue::from(self.title.as_str()),
///             _ => CellValue::Null,
///         }
///     }
/// }
/// ```
pub trait GridRow: Clone + Send + Sync + 'static {
    /// Returns the value of the named field, or `CellValue::Null` if the
    /// row has no such field. Must not panic on unknown names.
    fn field(&self, name: &str) -> CellValue;

    /// Returns a copy of this row with the named field replaced.
    ///
    /// `None` means the row has no writable target for the field, in which
    /// case an edit commit on it is dropped. The default is read-only.
    fn replace_field(&self, _name: &str, _value: CellValue) -> Option<Self> {
        None
    }

    /// Returns a structural fingerprint used as an identity fallback when
    /// the row carries no `id`/`_id` field.
    ///
    /// Structurally identical rows collide; callers that cannot guarantee an
    /// `id` field should configure an explicit key function instead.
    fn fingerprint(&self) -> Option<String> {
        None
    }
}

/// Dynamic rows: any JSON object works as a grid row out of the box.
impl GridRow for serde_json::Value {
    fn field(&self, name: &str) -> CellValue {
        match self.get(name) {
            Some(v) => CellValue::from_json(v),
            None => CellValue::Null,
        }
    }

    fn replace_field(&self, name: &str, value: CellValue) -> Option<Self> {
        let mut copy = self.clone();
        let obj = copy.as_object_mut()?;
        obj.insert(name.to_string(), value.to_json());
        Some(copy)
    }

    fn fingerprint(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        serde_json::to_string(self).ok()
    }
}

/// A row-identity function supplied by the integrator.
pub type RowKeyFn<R> = Arc<dyn Fn(&R) -> RowKey + Send + Sync>;

/// Derives a row's identity when no explicit key function is configured.
///
/// Resolution order: field `id`, field `_id`, structural fingerprint, and
/// finally a random token (for rows with no structure at all). The
/// fingerprint step is collision-prone for structurally identical rows and
/// the random token is unstable across calls - both are documented degraded
/// states, not errors.
pub fn default_row_key<R: GridRow>(row: &R) -> RowKey {
    for name in ["id", "_id"] {
        match row.field(name) {
            CellValue::Int(n) => return RowKey::Int(n),
            CellValue::Text(s) => return RowKey::Str(s),
            CellValue::Float(n) => return RowKey::Str(n.to_string()),
            _ => {}
        }
    }
    if let Some(fp) = row.fingerprint() {
        return RowKey::Str(fp);
    }
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    RowKey::Str(token)
}

/// Row storage: an arena of rows plus a key-to-index map.
///
/// The map makes identity-based operations (edit replace, selection
/// materialization, drag reorder) O(1) lookups instead of O(n) scans.
/// Keys are computed once per row on insert and cached alongside the arena.
pub struct RowSet<R: GridRow> {
    rows: Vec<R>,
    keys: Vec<RowKey>,
    index: HashMap<RowKey, usize>,
    key_fn: RowKeyFn<R>,
}

impl<R: GridRow> RowSet<R> {
    /// Creates an empty row set using the default identity chain.
    pub fn new() -> Self {
        Self::with_key_fn(Arc::new(default_row_key))
    }

    /// Creates an empty row set with an explicit identity function.
    pub fn with_key_fn(key_fn: RowKeyFn<R>) -> Self {
        Self {
            rows: Vec::new(),
            keys: Vec::new(),
            index: HashMap::new(),
            key_fn,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the set holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in source order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// The row at `index`.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    /// The cached key of the row at `index`.
    pub fn key_at(&self, index: usize) -> Option<&RowKey> {
        self.keys.get(index)
    }

    /// The arena index of the row with the given key.
    pub fn index_of(&self, key: &RowKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Computes the key the configured identity function yields for a row.
    pub fn key_of(&self, row: &R) -> RowKey {
        (self.key_fn)(row)
    }

    /// Replaces the entire row collection, recomputing keys and the index.
    pub fn replace_all(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.rebuild_index();
    }

    /// Appends rows to the end of the arena (infinite-scroll loads).
    pub fn append(&mut self, rows: Vec<R>) {
        self.rows.extend(rows);
        self.rebuild_index();
    }

    /// Replaces the row with the given key by a new row object, keeping its
    /// position. Returns `false` if the key is unknown.
    pub fn replace_row(&mut self, key: &RowKey, row: R) -> bool {
        let Some(idx) = self.index_of(key) else {
            return false;
        };
        self.rows[idx] = row;
        true
    }

    /// Moves the row identified by `from` to the position currently held by
    /// `to`. Returns `false` when either key is unknown or they are equal.
    pub fn move_row(&mut self, from: &RowKey, to: &RowKey) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_idx), Some(to_idx)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let row = self.rows.remove(from_idx);
        let key = self.keys.remove(from_idx);
        self.rows.insert(to_idx, row);
        self.keys.insert(to_idx, key);
        // Positions shifted for every row between the two slots.
        self.index.clear();
        for (i, k) in self.keys.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
        true
    }

    fn rebuild_index(&mut self) {
        self.keys = self.rows.iter().map(|r| (self.key_fn)(r)).collect();
        self.index.clear();
        self.index.reserve(self.keys.len());
        for (i, key) in self.keys.iter().enumerate() {
            if self.index.insert(key.clone(), i).is_some() {
                // Duplicate identities degrade selection/edit accuracy; the
                // last occurrence wins for lookups.
                tracing::warn!(
                    target: "horizon_datagrid::model",
                    key = %key,
                    "duplicate row key"
                );
            }
        }
    }
}

impl<R: GridRow> Default for RowSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<serde_json::Value> {
        vec![
            json!({"id": 1, "name": "A"}),
            json!({"id": 2, "name": "B"}),
            json!({"id": 3, "name": "C"}),
        ]
    }

    #[test]
    fn test_default_row_key_chain() {
        assert_eq!(
            default_row_key(&json!({"id": 7, "x": 1})),
            RowKey::Int(7)
        );
        assert_eq!(
            default_row_key(&json!({"id": "abc"})),
            RowKey::from("abc")
        );
        assert_eq!(
            default_row_key(&json!({"_id": 9})),
            RowKey::Int(9)
        );
        // Structural fallback.
        assert_eq!(
            default_row_key(&json!({"x": 1})),
            RowKey::Str(json!({"x": 1}).to_string())
        );
        // Null rows get a random token; two calls differ.
        let a = default_row_key(&serde_json::Value::Null);
        let b = default_row_key(&serde_json::Value::Null);
        assert_ne!(a, b);
    }

    #[test]
    fn test_index_lookup() {
        let mut set = RowSet::new();
        set.replace_all(rows());
        assert_eq!(set.len(), 3);
        assert_eq!(set.index_of(&RowKey::Int(2)), Some(1));
        assert_eq!(set.key_at(0), Some(&RowKey::Int(1)));
        assert_eq!(set.index_of(&RowKey::Int(99)), None);
    }

    #[test]
    fn test_replace_row_keeps_position() {
        let mut set = RowSet::new();
        set.replace_all(rows());
        assert!(set.replace_row(&RowKey::Int(2), json!({"id": 2, "name": "B2"})));
        assert_eq!(set.get(1).unwrap()["name"], "B2");
        assert!(!set.replace_row(&RowKey::Int(42), json!({"id": 42})));
    }

    #[test]
    fn test_move_row() {
        let mut set = RowSet::new();
        set.replace_all(rows());
        assert!(set.move_row(&RowKey::Int(1), &RowKey::Int(3)));
        let names: Vec<_> = set.rows().iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("B"), json!("C"), json!("A")]);
        // Index follows the move.
        assert_eq!(set.index_of(&RowKey::Int(1)), Some(2));
        // Self-move and unknown keys are no-ops.
        assert!(!set.move_row(&RowKey::Int(2), &RowKey::Int(2)));
        assert!(!set.move_row(&RowKey::Int(2), &RowKey::Int(42)));
    }

    #[test]
    fn test_append() {
        let mut set = RowSet::new();
        set.replace_all(rows());
        set.append(vec![json!({"id": 4, "name": "D"})]);
        assert_eq!(set.len(), 4);
        assert_eq!(set.index_of(&RowKey::Int(4)), Some(3));
    }

    #[test]
    fn test_custom_key_fn() {
        let set: RowSet<serde_json::Value> = RowSet::with_key_fn(Arc::new(|row| {
            RowKey::Str(row["name"].as_str().unwrap_or_default().to_string())
        }));
        assert_eq!(set.key_of(&json!({"name": "Z"})), RowKey::from("Z"));
    }
}
