//! Single-level row grouping.
//!
//! The group-by configuration is list-typed, but only the first key
//! partitions rows - there is no nesting even when more keys are present.
//! This is a documented limitation of the engine, not an oversight to fix
//! silently.
//!
//! Buckets appear in first-seen order of their key values over the
//! filtered+sorted sequence. Grouped mode renders in full: pagination and
//! the virtualization window do not apply, which bounds its usefulness for
//! very large grouped sets.

use std::collections::HashMap;

use crate::model::accessor::cell_value;
use crate::model::column::InternalColumn;
use crate::model::row::{GridRow, RowSet};

/// One bucket of rows sharing a group-key value.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    /// Stringified group-key value.
    pub key: String,
    /// Member rows as arena indices, in processed order.
    pub rows: Vec<usize>,
    /// Whether the bucket is expanded.
    pub expanded: bool,
}

/// Grouping state: the internally accumulated key list (built by dropping
/// column headers onto the group panel) and per-bucket expand flags.
///
/// Groups default to expanded, except immediately after the grouping key
/// set changes to a different non-empty set: then every bucket starts
/// collapsed until toggled.
pub struct GroupEngine {
    /// Keys accumulated through group-panel drops.
    internal_keys: Vec<String>,
    /// Explicit configuration; wins over the internal list when non-empty.
    explicit_keys: Vec<String>,
    /// Expand flags by group-key value.
    expanded: HashMap<String, bool>,
    /// Default expand state for buckets with no recorded flag.
    default_expanded: bool,
}

impl Default for GroupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupEngine {
    /// Creates an inactive group engine.
    pub fn new() -> Self {
        Self {
            internal_keys: Vec::new(),
            explicit_keys: Vec::new(),
            expanded: HashMap::new(),
            default_expanded: true,
        }
    }

    /// The effective key list: explicit configuration when non-empty, else
    /// the internally accumulated list.
    pub fn effective_keys(&self) -> &[String] {
        if self.explicit_keys.is_empty() {
            &self.internal_keys
        } else {
            &self.explicit_keys
        }
    }

    /// Returns `true` when grouping is active.
    pub fn is_active(&self) -> bool {
        !self.effective_keys().is_empty()
    }

    /// Sets the explicit group-by configuration.
    pub fn set_explicit_keys(&mut self, keys: Vec<String>) {
        let before = self.effective_keys().to_vec();
        self.explicit_keys = keys;
        self.on_keys_changed(&before);
    }

    /// Appends a key to the internal list (group-panel drop). Idempotent.
    /// Returns `true` if the list changed.
    pub fn add_key(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.internal_keys.contains(&key) {
            return false;
        }
        let before = self.effective_keys().to_vec();
        self.internal_keys.push(key);
        self.on_keys_changed(&before);
        true
    }

    /// Removes a key from the internal list (group-chip removal). Returns
    /// `true` if the list changed.
    pub fn remove_key(&mut self, key: &str) -> bool {
        let Some(pos) = self.internal_keys.iter().position(|k| k == key) else {
            return false;
        };
        let before = self.effective_keys().to_vec();
        self.internal_keys.remove(pos);
        self.on_keys_changed(&before);
        true
    }

    /// Whether the bucket with the given key value is expanded.
    pub fn is_expanded(&self, group_key: &str) -> bool {
        self.expanded
            .get(group_key)
            .copied()
            .unwrap_or(self.default_expanded)
    }

    /// Toggles one bucket's expand flag.
    pub fn toggle(&mut self, group_key: &str) {
        let next = !self.is_expanded(group_key);
        self.expanded.insert(group_key.to_string(), next);
    }

    /// Partitions a processed index sequence into buckets by the first
    /// effective key. Returns `None` when grouping is inactive or the key
    /// names no resolved column.
    pub fn partition<R: GridRow>(
        &self,
        rows: &RowSet<R>,
        processed: &[usize],
        columns: &[InternalColumn<R>],
    ) -> Option<Vec<RowGroup>> {
        let key = self.effective_keys().first()?;
        let col = columns.iter().find(|c| c.key() == key)?;

        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        for &idx in processed {
            let Some(row) = rows.get(idx) else { continue };
            let value = cell_value(row, &col.def).display_string();
            if !buckets.contains_key(&value) {
                order.push(value.clone());
            }
            buckets.entry(value).or_default().push(idx);
        }

        tracing::trace!(
            target: "horizon_datagrid::pipeline",
            key = %key,
            groups = order.len(),
            "partitioned rows"
        );

        Some(
            order
                .into_iter()
                .map(|value| {
                    let rows = buckets.remove(&value).unwrap_or_default();
                    let expanded = self.is_expanded(&value);
                    RowGroup {
                        key: value,
                        rows,
                        expanded,
                    }
                })
                .collect(),
        )
    }

    fn on_keys_changed(&mut self, before: &[String]) {
        let after = self.effective_keys();
        if after != before && !after.is_empty() {
            // A new grouping starts collapsed.
            self.expanded.clear();
            self.default_expanded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{ColumnDef, resolve_columns};
    use serde_json::json;
    use std::collections::HashMap;

    type Row = serde_json::Value;

    fn columns() -> Vec<InternalColumn<Row>> {
        let defs = vec![
            ColumnDef::<Row>::new("city", "City").with_field("city"),
            ColumnDef::new("name", "Name").with_field("name"),
        ];
        let order: Vec<String> = defs.iter().map(|c| c.key.clone()).collect();
        resolve_columns(&defs, None, &order, &HashMap::new())
    }

    fn rows() -> RowSet<Row> {
        let mut set = RowSet::new();
        set.replace_all(vec![
            json!({"id": 1, "city": "Oslo", "name": "A"}),
            json!({"id": 2, "city": "Lima", "name": "B"}),
            json!({"id": 3, "city": "Oslo", "name": "C"}),
            json!({"id": 4, "city": "Lima", "name": "D"}),
        ]);
        set
    }

    #[test]
    fn test_partition_first_seen_order() {
        let mut engine = GroupEngine::new();
        engine.add_key("city");
        let rows = rows();
        let groups = engine
            .partition(&rows, &[0, 1, 2, 3], &columns())
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Oslo");
        assert_eq!(groups[0].rows, vec![0, 2]);
        assert_eq!(groups[1].key, "Lima");
        assert_eq!(groups[1].rows, vec![1, 3]);
    }

    #[test]
    fn test_partition_is_set_partition() {
        let mut engine = GroupEngine::new();
        engine.add_key("city");
        let rows = rows();
        let processed = vec![3, 0, 2, 1];
        let groups = engine.partition(&rows, &processed, &columns()).unwrap();
        let total: usize = groups.iter().map(|g| g.rows.len()).sum();
        assert_eq!(total, processed.len());
        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.rows.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_only_first_key_partitions() {
        let mut engine = GroupEngine::new();
        engine.add_key("city");
        engine.add_key("name");
        let rows = rows();
        let groups = engine.partition(&rows, &[0, 1, 2, 3], &columns()).unwrap();
        // Partitioned by city only, never nested by name.
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_inactive_and_unknown_key() {
        let engine = GroupEngine::new();
        let rows = rows();
        assert!(engine.partition(&rows, &[0], &columns()).is_none());

        let mut engine = GroupEngine::new();
        engine.add_key("ghost");
        assert!(engine.partition(&rows, &[0], &columns()).is_none());
    }

    #[test]
    fn test_regroup_collapses_everything() {
        let mut engine = GroupEngine::new();
        engine.add_key("city");
        // Fresh grouping: collapsed by default.
        assert!(!engine.is_expanded("Oslo"));
        engine.toggle("Oslo");
        assert!(engine.is_expanded("Oslo"));

        // Changing the key set resets all expand flags to collapsed.
        engine.add_key("name");
        assert!(!engine.is_expanded("Oslo"));
    }

    #[test]
    fn test_add_key_idempotent() {
        let mut engine = GroupEngine::new();
        assert!(engine.add_key("city"));
        assert!(!engine.add_key("city"));
        assert_eq!(engine.effective_keys(), ["city"]);
        assert!(engine.remove_key("city"));
        assert!(!engine.remove_key("city"));
        assert!(!engine.is_active());
    }

    #[test]
    fn test_explicit_keys_win() {
        let mut engine = GroupEngine::new();
        engine.add_key("name");
        engine.set_explicit_keys(vec!["city".to_string()]);
        assert_eq!(engine.effective_keys(), ["city"]);
        engine.set_explicit_keys(Vec::new());
        assert_eq!(engine.effective_keys(), ["name"]);
    }
}
