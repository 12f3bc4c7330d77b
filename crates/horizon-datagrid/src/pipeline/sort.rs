//! Single-column sorting.
//!
//! At most one `{key, direction}` pair is active; `None` preserves insertion
//! order. Header clicks cycle ascending, descending, unsorted. Sorting uses
//! `slice::sort_by`, which is stable: rows with equal sort keys keep their
//! relative order, and that property is guaranteed (and tested), not
//! incidental.

use serde::{Deserialize, Serialize};

use crate::model::accessor::cell_value;
use crate::model::column::InternalColumn;
use crate::model::row::{GridRow, RowSet};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// The active sort: one column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Key of the sorted column.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Creates a sort state.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// Computes the sort state following a header click on `key`.
///
/// With `forced` set (header menu "Sort ascending"/"Sort descending") the
/// direction applies outright. Otherwise clicking cycles: unsorted or a
/// different column starts ascending, ascending flips to descending, and
/// descending clears the sort.
pub fn next_sort_state(
    current: Option<&SortState>,
    key: &str,
    forced: Option<SortDirection>,
) -> Option<SortState> {
    if let Some(direction) = forced {
        return Some(SortState::new(key, direction));
    }
    match current {
        Some(state) if state.key == key => match state.direction {
            SortDirection::Asc => Some(SortState::new(key, SortDirection::Desc)),
            SortDirection::Desc => None,
        },
        _ => Some(SortState::new(key, SortDirection::Asc)),
    }
}

/// Sorts an ordered index sequence by the active sort state.
///
/// No-op when the state is `None`, names an unknown column, or names a
/// column with `sortable == false`. The column's custom comparator wins
/// when present; otherwise cell values compare with the default three-way
/// comparison. The descending direction negates the comparator's result.
pub fn sort_rows<R: GridRow>(
    rows: &RowSet<R>,
    mut input: Vec<usize>,
    sort: Option<&SortState>,
    columns: &[InternalColumn<R>],
) -> Vec<usize> {
    let Some(sort) = sort else {
        return input;
    };
    let Some(col) = columns.iter().find(|c| c.key() == sort.key) else {
        return input;
    };
    if !col.def.sortable {
        return input;
    }

    input.sort_by(|&ia, &ib| {
        let (Some(row_a), Some(row_b)) = (rows.get(ia), rows.get(ib)) else {
            return std::cmp::Ordering::Equal;
        };
        let a = cell_value(row_a, &col.def);
        let b = cell_value(row_b, &col.def);
        let ordering = match &col.def.comparator {
            Some(cmp) => cmp(&a, &b, row_a, row_b),
            None => a.compare(&b),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    input
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
            ColumnDef::<Row>::new("name", "Name").with_field("name"),
            ColumnDef::new("n", "N").with_field("n"),
            ColumnDef::new("frozen", "Frozen")
                .with_field("n")
                .with_sortable(false),
            ColumnDef::new("len", "Len")
                .with_field("name")
                .with_comparator(|a, b, _, _| {
                    a.display_string().len().cmp(&b.display_string().len())
                }),
        ];
        let order: Vec<String> = defs.iter().map(|c| c.key.clone()).collect();
        resolve_columns(&defs, None, &order, &HashMap::new())
    }

    fn rows() -> RowSet<Row> {
        let mut set = RowSet::new();
        set.replace_all(vec![
            json!({"id": 1, "n": 30, "name": "Charlie"}),
            json!({"id": 2, "n": 10, "name": "Al"}),
            json!({"id": 3, "n": 20, "name": "Bo"}),
        ]);
        set
    }

    fn names(rows: &RowSet<Row>, order: &[usize]) -> Vec<String> {
        order
            .iter()
            .map(|&i| rows.get(i).unwrap()["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sort_asc_desc() {
        let rows = rows();
        let cols = columns();
        let sorted = sort_rows(
            &rows,
            vec![0, 1, 2],
            Some(&SortState::new("n", SortDirection::Asc)),
            &cols,
        );
        assert_eq!(names(&rows, &sorted), vec!["Al", "Bo", "Charlie"]);

        let sorted = sort_rows(
            &rows,
            vec![0, 1, 2],
            Some(&SortState::new("n", SortDirection::Desc)),
            &cols,
        );
        assert_eq!(names(&rows, &sorted), vec!["Charlie", "Bo", "Al"]);
    }

    #[test]
    fn test_sort_noop_cases() {
        let rows = rows();
        let cols = columns();
        assert_eq!(sort_rows(&rows, vec![0, 1, 2], None, &cols), vec![0, 1, 2]);
        assert_eq!(
            sort_rows(
                &rows,
                vec![0, 1, 2],
                Some(&SortState::new("ghost", SortDirection::Asc)),
                &cols
            ),
            vec![0, 1, 2]
        );
        assert_eq!(
            sort_rows(
                &rows,
                vec![0, 1, 2],
                Some(&SortState::new("frozen", SortDirection::Asc)),
                &cols
            ),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_sort_idempotent() {
        let rows = rows();
        let cols = columns();
        let state = SortState::new("name", SortDirection::Asc);
        let once = sort_rows(&rows, vec![0, 1, 2], Some(&state), &cols);
        let twice = sort_rows(&rows, once.clone(), Some(&state), &cols);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_stable_for_ties() {
        // "Al" and "Bo" tie under the length comparator; their relative
        // order must survive.
        let rows = rows();
        let cols = columns();
        let sorted = sort_rows(
            &rows,
            vec![0, 1, 2],
            Some(&SortState::new("len", SortDirection::Asc)),
            &cols,
        );
        assert_eq!(names(&rows, &sorted), vec!["Al", "Bo", "Charlie"]);

        let sorted = sort_rows(
            &rows,
            vec![0, 2, 1],
            Some(&SortState::new("len", SortDirection::Asc)),
            &cols,
        );
        assert_eq!(names(&rows, &sorted), vec!["Bo", "Al", "Charlie"]);
    }

    #[test]
    fn test_click_cycle() {
        // Three clicks on one column cycle asc -> desc -> unsorted.
        let first = next_sort_state(None, "n", None);
        assert_eq!(first, Some(SortState::new("n", SortDirection::Asc)));
        let second = next_sort_state(first.as_ref(), "n", None);
        assert_eq!(second, Some(SortState::new("n", SortDirection::Desc)));
        let third = next_sort_state(second.as_ref(), "n", None);
        assert_eq!(third, None);

        // Clicking a different column restarts at ascending.
        let other = next_sort_state(second.as_ref(), "name", None);
        assert_eq!(other, Some(SortState::new("name", SortDirection::Asc)));
    }

    #[test]
    fn test_forced_direction() {
        let state = next_sort_state(None, "n", Some(SortDirection::Desc));
        assert_eq!(state, Some(SortState::new("n", SortDirection::Desc)));
    }
}
