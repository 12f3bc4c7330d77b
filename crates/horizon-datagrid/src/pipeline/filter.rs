//! Structured per-column filters and the global quick filter.
//!
//! Filters are evaluated per data type: number and date columns coerce the
//! raw cell value first and exclude the row when coercion fails; everything
//! else evaluates as lower-cased text. Filters across columns AND-combine.
//! An operator that is not defined for the column's data type excludes the
//! row - that case is an explicit match arm, not a silent fall-through.
//!
//! Filtering never mutates rows; stages map an ordered sequence of arena
//! indices to a filtered sequence, preserving relative order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::accessor::cell_value;
use crate::model::column::{DataType, InternalColumn};
use crate::model::row::{GridRow, RowSet};
use crate::model::value::CellValue;

/// Filter predicate operator.
///
/// Which operators apply depends on the column's data type:
///
/// - number: `Equals`, `Gt`, `Gte`, `Lt`, `Lte`, `Between`
/// - date: `Equals`, `Before`, `After`, `Between`
/// - text (and every other type): `Contains`, `NotContains`, `Equals`,
///   `NotEquals`, `StartsWith`, `EndsWith`, `Blank`, `NotBlank`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Substring match (text default).
    #[default]
    Contains,
    /// Negated substring match.
    NotContains,
    /// Exact match. For dates this is exact-millisecond equality, which is
    /// brittle for date-only values; kept strict deliberately.
    Equals,
    /// Negated exact match.
    NotEquals,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Value renders as the empty string.
    Blank,
    /// Value renders as a non-empty string.
    NotBlank,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Inclusive range: `value <= x <= extra`.
    Between,
    /// Strictly earlier than.
    Before,
    /// Strictly later than.
    After,
}

/// One column's filter: operator plus operand(s).
///
/// `extra` is consulted only by the `Between` operator (the upper bound).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterModel {
    /// The predicate operator.
    pub operator: FilterOperator,
    /// The operand.
    #[serde(default)]
    pub value: CellValue,
    /// Upper bound for `Between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<CellValue>,
}

impl FilterModel {
    /// Creates a filter with the given operator and operand.
    pub fn new(operator: FilterOperator, value: impl Into<CellValue>) -> Self {
        Self {
            operator,
            value: value.into(),
            extra: None,
        }
    }

    /// Creates an inclusive range filter.
    pub fn between(low: impl Into<CellValue>, high: impl Into<CellValue>) -> Self {
        Self {
            operator: FilterOperator::Between,
            value: low.into(),
            extra: Some(high.into()),
        }
    }
}

/// The active filter set: column key to filter model, AND-combined.
///
/// A key with no entry means the column is unfiltered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<String, FilterModel>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears one column's filter.
    pub fn set(&mut self, key: impl Into<String>, filter: Option<FilterModel>) {
        let key = key.into();
        match filter {
            Some(f) => {
                self.filters.insert(key, f);
            }
            None => {
                self.filters.remove(&key);
            }
        }
    }

    /// Removes one column's filter.
    pub fn clear_column(&mut self, key: &str) {
        self.filters.remove(key);
    }

    /// Removes every filter.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// The filter on the given column, if any.
    pub fn get(&self, key: &str) -> Option<&FilterModel> {
        self.filters.get(key)
    }

    /// Returns `true` if no column is filtered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Iterates over `(column key, filter)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterModel)> {
        self.filters.iter()
    }
}

/// Applies the per-column structured filters to an ordered index sequence.
///
/// A filter keyed to a column absent from the resolved set is ignored.
pub fn apply_column_filters<R: GridRow>(
    rows: &RowSet<R>,
    input: Vec<usize>,
    filters: &FilterSet,
    columns: &[InternalColumn<R>],
) -> Vec<usize> {
    if filters.is_empty() {
        return input;
    }

    let active: Vec<(&InternalColumn<R>, &FilterModel)> = filters
        .iter()
        .filter_map(|(key, f)| columns.iter().find(|c| c.key() == key).map(|c| (c, f)))
        .collect();
    if active.is_empty() {
        return input;
    }

    let before = input.len();
    let out: Vec<usize> = input
        .into_iter()
        .filter(|&idx| {
            let Some(row) = rows.get(idx) else {
                return false;
            };
            active
                .iter()
                .all(|(col, filter)| row_passes_filter(row, col, filter))
        })
        .collect();
    tracing::trace!(
        target: "horizon_datagrid::pipeline",
        before,
        after = out.len(),
        "applied column filters"
    );
    out
}

/// Applies the global quick filter: case-insensitive substring match against
/// every filterable column, row matches if any column matches.
pub fn apply_quick_filter<R: GridRow>(
    rows: &RowSet<R>,
    input: Vec<usize>,
    needle: &str,
    columns: &[InternalColumn<R>],
) -> Vec<usize> {
    if needle.is_empty() {
        return input;
    }
    let needle = needle.to_lowercase();
    input
        .into_iter()
        .filter(|&idx| {
            let Some(row) = rows.get(idx) else {
                return false;
            };
            columns.iter().any(|col| {
                col.def.filterable
                    && cell_value(row, &col.def)
                        .display_string()
                        .to_lowercase()
                        .contains(&needle)
            })
        })
        .collect()
}

/// Evaluates a single filter against a single row.
fn row_passes_filter<R: GridRow>(
    row: &R,
    col: &InternalColumn<R>,
    filter: &FilterModel,
) -> bool {
    let raw = cell_value(row, &col.def);
    match col.def.data_type {
        DataType::Number => number_passes(&raw, filter),
        DataType::Date => date_passes(&raw, filter),
        // Text, Boolean and Select all evaluate as text.
        _ => text_passes(&raw, filter),
    }
}

fn number_passes(raw: &CellValue, filter: &FilterModel) -> bool {
    // A non-coercible cell fails the filter outright.
    let Some(num) = raw.as_number() else {
        return false;
    };
    let Some(target) = filter.value.as_number() else {
        return false;
    };
    match filter.operator {
        FilterOperator::Equals => num == target,
        FilterOperator::Gt => num > target,
        FilterOperator::Gte => num >= target,
        FilterOperator::Lt => num < target,
        FilterOperator::Lte => num <= target,
        FilterOperator::Between => match filter.extra.as_ref().and_then(CellValue::as_number) {
            Some(high) => num >= target && num <= high,
            None => false,
        },
        // Operator undefined for numbers: exclude the row.
        _ => false,
    }
}

fn date_passes(raw: &CellValue, filter: &FilterModel) -> bool {
    let Some(ts) = raw.as_timestamp_ms() else {
        return false;
    };
    let Some(target) = filter.value.as_timestamp_ms() else {
        return false;
    };
    match filter.operator {
        FilterOperator::Equals => ts == target,
        FilterOperator::Before => ts < target,
        FilterOperator::After => ts > target,
        FilterOperator::Between => {
            match filter.extra.as_ref().and_then(CellValue::as_timestamp_ms) {
                Some(high) => ts >= target && ts <= high,
                None => false,
            }
        }
        // Operator undefined for dates: exclude the row.
        _ => false,
    }
}

fn text_passes(raw: &CellValue, filter: &FilterModel) -> bool {
    let haystack = raw.display_string().to_lowercase();
    match filter.operator {
        FilterOperator::Blank => return haystack.is_empty(),
        FilterOperator::NotBlank => return !haystack.is_empty(),
        _ => {}
    }
    let needle = filter.value.display_string().to_lowercase();
    match filter.operator {
        FilterOperator::Contains => haystack.contains(&needle),
        FilterOperator::NotContains => !haystack.contains(&needle),
        FilterOperator::Equals => haystack == needle,
        FilterOperator::NotEquals => haystack != needle,
        FilterOperator::StartsWith => haystack.starts_with(&needle),
        FilterOperator::EndsWith => haystack.ends_with(&needle),
        // Operator undefined for text: exclude the row.
        _ => false,
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
            ColumnDef::<Row>::new("name", "Name").with_field("name"),
            ColumnDef::new("n", "N")
                .with_field("n")
                .with_data_type(DataType::Number),
            ColumnDef::new("when", "When")
                .with_field("when")
                .with_data_type(DataType::Date),
            ColumnDef::new("secret", "Secret")
                .with_field("secret")
                .with_filterable(false),
        ];
        let order: Vec<String> = defs.iter().map(|c| c.key.clone()).collect();
        resolve_columns(&defs, None, &order, &HashMap::new())
    }

    fn rows() -> RowSet<Row> {
        let mut set = RowSet::new();
        set.replace_all(vec![
            json!({"id": 1, "n": 5, "name": "Apple", "when": "2024-01-01", "secret": "zzz"}),
            json!({"id": 2, "n": 15, "name": "Banana", "when": "2024-06-15", "secret": "apple"}),
            json!({"id": 3, "n": "oops", "name": "Cherry", "when": "bad-date"}),
            json!({"id": 4, "name": ""}),
        ]);
        set
    }

    fn run(filters: &FilterSet) -> Vec<usize> {
        let rows = rows();
        let all: Vec<usize> = (0..rows.len()).collect();
        apply_column_filters(&rows, all, filters, &columns())
    }

    #[test]
    fn test_number_gt() {
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::new(FilterOperator::Gt, 10)));
        // Row 3 has a non-numeric n, row 4 has none: both excluded.
        assert_eq!(run(&filters), vec![1]);
    }

    #[test]
    fn test_number_between() {
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::between(5, 15)));
        assert_eq!(run(&filters), vec![0, 1]);

        // Missing upper bound excludes everything.
        filters.set("n", Some(FilterModel::new(FilterOperator::Between, 5)));
        assert_eq!(run(&filters), Vec::<usize>::new());
    }

    #[test]
    fn test_number_rejects_text_operator() {
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::new(FilterOperator::Contains, "5")));
        assert_eq!(run(&filters), Vec::<usize>::new());
    }

    #[test]
    fn test_date_before_after() {
        let mut filters = FilterSet::new();
        filters.set(
            "when",
            Some(FilterModel::new(FilterOperator::Before, "2024-03-01")),
        );
        assert_eq!(run(&filters), vec![0]);

        filters.set(
            "when",
            Some(FilterModel::new(FilterOperator::After, "2024-03-01")),
        );
        assert_eq!(run(&filters), vec![1]);
    }

    #[test]
    fn test_date_equals_is_millisecond_strict() {
        let mut filters = FilterSet::new();
        filters.set(
            "when",
            Some(FilterModel::new(FilterOperator::Equals, "2024-01-01")),
        );
        // Midnight-to-midnight comparison matches the date-only cell.
        assert_eq!(run(&filters), vec![0]);

        // One second past midnight no longer matches: equality is exact-ms,
        // not day-granular. The two interpretations are distinguishable.
        filters.set(
            "when",
            Some(FilterModel::new(
                FilterOperator::Equals,
                "2024-01-01T00:00:01Z",
            )),
        );
        assert_eq!(run(&filters), Vec::<usize>::new());
    }

    #[test]
    fn test_text_operators() {
        let mut filters = FilterSet::new();
        filters.set(
            "name",
            Some(FilterModel::new(FilterOperator::Contains, "AN")),
        );
        assert_eq!(run(&filters), vec![1]);

        filters.set(
            "name",
            Some(FilterModel::new(FilterOperator::StartsWith, "ap")),
        );
        assert_eq!(run(&filters), vec![0]);

        filters.set(
            "name",
            Some(FilterModel::new(FilterOperator::EndsWith, "rry")),
        );
        assert_eq!(run(&filters), vec![2]);

        filters.set(
            "name",
            Some(FilterModel::new(FilterOperator::NotContains, "a")),
        );
        assert_eq!(run(&filters), vec![2, 3]);

        filters.set("name", Some(FilterModel::new(FilterOperator::Blank, "")));
        assert_eq!(run(&filters), vec![3]);

        filters.set("name", Some(FilterModel::new(FilterOperator::NotBlank, "")));
        assert_eq!(run(&filters), vec![0, 1, 2]);
    }

    #[test]
    fn test_filters_and_combine() {
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::new(FilterOperator::Gte, 5)));
        filters.set(
            "name",
            Some(FilterModel::new(FilterOperator::Contains, "an")),
        );
        assert_eq!(run(&filters), vec![1]);
    }

    #[test]
    fn test_unknown_column_filter_ignored() {
        let mut filters = FilterSet::new();
        filters.set("ghost", Some(FilterModel::new(FilterOperator::Equals, "x")));
        assert_eq!(run(&filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_filter_idempotent() {
        let rows = rows();
        let cols = columns();
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::new(FilterOperator::Gt, 4)));
        let all: Vec<usize> = (0..rows.len()).collect();
        let once = apply_column_filters(&rows, all, &filters, &cols);
        let twice = apply_column_filters(&rows, once.clone(), &filters, &cols);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_quick_filter_any_column_matches() {
        let rows = rows();
        let cols = columns();
        let all: Vec<usize> = (0..rows.len()).collect();
        assert_eq!(
            apply_quick_filter(&rows, all.clone(), "banana", &cols),
            vec![1]
        );
        // Number cells participate through their display text.
        assert_eq!(apply_quick_filter(&rows, all.clone(), "15", &cols), vec![1]);
        // Empty needle passes everything through untouched.
        assert_eq!(apply_quick_filter(&rows, all.clone(), "", &cols), all);
    }

    #[test]
    fn test_quick_filter_skips_non_filterable_columns() {
        let rows = rows();
        let cols = columns();
        let all: Vec<usize> = (0..rows.len()).collect();
        // "apple" appears in row 2's non-filterable column only; quick filter
        // still finds row 1 through its name.
        assert_eq!(apply_quick_filter(&rows, all, "apple", &cols), vec![0]);
    }

    #[test]
    fn test_filter_set_serde() {
        let mut filters = FilterSet::new();
        filters.set("n", Some(FilterModel::new(FilterOperator::Gte, 5)));
        let json = serde_json::to_string(&filters).unwrap();
        assert!(json.contains("\"gte\""));
        let back: FilterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filters);
    }
}
