//! Row selection tracking.
//!
//! Selection is a set of row identities, deliberately independent of the
//! processing pipeline: a row stays selected when a filter hides it or a
//! sort moves it off the current page, and is still selected when it comes
//! back. The mutations are exactly: toggling one row, unioning the current
//! page in, and subtracting the current page out.

use std::collections::HashSet;

use crate::model::RowKey;

/// Tracks which row identities are selected.
///
/// Membership checks are O(1) through a hash set; a parallel list preserves
/// selection order for callers that care about it.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    /// Selected keys for O(1) lookup.
    selected: HashSet<RowKey>,
    /// Selected keys in selection order.
    order: Vec<RowKey>,
}

impl SelectionModel {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a row is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected.contains(key)
    }

    /// Returns `true` if any row is selected.
    pub fn has_selection(&self) -> bool {
        !self.order.is_empty()
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected keys in selection order.
    pub fn selected_keys(&self) -> &[RowKey] {
        &self.order
    }

    /// Toggles one row in or out of the selection. Returns the new state.
    pub fn toggle(&mut self, key: RowKey) -> bool {
        if self.selected.remove(&key) {
            self.order.retain(|k| k != &key);
            false
        } else {
            self.selected.insert(key.clone());
            self.order.push(key);
            true
        }
    }

    /// Sets one row's selected state explicitly.
    pub fn set_selected(&mut self, key: RowKey, selected: bool) {
        if selected == self.selected.contains(&key) {
            return;
        }
        self.toggle(key);
    }

    /// Unions the given page's identities into the selection.
    pub fn select_page<'a>(&mut self, page_keys: impl IntoIterator<Item = &'a RowKey>) {
        for key in page_keys {
            if self.selected.insert(key.clone()) {
                self.order.push(key.clone());
            }
        }
    }

    /// Removes exactly the given page's identities from the selection;
    /// selections made on other pages survive.
    pub fn deselect_page<'a>(&mut self, page_keys: impl IntoIterator<Item = &'a RowKey>) {
        let page: HashSet<&RowKey> = page_keys.into_iter().collect();
        self.order.retain(|k| !page.contains(k));
        self.selected.retain(|k| !page.contains(k));
    }

    /// Clears the selection entirely.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[i64]) -> Vec<RowKey> {
        ids.iter().map(|&i| RowKey::Int(i)).collect()
    }

    #[test]
    fn test_toggle() {
        let mut sel = SelectionModel::new();
        assert!(sel.toggle(RowKey::Int(1)));
        assert!(sel.is_selected(&RowKey::Int(1)));
        assert!(!sel.toggle(RowKey::Int(1)));
        assert!(!sel.is_selected(&RowKey::Int(1)));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_select_page_unions() {
        let mut sel = SelectionModel::new();
        sel.toggle(RowKey::Int(99)); // selected on another page
        let page = keys(&[1, 2, 3]);
        sel.select_page(&page);
        assert_eq!(sel.len(), 4);
        // Repeat union is idempotent.
        sel.select_page(&page);
        assert_eq!(sel.len(), 4);
    }

    #[test]
    fn test_deselect_page_subtracts_exactly() {
        let mut sel = SelectionModel::new();
        sel.toggle(RowKey::Int(99));
        sel.select_page(&keys(&[1, 2, 3]));
        sel.deselect_page(&keys(&[1, 2, 3]));
        // The off-page selection survives.
        assert_eq!(sel.selected_keys(), &[RowKey::Int(99)]);
    }

    #[test]
    fn test_selection_order_preserved() {
        let mut sel = SelectionModel::new();
        sel.toggle(RowKey::Int(3));
        sel.toggle(RowKey::Int(1));
        sel.toggle(RowKey::Int(2));
        assert_eq!(
            sel.selected_keys(),
            &[RowKey::Int(3), RowKey::Int(1), RowKey::Int(2)]
        );
    }

    #[test]
    fn test_set_selected() {
        let mut sel = SelectionModel::new();
        sel.set_selected(RowKey::Int(1), true);
        sel.set_selected(RowKey::Int(1), true);
        assert_eq!(sel.len(), 1);
        sel.set_selected(RowKey::Int(1), false);
        assert!(sel.is_empty());
    }
}
