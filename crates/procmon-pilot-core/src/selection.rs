//! Selection abstractions for list-based UI components
//!
//! Provides generic selection logic with bounds checking, used by the host
//! list and the process tree cursor.

use serde::{Deserialize, Serialize};

/// A generic selectable list with automatic bounds checking
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::selection::SelectableList;
///
/// let mut list = SelectableList::new(vec!["a", "b", "c"]);
///
/// assert_eq!(list.selected(), Some(&"a"));
/// list.select_next();
/// assert_eq!(list.selected(), Some(&"b"));
/// list.select_prev();
/// assert_eq!(list.selected(), Some(&"a"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectableList<T> {
    items: Vec<T>,
    selected_index: usize,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected_index: 0,
        }
    }
}

impl<T> SelectableList<T> {
    /// Create a new selectable list with the given items
    ///
    /// Selection starts at index 0 if items are present.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            selected_index: 0,
        }
    }

    /// Create an empty selectable list
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a reference to the items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currently selected index
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Get the currently selected item
    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.selected_index)
    }

    /// Move selection to the next item (wraps to start)
    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.items.len();
        }
    }

    /// Move selection to the previous item (wraps to end)
    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = if self.selected_index == 0 {
                self.items.len() - 1
            } else {
                self.selected_index - 1
            };
        }
    }

    /// Select a specific index
    ///
    /// Clamps to valid range if index is out of bounds.
    pub fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = index.min(self.items.len() - 1);
        }
    }

    /// Select the first item
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Select the last item
    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = self.items.len() - 1;
        }
    }

    /// Move selection up by a page
    pub fn page_up(&mut self, page_size: usize) {
        self.selected_index = self.selected_index.saturating_sub(page_size);
    }

    /// Move selection down by a page
    pub fn page_down(&mut self, page_size: usize) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + page_size).min(self.items.len() - 1);
        }
    }

    /// Replace all items, resetting selection to 0
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected_index = 0;
    }

    /// Replace all items, preserving the selected position if possible
    pub fn update_items(&mut self, items: Vec<T>) {
        self.items = items;

        if self.items.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.items.len() {
            self.selected_index = self.items.len() - 1;
        }
    }

    /// Replace all items, keeping the selection on the item with the same key
    ///
    /// Falls back to [`update_items`](Self::update_items) when the previously
    /// selected key is gone.
    pub fn update_items_by<K, F>(&mut self, items: Vec<T>, key: F)
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        let selected_key = self.selected().map(&key);
        self.update_items(items);
        if let Some(selected_key) = selected_key {
            self.select_where(|item| key(item) == selected_key);
        }
    }

    /// Clear all items
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected_index = 0;
    }

    /// Iterate over items with their selection state
    pub fn iter_with_selection(&self) -> impl Iterator<Item = (usize, &T, bool)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (i, item, i == self.selected_index))
    }

    /// Find and select an item matching a predicate
    ///
    /// Returns true if a matching item was found and selected.
    pub fn select_where<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self.items.iter().position(predicate) {
            Some(i) => {
                self.selected_index = i;
                true
            }
            None => false,
        }
    }
}

impl<T> From<Vec<T>> for SelectableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<'a, T> IntoIterator for &'a SelectableList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
