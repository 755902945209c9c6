//! Selection state for table rows.
//!
//! Selection uses string ids so it stays stable while a page is refreshed.
//! Ranges are resolved against the ordered ids of the current page.

use std::collections::BTreeSet;

/// ID-based selection with an "all matching records" flag.
///
/// When `all_resources_selected` is set it is authoritative: it covers every
/// record matching the current query, including ones that were never fetched,
/// not just the visible page.
///
/// # Example
///
/// ```
/// use tablesync_lib::selection::SelectionState;
///
/// let page: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
/// let mut selection = SelectionState::new();
///
/// selection.single("a", true);
/// selection.range(2, true, &page);
/// assert_eq!(selection.selected(), vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Currently selected ids.
    selected: BTreeSet<String>,
    /// Set when every record matching the query is selected.
    all_resources_selected: bool,
    /// Anchor for range selection (last toggled id).
    anchor: Option<String>,
}

impl SelectionState {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected ids in sorted order.
    pub fn selected(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Returns `true` if every record matching the query is selected.
    pub fn all_resources_selected(&self) -> bool {
        self.all_resources_selected
    }

    /// Check if an id is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        !id.is_empty() && (self.all_resources_selected || self.selected.contains(id))
    }

    /// Get the number of itemized selections.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && !self.all_resources_selected
    }

    /// Get the anchor id for range selection.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Selects or deselects one id.
    ///
    /// Clears the "all" flag; the id becomes the range anchor.
    pub fn single(&mut self, id: &str, on: bool) {
        if id.is_empty() {
            return;
        }
        self.all_resources_selected = false;
        if on {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
        self.anchor = Some(id.to_string());
    }

    /// Selects exactly the ids on the current page, or nothing.
    ///
    /// Clears the "all" flag.
    pub fn page(&mut self, on: bool, page_ids: &[String]) {
        self.all_resources_selected = false;
        self.selected.clear();
        if on {
            self.selected
                .extend(page_ids.iter().filter(|id| !id.is_empty()).cloned());
        }
    }

    /// Applies `on` to every id between the anchor and `position`, inclusive.
    ///
    /// Positions refer to `page_ids`. Does nothing if there is no anchor, the
    /// anchor is not on this page, or `position` is out of bounds. The target
    /// becomes the new anchor.
    pub fn range(&mut self, position: usize, on: bool, page_ids: &[String]) {
        let Some(target) = page_ids.get(position) else {
            return;
        };
        let Some(anchor_pos) = self
            .anchor
            .as_ref()
            .and_then(|anchor| page_ids.iter().position(|id| id == anchor))
        else {
            return;
        };

        let (start, end) = if anchor_pos <= position {
            (anchor_pos, position)
        } else {
            (position, anchor_pos)
        };

        self.all_resources_selected = false;
        for id in page_ids[start..=end].iter().filter(|id| !id.is_empty()) {
            if on {
                self.selected.insert(id.clone());
            } else {
                self.selected.remove(id);
            }
        }
        self.anchor = Some(target.clone());
    }

    /// Selects or deselects every record matching the query.
    ///
    /// Selecting also marks the visible ids so consumers that only read the
    /// itemized set still see them; deselecting clears everything.
    pub fn all(&mut self, on: bool, page_ids: &[String]) {
        if on {
            self.all_resources_selected = true;
            self.selected
                .extend(page_ids.iter().filter(|id| !id.is_empty()).cloned());
        } else {
            self.clear();
        }
    }

    /// Clears the selection unconditionally.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.all_resources_selected = false;
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_toggles() {
        let mut selection = SelectionState::new();
        selection.single("a", true);
        selection.single("b", true);
        selection.single("a", false);
        assert_eq!(selection.selected(), ids(&["b"]));
        assert_eq!(selection.anchor(), Some("a"));
    }

    #[test]
    fn test_single_clears_all_flag() {
        let page = ids(&["a", "b"]);
        let mut selection = SelectionState::new();
        selection.all(true, &page);
        assert!(selection.is_selected("zzz"));
        selection.single("a", false);
        assert!(!selection.all_resources_selected());
        assert_eq!(selection.selected(), ids(&["b"]));
    }

    #[test]
    fn test_page_selects_exactly_page() {
        let mut selection = SelectionState::new();
        selection.single("elsewhere", true);
        selection.page(true, &ids(&["a", "b"]));
        assert_eq!(selection.selected(), ids(&["a", "b"]));
        selection.page(false, &ids(&["a", "b"]));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_range_extends_and_retracts() {
        let page = ids(&["a", "b", "c", "d", "e"]);
        let mut selection = SelectionState::new();
        selection.single("d", true);
        selection.range(1, true, &page);
        assert_eq!(selection.selected(), ids(&["b", "c", "d"]));
        assert_eq!(selection.anchor(), Some("b"));

        selection.range(2, false, &page);
        assert_eq!(selection.selected(), ids(&["d"]));
    }

    #[test]
    fn test_range_without_anchor_is_noop() {
        let page = ids(&["a", "b", "c"]);
        let mut selection = SelectionState::new();
        selection.range(2, true, &page);
        assert!(selection.is_empty());

        selection.single("zzz", true);
        selection.range(2, true, &page);
        assert_eq!(selection.selected(), ids(&["zzz"]));

        selection.single("a", true);
        selection.range(9, true, &page);
        assert_eq!(selection.selected(), ids(&["a", "zzz"]));
    }

    #[test]
    fn test_all_off_clears_both() {
        let page = ids(&["a", "b"]);
        let mut selection = SelectionState::new();
        selection.all(true, &page);
        assert_eq!(selection.selected(), page);
        selection.all(false, &page);
        assert!(selection.is_empty());
        assert!(!selection.all_resources_selected());
    }

    #[test]
    fn test_empty_ids_are_unselectable() {
        let mut selection = SelectionState::new();
        selection.single("", true);
        selection.page(true, &ids(&["", "a"]));
        assert_eq!(selection.selected(), ids(&["a"]));
        assert!(!selection.is_selected(""));
    }
}
