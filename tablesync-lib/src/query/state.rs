//! Canonical query state.

use super::Filters;
use super::Sort;

/// Default number of items per page.
pub const DEFAULT_LIMIT: usize = 20;

/// The canonical state of a table query.
///
/// Owned by [`DataTable`](crate::table::DataTable); the URL codec, the local
/// engine and the remote executor all derive their inputs from it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Current page, 1-indexed.
    pub page: usize,
    /// Items per page.
    pub limit: usize,
    /// Free-text search term; empty means no search.
    pub query_value: String,
    /// Active field filters.
    pub filters: Filters,
    /// Active sort, if any.
    pub sort: Option<Sort>,
    /// Index of the selected view; 0 is the built-in "All" view.
    pub selected_view: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            query_value: String::new(),
            filters: Filters::new(),
            sort: None,
            selected_view: 0,
        }
    }
}

impl QueryState {
    /// Creates a default state with the given page size.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            ..Self::default()
        }
    }

    /// Returns the normalized form of this state.
    ///
    /// Page and limit are raised to at least 1 and a sort on an empty field
    /// is dropped. Filters are normalized by construction.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.max(1);
        if self.sort.as_ref().is_some_and(|s| s.field.is_empty()) {
            self.sort = None;
        }
        self
    }

    /// Returns `true` if a search term or any filter is active.
    pub fn is_filtered(&self) -> bool {
        !self.query_value.is_empty() || !self.filters.is_empty()
    }

    /// Returns the zero-based offset of the first item on the current page.
    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.limit.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let state = QueryState {
            page: 0,
            limit: 0,
            sort: Some(Sort::asc("")),
            ..QueryState::default()
        }
        .normalized();
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 1);
        assert_eq!(state.sort, None);
    }

    #[test]
    fn test_offset() {
        let state = QueryState {
            page: 3,
            limit: 20,
            ..QueryState::default()
        };
        assert_eq!(state.offset(), 40);
    }

    #[test]
    fn test_is_filtered() {
        let mut state = QueryState::default();
        assert!(!state.is_filtered());
        state.filters.set("status", "open");
        assert!(state.is_filtered());
    }
}
