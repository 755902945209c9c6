//! Read-only table state handed to the presentation layer.

use crate::pagination::PaginationView;
use crate::query::Filters;
use crate::query::Sort;
use crate::views::View;

/// Where the table's rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rows are filtered and paginated in-process.
    Local,
    /// Rows are fetched from an endpoint.
    Remote,
}

/// Which empty state, if any, the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// There are results, or they are still loading.
    None,
    /// Nothing exists and no query or filter is active.
    NoRecords,
    /// A query or filter is active and nothing matches.
    NoMatches,
}

impl EmptyState {
    /// Derives the empty state from the result and query.
    pub fn derive(total: usize, loading: bool, filtered: bool) -> Self {
        if total > 0 || loading {
            Self::None
        } else if filtered {
            Self::NoMatches
        } else {
            Self::NoRecords
        }
    }
}

/// Everything the presentation layer renders, at one revision.
#[derive(Debug, Clone)]
pub struct TableSnapshot<T> {
    /// Rows on the current page.
    pub items: Vec<T>,
    /// Number of records matching the query.
    pub total: usize,
    /// Current page, 1-indexed.
    pub page: usize,
    /// Items per page.
    pub limit: usize,
    /// Whether a remote fetch is pending or running.
    pub loading: bool,
    /// Whether no fetch has completed yet.
    pub first_load: bool,
    /// Free-text search term.
    pub query_value: String,
    /// Active field filters.
    pub filters: Filters,
    /// Active sort.
    pub sort: Option<Sort>,
    /// Selected record ids, sorted.
    pub selected_resources: Vec<String>,
    /// Whether every record matching the query is selected.
    pub all_resources_selected: bool,
    /// Views, "All" first.
    pub views: Vec<View>,
    /// Index of the active view.
    pub selected_view: usize,
    /// Local or remote.
    pub mode: Mode,
    /// Message of the last failed fetch, cleared on success.
    pub error: Option<String>,
    /// Derived pagination values.
    pub pagination: PaginationView,
    /// Empty state to show.
    pub empty_state: EmptyState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        assert_eq!(EmptyState::derive(3, false, true), EmptyState::None);
        assert_eq!(EmptyState::derive(0, true, false), EmptyState::None);
        assert_eq!(EmptyState::derive(0, false, false), EmptyState::NoRecords);
        assert_eq!(EmptyState::derive(0, false, true), EmptyState::NoMatches);
    }
}
