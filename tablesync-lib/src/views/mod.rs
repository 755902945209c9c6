//! Named filter presets ("views").
//!
//! - [`View`] - a named snapshot of filters and the free-text query
//! - [`ViewManager`] - ordered views with the locked "All" view at index 0
//! - [`ViewsEndpoint`] - remote persistence of views, best effort

mod endpoint;
mod manager;

pub use endpoint::*;
pub use manager::*;

use serde::Deserialize;
use serde::Serialize;

use crate::query::FilterValue;
use crate::query::Filters;

/// Name of the built-in view at index 0.
pub const ALL_VIEW_NAME: &str = "All";

/// Reserved filter key under which a view stores the free-text query.
///
/// No field filter may use this key: the URL codec skips
/// `filter_queryValue` and the table's filter setters refuse it.
pub const QUERY_FILTER_KEY: &str = "queryValue";

/// A named filter preset.
///
/// The free-text query is part of the filter snapshot under
/// [`QUERY_FILTER_KEY`], so a view round-trips through a views endpoint as a
/// plain `{name, filters}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Identifier assigned by the views endpoint, if persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Filter snapshot, possibly including the query under [`QUERY_FILTER_KEY`].
    #[serde(default)]
    pub filters: Filters,
    /// Whether rename/update/delete actions are offered for this view.
    #[serde(default = "default_allow_actions")]
    pub allow_actions: bool,
}

fn default_allow_actions() -> bool {
    true
}

impl View {
    /// Creates a view with the given name and filter snapshot.
    pub fn new(name: impl Into<String>, filters: Filters) -> Self {
        Self {
            id: None,
            name: name.into(),
            filters,
            allow_actions: true,
        }
    }

    /// Creates the built-in "All" view.
    pub fn all() -> Self {
        Self {
            id: None,
            name: ALL_VIEW_NAME.to_string(),
            filters: Filters::new(),
            allow_actions: false,
        }
    }

    /// Creates a view from the table's current filters and query.
    pub fn from_state(name: impl Into<String>, filters: &Filters, query_value: &str) -> Self {
        Self::new(name, snapshot(filters, query_value))
    }

    /// Sets the identifier (builder pattern).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Disables actions on this view (builder pattern).
    pub fn locked(mut self) -> Self {
        self.allow_actions = false;
        self
    }

    /// Splits the stored snapshot into field filters and the query value.
    pub fn split(&self) -> (Filters, String) {
        let mut filters = self.filters.clone();
        let query_value = match filters.remove(QUERY_FILTER_KEY) {
            Some(FilterValue::Scalar(query)) => query,
            _ => String::new(),
        };
        (filters, query_value)
    }
}

/// Combines filters and a query value into a view snapshot.
pub fn snapshot(filters: &Filters, query_value: &str) -> Filters {
    let mut snapshot = filters.clone();
    snapshot.set(QUERY_FILTER_KEY, query_value);
    snapshot
}
