//! Table configuration

use std::time::Duration;

use crate::location::HistoryMode;
use crate::query::DEFAULT_LIMIT;
use crate::query::Filters;
use crate::query::Sort;
use crate::views::View;

/// Configuration for a [`DataTable`](super::DataTable).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tablesync_lib::query::Sort;
/// use tablesync_lib::table::TableConfig;
///
/// let config = TableConfig::default()
///     .with_limit(50)
///     .with_query_field("name")
///     .with_initial_sort(Sort::desc("created_at"))
///     .with_fetch_debounce(Duration::from_millis(150));
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Items per page.
    ///
    /// Default: 20
    pub limit: usize,

    /// Field matched by the free-text query.
    ///
    /// Default: none (free-text search disabled in local mode, not sent in
    /// remote mode)
    pub query_field: Option<String>,

    /// Field holding the record id used for selection.
    ///
    /// Default: `"id"`
    pub id_field: String,

    /// Whether state is mirrored to the parameter store.
    ///
    /// Default: true
    pub url_sync: bool,

    /// Delay before state is written to the parameter store.
    ///
    /// Default: 100 ms
    pub url_debounce: Duration,

    /// Delay before a remote fetch starts.
    ///
    /// Default: 300 ms
    pub fetch_debounce: Duration,

    /// How URL writes are recorded in history.
    ///
    /// Default: [`HistoryMode::Replace`]
    pub history_mode: HistoryMode,

    /// Sort applied when the URL carries none.
    pub initial_sort: Option<Sort>,

    /// Filters applied when the URL carries none.
    pub initial_filters: Filters,

    /// Static view presets, appended after "All".
    pub views: Vec<View>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            query_field: None,
            id_field: "id".to_string(),
            url_sync: true,
            url_debounce: Duration::from_millis(100),
            fetch_debounce: Duration::from_millis(300),
            history_mode: HistoryMode::Replace,
            initial_sort: None,
            initial_filters: Filters::new(),
            views: Vec::new(),
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size; 0 is raised to 1.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Sets the free-text query field.
    pub fn with_query_field(mut self, field: impl Into<String>) -> Self {
        self.query_field = Some(field.into());
        self
    }

    /// Sets the record id field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Enables or disables URL sync.
    pub fn with_url_sync(mut self, enabled: bool) -> Self {
        self.url_sync = enabled;
        self
    }

    /// Sets the URL write delay.
    pub fn with_url_debounce(mut self, delay: Duration) -> Self {
        self.url_debounce = delay;
        self
    }

    /// Sets the remote fetch delay.
    pub fn with_fetch_debounce(mut self, delay: Duration) -> Self {
        self.fetch_debounce = delay;
        self
    }

    /// Sets the history mode for URL writes.
    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = mode;
        self
    }

    /// Sets the initial sort.
    pub fn with_initial_sort(mut self, sort: Sort) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    /// Sets the initial filters.
    pub fn with_initial_filters(mut self, filters: Filters) -> Self {
        self.initial_filters = filters;
        self
    }

    /// Adds a static view preset.
    pub fn with_view(mut self, view: View) -> Self {
        self.views.push(view);
        self
    }

    /// Creates a config with no debouncing; effects run immediately.
    pub fn immediate() -> Self {
        Self {
            url_debounce: Duration::ZERO,
            fetch_debounce: Duration::ZERO,
            ..Self::default()
        }
    }
}
