//! Main DataTable

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;
use log::error;
use log::warn;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::error::ViewError;
use crate::local;
use crate::local::LocalQuery;
use crate::location::HistoryMode;
use crate::location::ParamStore;
use crate::location::ParamsUpdate;
use crate::location::UrlParams;
use crate::location::codec;
use crate::location::codec::FILTER_PREFIX;
use crate::model::Record;
use crate::model::record_id;
use crate::pagination::Pagination;
use crate::query::FilterValue;
use crate::query::Filters;
use crate::query::QueryState;
use crate::query::Sort;
use crate::remote::RemoteExecutor;
use crate::remote::RemoteSource;
use crate::remote::ReqwestTransport;
use crate::remote::Transport;
use crate::selection::SelectionState;
use crate::views::QUERY_FILTER_KEY;
use crate::views::View;
use crate::views::ViewManager;
use crate::views::ViewsEndpoint;

use super::Debouncer;
use super::EmptyState;
use super::Mode;
use super::TableConfig;
use super::TableSnapshot;

/// Where a table's rows come from.
pub enum DataSource<T> {
    /// An in-memory collection, filtered and paginated in-process.
    Local(Vec<T>),
    /// A paginated endpoint.
    Remote(RemoteSource),
}

/// The table state orchestrator.
///
/// Owns the canonical query state, the selection and the view list. Setters
/// apply their change under a single lock, then schedule the side effects:
/// a debounced write to the [`ParamStore`] and either a synchronous local
/// recompute or a debounced remote fetch. Observers read a
/// [`TableSnapshot`] and are woken through [`subscribe`](Self::subscribe).
///
/// Every setter that changes the query clears the selection; changes to the
/// search, filters, sort, limit or view also return to page 1. Setting a
/// value it already has is a no-op.
///
/// Dropping the table cancels pending effects, the navigation listener and
/// in-flight requests.
///
/// # Example
///
/// ```ignore
/// use tablesync_lib::table::DataTable;
/// use tablesync_lib::table::TableConfig;
///
/// let table = DataTable::builder()
///     .config(TableConfig::default().with_query_field("name"))
///     .local(rows)
///     .param_store(store)
///     .build();
///
/// table.mount().await;
/// table.set_query_value("acme");
/// let snapshot = table.snapshot();
/// ```
pub struct DataTable<T> {
    inner: Arc<DataTableInner<T>>,
}

enum Backend {
    Local,
    Remote {
        source: RemoteSource,
        executor: RemoteExecutor,
    },
}

struct DataTableInner<T> {
    config: TableConfig,
    backend: Backend,
    store: Option<Arc<dyn ParamStore>>,
    views_endpoint: Option<Arc<dyn ViewsEndpoint>>,
    state: Mutex<TableState<T>>,
    url_debouncer: Debouncer,
    fetch_debouncer: Debouncer,
    listener: Mutex<Option<JoinHandle<()>>>,
    revision: watch::Sender<u64>,
    disposed: AtomicBool,
}

struct TableState<T> {
    query: QueryState,
    views: ViewManager,
    selection: SelectionState,
    source_items: Vec<T>,
    items: Vec<T>,
    total: usize,
    loading: bool,
    first_load: bool,
    error: Option<String>,
    mounted: bool,
    last_written: Option<UrlParams>,
}

/// Returns `true` if two states select the same rows, ignoring the view index.
fn same_rows(a: &QueryState, b: &QueryState) -> bool {
    a.page == b.page
        && a.limit == b.limit
        && a.query_value == b.query_value
        && a.filters == b.filters
        && a.sort == b.sort
}

// =============================================================================
// Public API
// =============================================================================

impl<T> DataTable<T>
where
    T: Record + Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a new builder for constructing a table.
    pub fn builder() -> DataTableBuilder<T, Missing> {
        DataTableBuilder::new()
    }

    /// Loads views, hydrates state and runs the initial fetch or recompute.
    ///
    /// Remote views are loaded best effort. With URL sync enabled the state
    /// comes from the parameter store, falling back to the configured
    /// initial sort and filters for anything the URL does not carry, and a
    /// listener re-hydrates on back/forward navigation.
    pub async fn mount(&self) {
        let inner = &self.inner;

        if let Some(endpoint) = &inner.views_endpoint {
            match endpoint.list().await {
                Ok(remote) => {
                    debug!("Loaded {} remote views", remote.len());
                    let mut views = inner.config.views.clone();
                    views.extend(remote);
                    inner.state.lock().views.replace_remote(views);
                }
                Err(e) => warn!("Failed to load views: {}", e),
            }
        }

        {
            let mut state = inner.state.lock();
            let params = inner.synced_store().map(|store| store.params());
            let query = inner.hydrate(params.as_ref(), state.views.views());
            debug!("Mounted with page {} and {} filters", query.page, query.filters.len());
            state.views.select(query.selected_view).ok();
            state.query = query;
            state.last_written = params;
            state.mounted = true;
            if matches!(inner.backend, Backend::Remote { .. }) {
                state.loading = true;
            }
        }

        inner.start_listener();
        inner.schedule_url_sync_with(HistoryMode::Replace);
        inner.notify();

        match inner.backend {
            Backend::Local => inner.recompute(),
            Backend::Remote { .. } => inner.clone().run_fetch().await,
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> TableSnapshot<T> {
        let state = self.inner.state.lock();
        let pagination = Pagination::new(state.query.page, state.query.limit, state.total);
        TableSnapshot {
            items: state.items.clone(),
            total: state.total,
            page: state.query.page,
            limit: state.query.limit,
            loading: state.loading,
            first_load: state.first_load,
            query_value: state.query.query_value.clone(),
            filters: state.query.filters.clone(),
            sort: state.query.sort.clone(),
            selected_resources: state.selection.selected(),
            all_resources_selected: state.selection.all_resources_selected(),
            views: state.views.views().to_vec(),
            selected_view: state.query.selected_view,
            mode: self.mode(),
            error: state.error.clone(),
            pagination: pagination.view(),
            empty_state: EmptyState::derive(state.total, state.loading, state.query.is_filtered()),
        }
    }

    /// Returns a receiver whose value increments on every observable change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Returns the current query state.
    pub fn query_state(&self) -> QueryState {
        self.inner.state.lock().query.clone()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Returns whether rows are local or remote.
    pub fn mode(&self) -> Mode {
        match self.inner.backend {
            Backend::Local => Mode::Local,
            Backend::Remote { .. } => Mode::Remote,
        }
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Sets the page; 0 is treated as 1.
    pub fn set_page(&self, page: usize) {
        self.inner.update(|state| {
            state.query.page = page.max(1);
        });
    }

    /// Sets the page, clamped to the known page count.
    pub fn go_to_page(&self, page: usize) {
        self.inner.update(|state| {
            let pagination = Pagination::new(state.query.page, state.query.limit, state.total);
            state.query.page = pagination.clamp(page);
        });
    }

    /// Moves to the next page if there is one.
    pub fn next_page(&self) {
        self.inner.update(|state| {
            let pagination = Pagination::new(state.query.page, state.query.limit, state.total);
            if pagination.has_next() {
                state.query.page += 1;
            }
        });
    }

    /// Moves to the previous page if there is one.
    pub fn previous_page(&self) {
        self.inner.update(|state| {
            if state.query.page > 1 {
                state.query.page -= 1;
            }
        });
    }

    /// Sets the page size; 0 is treated as 1.
    pub fn set_limit(&self, limit: usize) {
        let limit = limit.max(1);
        self.inner.update(|state| {
            if state.query.limit != limit {
                state.query.limit = limit;
                state.query.page = 1;
            }
        });
    }

    // -------------------------------------------------------------------------
    // Search, filters, sort
    // -------------------------------------------------------------------------

    /// Sets the free-text query.
    pub fn set_query_value(&self, query_value: impl Into<String>) {
        let query_value = query_value.into();
        self.inner.update(|state| {
            if state.query.query_value != query_value {
                state.query.query_value = query_value;
                state.query.page = 1;
            }
        });
    }

    /// Replaces all filters.
    ///
    /// A filter on the reserved [`QUERY_FILTER_KEY`] is dropped.
    pub fn set_filters(&self, mut filters: Filters) {
        if filters.remove(QUERY_FILTER_KEY).is_some() {
            warn!("Ignoring filter on reserved key {:?}", QUERY_FILTER_KEY);
        }
        self.inner.update(|state| {
            if state.query.filters != filters {
                state.query.filters = filters;
                state.query.page = 1;
            }
        });
    }

    /// Sets one filter; an empty value removes it.
    ///
    /// The reserved [`QUERY_FILTER_KEY`] is refused.
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let (key, value) = (key.into(), value.into());
        if key == QUERY_FILTER_KEY {
            warn!("Ignoring filter on reserved key {:?}", QUERY_FILTER_KEY);
            return;
        }
        self.inner.update(|state| {
            if state.query.filters.set(key, value) {
                state.query.page = 1;
            }
        });
    }

    /// Removes one filter.
    pub fn remove_filter(&self, key: &str) {
        self.inner.update(|state| {
            if state.query.filters.remove(key).is_some() {
                state.query.page = 1;
            }
        });
    }

    /// Removes all filters.
    pub fn clear_filters(&self) {
        self.set_filters(Filters::new());
    }

    /// Sets or clears the sort.
    pub fn set_sort(&self, sort: Option<Sort>) {
        let sort = sort.filter(|s| !s.field.is_empty());
        self.inner.update(|state| {
            if state.query.sort != sort {
                state.query.sort = sort;
                state.query.page = 1;
            }
        });
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// Activates a view and applies its filters and query.
    pub fn select_view(&self, index: usize) -> Result<(), ViewError> {
        self.inner.update(|state| -> Result<(), ViewError> {
            let (filters, query_value) = state.views.select(index)?.split();
            state.query.filters = filters;
            state.query.query_value = query_value;
            state.query.selected_view = index;
            state.query.page = 1;
            Ok(())
        })
    }

    /// Saves the current filters and query as a new view and activates it.
    ///
    /// Returns the new view's index. Persistence is best effort.
    pub async fn create_view(&self, name: impl Into<String>) -> usize {
        let name = name.into();
        let (index, view) = self.inner.update(|state| {
            let filters = state.query.filters.clone();
            let index = state.views.create(name, filters, &state.query.query_value);
            state.query.selected_view = index;
            state.query.page = 1;
            (index, state.views.active().clone())
        });
        self.inner.persist_created(index, view).await;
        index
    }

    /// Renames a view.
    pub async fn rename_view(&self, index: usize, name: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        let previous = {
            let mut state = self.inner.state.lock();
            let previous = state.views.get(index).cloned();
            state.views.rename(index, name.as_str())?;
            previous
        };
        self.inner.schedule_url_sync();
        self.inner.notify();

        if let (Some(endpoint), Some(previous)) = (&self.inner.views_endpoint, previous) {
            if let Err(e) = endpoint.rename(&previous, &name).await {
                warn!("Failed to rename view {:?}: {}", previous.name, e);
            }
        }
        Ok(())
    }

    /// Copies a view as `"<name> copy"` and activates the copy.
    ///
    /// Returns the copy's index.
    pub async fn duplicate_view(&self, index: usize) -> Result<usize, Error> {
        let (copy_index, view) = self.inner.update(|state| -> Result<_, ViewError> {
            let copy_index = state.views.duplicate(index)?;
            let view = state.views.active().clone();
            let (filters, query_value) = view.split();
            state.query.filters = filters;
            state.query.query_value = query_value;
            state.query.selected_view = copy_index;
            state.query.page = 1;
            Ok((copy_index, view))
        })?;
        self.inner.persist_created(copy_index, view).await;
        Ok(copy_index)
    }

    /// Overwrites a view with the current filters and query.
    pub async fn update_view(&self, index: usize) -> Result<(), Error> {
        let view = {
            let mut state = self.inner.state.lock();
            let TableState { query, views, .. } = &mut *state;
            views.update(index, &query.filters, &query.query_value)?.clone()
        };
        self.inner.notify();

        if let Some(endpoint) = &self.inner.views_endpoint {
            if let Err(e) = endpoint.update(&view).await {
                warn!("Failed to update view {:?}: {}", view.name, e);
            }
        }
        Ok(())
    }

    /// Deletes a view.
    ///
    /// Deleting the active view returns to "All" and clears the filters and
    /// query.
    pub async fn delete_view(&self, index: usize) -> Result<(), Error> {
        let active = self.inner.state.lock().query.selected_view;
        let removed = if active == index {
            self.inner.update(|state| -> Result<View, ViewError> {
                let removed = state.views.delete(index)?;
                state.query.filters = Filters::new();
                state.query.query_value = String::new();
                state.query.selected_view = 0;
                state.query.page = 1;
                Ok(removed)
            })?
        } else {
            let removed = {
                let mut state = self.inner.state.lock();
                let removed = state.views.delete(index)?;
                state.query.selected_view = state.views.selected();
                removed
            };
            self.inner.notify();
            removed
        };

        if let Some(endpoint) = &self.inner.views_endpoint {
            if let Err(e) = endpoint.delete(&removed).await {
                warn!("Failed to delete view {:?}: {}", removed.name, e);
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selects or deselects one record by id.
    pub fn select_single(&self, id: &str, on: bool) {
        self.inner.select(|selection, _| selection.single(id, on));
    }

    /// Selects exactly the current page, or nothing.
    pub fn select_page(&self, on: bool) {
        self.inner.select(|selection, page_ids| selection.page(on, page_ids));
    }

    /// Applies `on` from the anchor to a position on the current page.
    pub fn select_range(&self, position: usize, on: bool) {
        self.inner
            .select(|selection, page_ids| selection.range(position, on, page_ids));
    }

    /// Selects or deselects every record matching the query.
    pub fn select_all(&self, on: bool) {
        self.inner.select(|selection, page_ids| selection.all(on, page_ids));
    }

    /// Clears the selection.
    pub fn clear_selection(&self) {
        self.inner.select(|selection, _| selection.clear());
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the in-memory collection and recomputes the page.
    ///
    /// Ignored in remote mode.
    pub fn set_items(&self, items: Vec<T>) {
        if matches!(self.inner.backend, Backend::Remote { .. }) {
            warn!("Ignoring set_items on a remote table");
            return;
        }
        self.inner.state.lock().source_items = items;
        self.inner.recompute();
    }

    /// Recomputes or refetches the current page immediately.
    pub async fn refresh(&self) {
        match self.inner.backend {
            Backend::Local => self.inner.recompute(),
            Backend::Remote { .. } => {
                self.inner.fetch_debouncer.cancel();
                self.inner.state.lock().loading = true;
                self.inner.notify();
                self.inner.clone().run_fetch().await;
            }
        }
    }

    /// Cancels pending effects, the navigation listener and in-flight requests.
    ///
    /// The table keeps its last state but schedules nothing further.
    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl<T> Drop for DataTable<T> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

// =============================================================================
// Internals
// =============================================================================

impl<T> DataTableInner<T> {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Disposing table");
        self.url_debouncer.cancel();
        self.fetch_debouncer.cancel();
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
        }
        if let Backend::Remote { executor, .. } = &self.backend {
            executor.cancel_all();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn synced_store(&self) -> Option<&Arc<dyn ParamStore>> {
        self.store.as_ref().filter(|_| self.config.url_sync)
    }

    /// Builds the mounted state from the URL and the configured defaults.
    fn hydrate(&self, params: Option<&UrlParams>, views: &[View]) -> QueryState {
        let mut query = match params {
            Some(params) => codec::decode(params, views, self.config.limit),
            None => QueryState::with_limit(self.config.limit),
        };
        let has_url_filters = params.is_some_and(|params| {
            params.iter().any(|(key, _)| key.starts_with(FILTER_PREFIX))
        });
        if query.sort.is_none() {
            query.sort = self.config.initial_sort.clone();
        }
        if !has_url_filters && query.filters.is_empty() {
            query.filters = self.config.initial_filters.clone();
        }
        query
    }

    fn write_url(&self, mode: HistoryMode) {
        let Some(store) = self.synced_store() else {
            return;
        };
        let params = {
            let mut state = self.state.lock();
            let params = codec::encode(&state.query, &store.params(), state.views.views());
            state.last_written = Some(params.clone());
            params
        };
        debug!("Writing URL: {}", params);
        store.set(ParamsUpdate::Replace(params), mode);
    }
}

impl<T> DataTableInner<T>
where
    T: Record + Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Applies a state change under one lock and schedules its effects.
    ///
    /// A change to the query clears the selection; a change to the rows the
    /// query selects also refreshes the data.
    fn update<R>(self: &Arc<Self>, change: impl FnOnce(&mut TableState<T>) -> R) -> R {
        let (result, changed, rows_changed) = {
            let mut state = self.state.lock();
            let before = state.query.clone();
            let result = change(&mut state);
            let changed = state.query != before;
            if changed {
                state.selection.clear();
            }
            (result, changed, !same_rows(&before, &state.query))
        };
        if changed {
            self.schedule_url_sync();
            if rows_changed {
                self.refresh_rows();
            }
            self.notify();
        }
        result
    }

    fn select(&self, gesture: impl FnOnce(&mut SelectionState, &[String])) {
        {
            let mut state = self.state.lock();
            let id_field = self.config.id_field.as_str();
            let page_ids: Vec<String> = state
                .items
                .iter()
                .map(|item| record_id(item, id_field))
                .collect();
            gesture(&mut state.selection, &page_ids);
        }
        self.notify();
    }

    fn refresh_rows(self: &Arc<Self>) {
        if !self.state.lock().mounted {
            return;
        }
        match self.backend {
            Backend::Local => self.recompute(),
            Backend::Remote { .. } => self.schedule_fetch(),
        }
    }

    fn recompute(&self) {
        {
            let mut state = self.state.lock();
            let query = LocalQuery::from_state(&state.query, self.config.query_field.as_deref());
            let (items, total) = local::apply(&state.source_items, &query).into_parts();
            state.items = items;
            state.total = total;
            state.loading = false;
            state.first_load = false;
            state.error = None;
        }
        self.notify();
    }

    fn schedule_url_sync(self: &Arc<Self>) {
        self.schedule_url_sync_with(self.config.history_mode);
    }

    fn schedule_url_sync_with(self: &Arc<Self>, mode: HistoryMode) {
        if self.is_disposed() || self.synced_store().is_none() || !self.state.lock().mounted {
            return;
        }
        if self.config.url_debounce.is_zero() {
            self.url_debouncer.cancel();
            self.write_url(mode);
            return;
        }
        let weak = Arc::downgrade(self);
        let scheduled = self.url_debouncer.schedule(self.config.url_debounce, async move {
            if let Some(inner) = weak.upgrade() {
                inner.write_url(mode);
            }
        });
        if !scheduled {
            self.write_url(mode);
        }
    }

    fn schedule_fetch(self: &Arc<Self>) {
        let Backend::Remote { source, executor } = &self.backend else {
            return;
        };
        if self.is_disposed() {
            return;
        }
        // A response for the previous state must not land while waiting.
        executor.cancel(source.endpoint());
        self.state.lock().loading = true;

        let weak = Arc::downgrade(self);
        let scheduled = self.fetch_debouncer.schedule(self.config.fetch_debounce, async move {
            if let Some(inner) = weak.upgrade() {
                inner.run_fetch().await;
            }
        });
        if !scheduled {
            warn!("No tokio runtime; skipping fetch from {}", source.endpoint());
            self.state.lock().loading = false;
        }
    }

    async fn run_fetch(self: Arc<Self>) {
        let Backend::Remote { source, executor } = &self.backend else {
            return;
        };
        let query = self.state.lock().query.clone();
        let result = executor
            .fetch::<T>(source, &query, self.config.query_field.as_deref())
            .await;

        {
            let mut state = self.state.lock();
            if state.query != query {
                debug!("Discarding response for a stale query");
                return;
            }
            match result {
                Ok(Some(page)) => {
                    let (items, total) = page.into_parts();
                    state.items = items;
                    state.total = total;
                    state.error = None;
                }
                Ok(None) => return,
                Err(e) => {
                    error!("Fetch from {} failed: {}", source.endpoint(), e);
                    state.error = Some(e.to_string());
                }
            }
            state.loading = false;
            state.first_load = false;
        }
        self.notify();
    }

    fn start_listener(self: &Arc<Self>) {
        let Some(store) = self.synced_store() else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            debug!("No tokio runtime; navigation is not observed");
            return;
        };
        let mut changes = store.subscribe();
        let weak = Arc::downgrade(self);
        let task = handle.spawn(async move {
            while changes.changed().await.is_ok() {
                let params = changes.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.on_navigate(params);
            }
        });
        if let Some(previous) = self.listener.lock().replace(task) {
            previous.abort();
        }
    }

    /// Re-hydrates from parameters the table did not write itself.
    fn on_navigate(self: &Arc<Self>, params: UrlParams) {
        if self.is_disposed() {
            return;
        }
        let rows_changed = {
            let mut state = self.state.lock();
            if state.last_written.as_ref() == Some(&params) {
                return;
            }
            state.last_written = Some(params.clone());
            let decoded = codec::decode(&params, state.views.views(), state.query.limit);
            if decoded == state.query {
                return;
            }
            debug!("Re-hydrating from navigation: {}", params);
            state.views.select(decoded.selected_view).ok();
            let rows_changed = !same_rows(&state.query, &decoded);
            state.query = decoded;
            state.selection.clear();
            rows_changed
        };
        if rows_changed {
            self.refresh_rows();
        }
        self.notify();
    }

    /// Sends a new view to the endpoint and records the id it assigns.
    ///
    /// The id goes to the view still at `index` if it has none yet, so a
    /// rename while the request is pending keeps it.
    async fn persist_created(self: &Arc<Self>, index: usize, view: View) {
        let Some(endpoint) = &self.views_endpoint else {
            return;
        };
        match endpoint.create(&view).await {
            Ok(Some(id)) => {
                {
                    let mut state = self.state.lock();
                    let unsaved = state.views.get(index).is_some_and(|v| v.id.is_none());
                    if !unsaved {
                        debug!("View {:?} moved before it was saved; dropping id {}", view.name, id);
                        return;
                    }
                    state.views.set_id(index, id);
                }
                // The URL token switches from the name to the id.
                self.schedule_url_sync();
                self.notify();
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to save view {:?}: {}", view.name, e),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Marker for a builder field that has not been set.
pub struct Missing;

/// Marker for a builder field that has been set.
pub struct Set<T>(T);

/// Builder for [`DataTable`].
///
/// # Required Fields
///
/// - a data source, via [`local`](Self::local) or [`remote`](Self::remote)
///
/// # Example
///
/// ```ignore
/// let table = DataTable::<Order>::builder()
///     .config(TableConfig::default().with_limit(50))
///     .remote(RemoteSource::new("https://api.test/orders"))
///     .transport(Arc::new(ReqwestTransport::new()))
///     .param_store(Arc::new(HistoryParamStore::new()))
///     .build();
/// ```
pub struct DataTableBuilder<T, Source> {
    source: Source,
    config: TableConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn ParamStore>>,
    views_endpoint: Option<Arc<dyn ViewsEndpoint>>,
    _rows: std::marker::PhantomData<fn() -> T>,
}

impl<T> DataTableBuilder<T, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            source: Missing,
            config: TableConfig::default(),
            transport: None,
            store: None,
            views_endpoint: None,
            _rows: std::marker::PhantomData,
        }
    }

    /// Uses an in-memory collection.
    pub fn local(self, items: Vec<T>) -> DataTableBuilder<T, Set<DataSource<T>>> {
        self.source(DataSource::Local(items))
    }

    /// Uses a remote endpoint.
    pub fn remote(self, source: RemoteSource) -> DataTableBuilder<T, Set<DataSource<T>>> {
        self.source(DataSource::Remote(source))
    }

    /// Sets the data source.
    pub fn source(self, source: DataSource<T>) -> DataTableBuilder<T, Set<DataSource<T>>> {
        DataTableBuilder {
            source: Set(source),
            config: self.config,
            transport: self.transport,
            store: self.store,
            views_endpoint: self.views_endpoint,
            _rows: self._rows,
        }
    }
}

impl<T> Default for DataTableBuilder<T, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> DataTableBuilder<T, S> {
    /// Sets the configuration.
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the transport for remote fetches.
    ///
    /// Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the parameter store the state is mirrored to.
    pub fn param_store(mut self, store: Arc<dyn ParamStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the endpoint views are persisted to.
    pub fn views_endpoint(mut self, endpoint: Arc<dyn ViewsEndpoint>) -> Self {
        self.views_endpoint = Some(endpoint);
        self
    }
}

impl<T> DataTableBuilder<T, Set<DataSource<T>>> {
    /// Builds the [`DataTable`].
    ///
    /// Only available once a data source has been set. The table is inert
    /// until [`DataTable::mount`] is called.
    pub fn build(self) -> DataTable<T> {
        let (backend, source_items) = match self.source.0 {
            DataSource::Local(items) => (Backend::Local, items),
            DataSource::Remote(source) => {
                let transport = self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
                (
                    Backend::Remote {
                        source,
                        executor: RemoteExecutor::new(transport),
                    },
                    Vec::new(),
                )
            }
        };

        let config = self.config;
        let (revision, _) = watch::channel(0);
        let state = TableState {
            query: QueryState::with_limit(config.limit),
            views: ViewManager::new(config.views.clone()),
            selection: SelectionState::new(),
            source_items,
            items: Vec::new(),
            total: 0,
            loading: false,
            first_load: true,
            error: None,
            mounted: false,
            last_written: None,
        };

        DataTable {
            inner: Arc::new(DataTableInner {
                config,
                backend,
                store: self.store,
                views_endpoint: self.views_endpoint,
                state: Mutex::new(state),
                url_debouncer: Debouncer::new("url"),
                fetch_debouncer: Debouncer::new("fetch"),
                listener: Mutex::new(None),
                revision,
                disposed: AtomicBool::new(false),
            }),
        }
    }
}
