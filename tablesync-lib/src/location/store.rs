//! Parameter stores standing in for the browser location.

use std::fmt;

use log::debug;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::UrlParams;

/// How a write is recorded in navigation history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryMode {
    /// Overwrite the current history entry.
    #[default]
    Replace,
    /// Add a new history entry.
    Push,
}

/// A write to a [`ParamStore`].
pub enum ParamsUpdate {
    /// Replace the parameters with a value.
    Replace(UrlParams),
    /// Compute the new parameters from the current ones.
    Apply(Box<dyn FnOnce(&UrlParams) -> UrlParams + Send>),
}

impl ParamsUpdate {
    /// Creates a functional update.
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(&UrlParams) -> UrlParams + Send + 'static,
    {
        Self::Apply(Box::new(f))
    }

    fn resolve(self, current: &UrlParams) -> UrlParams {
        match self {
            Self::Replace(params) => params,
            Self::Apply(f) => f(current),
        }
    }
}

impl From<UrlParams> for ParamsUpdate {
    fn from(params: UrlParams) -> Self {
        Self::Replace(params)
    }
}

impl fmt::Debug for ParamsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(params) => f.debug_tuple("Replace").field(params).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// Source of truth for the address bar's query string.
///
/// Readers get a snapshot; [`subscribe`](Self::subscribe) yields every
/// change, including back/forward navigation.
pub trait ParamStore: Send + Sync {
    /// Returns the current parameters.
    fn params(&self) -> UrlParams;

    /// Writes new parameters.
    fn set(&self, update: ParamsUpdate, mode: HistoryMode);

    /// Returns a receiver that observes the current parameters.
    fn subscribe(&self) -> watch::Receiver<UrlParams>;
}

// =============================================================================
// History
// =============================================================================

struct History {
    entries: Vec<UrlParams>,
    cursor: usize,
}

impl History {
    fn current(&self) -> &UrlParams {
        &self.entries[self.cursor]
    }
}

/// In-memory navigation history.
///
/// Models a browser tab: writes either replace the current entry or push a
/// new one (dropping any forward entries), and [`back`](Self::back) /
/// [`forward`](Self::forward) move the cursor and notify subscribers.
///
/// # Example
///
/// ```
/// use tablesync_lib::location::HistoryMode;
/// use tablesync_lib::location::HistoryParamStore;
/// use tablesync_lib::location::ParamStore;
/// use tablesync_lib::location::UrlParams;
///
/// let store = HistoryParamStore::parse("page=2");
/// store.set(UrlParams::parse("page=3").into(), HistoryMode::Push);
/// assert_eq!(store.params().get("page"), Some("3"));
///
/// assert!(store.back());
/// assert_eq!(store.params().get("page"), Some("2"));
/// ```
pub struct HistoryParamStore {
    history: Mutex<History>,
    sender: watch::Sender<UrlParams>,
}

impl HistoryParamStore {
    /// Creates a store with a single empty entry.
    pub fn new() -> Self {
        Self::with_params(UrlParams::new())
    }

    /// Creates a store whose first entry is the given parameters.
    pub fn with_params(params: UrlParams) -> Self {
        let (sender, _) = watch::channel(params.clone());
        Self {
            history: Mutex::new(History {
                entries: vec![params],
                cursor: 0,
            }),
            sender,
        }
    }

    /// Creates a store from a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        Self::with_params(UrlParams::parse(query))
    }

    /// Moves one entry back. Returns `false` at the first entry.
    pub fn back(&self) -> bool {
        self.go(|cursor, _| cursor.checked_sub(1))
    }

    /// Moves one entry forward. Returns `false` at the last entry.
    pub fn forward(&self) -> bool {
        self.go(|cursor, len| Some(cursor + 1).filter(|next| *next < len))
    }

    /// Simulates the user entering a new address: pushes an entry.
    pub fn navigate(&self, params: UrlParams) {
        self.set(params.into(), HistoryMode::Push);
    }

    /// Returns the number of history entries.
    pub fn history_len(&self) -> usize {
        self.history.lock().entries.len()
    }

    fn go(&self, step: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let params = {
            let mut history = self.history.lock();
            let Some(cursor) = step(history.cursor, history.entries.len()) else {
                return false;
            };
            history.cursor = cursor;
            debug!("History moved to entry {}", cursor);
            history.current().clone()
        };
        self.sender.send_replace(params);
        true
    }
}

impl Default for HistoryParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore for HistoryParamStore {
    fn params(&self) -> UrlParams {
        self.history.lock().current().clone()
    }

    fn set(&self, update: ParamsUpdate, mode: HistoryMode) {
        let params = {
            let mut history = self.history.lock();
            let next = update.resolve(history.current());
            if &next == history.current() {
                return;
            }
            match mode {
                HistoryMode::Replace => {
                    let cursor = history.cursor;
                    history.entries[cursor] = next.clone();
                }
                HistoryMode::Push => {
                    let keep = history.cursor + 1;
                    history.entries.truncate(keep);
                    history.entries.push(next.clone());
                    history.cursor = keep;
                }
            }
            next
        };
        self.sender.send_replace(params);
    }

    fn subscribe(&self) -> watch::Receiver<UrlParams> {
        self.sender.subscribe()
    }
}

// =============================================================================
// Detached
// =============================================================================

/// Store used when no browsing context exists, e.g. server rendering.
///
/// Always reads as empty; writes are ignored.
pub struct DetachedParamStore {
    sender: watch::Sender<UrlParams>,
}

impl DetachedParamStore {
    /// Creates a detached store.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(UrlParams::new());
        Self { sender }
    }
}

impl Default for DetachedParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore for DetachedParamStore {
    fn params(&self) -> UrlParams {
        UrlParams::new()
    }

    fn set(&self, _update: ParamsUpdate, _mode: HistoryMode) {}

    fn subscribe(&self) -> watch::Receiver<UrlParams> {
        self.sender.subscribe()
    }
}
