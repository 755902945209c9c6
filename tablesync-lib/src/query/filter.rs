//! Filter values for table queries.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Deserialize;
use serde::Serialize;

/// The value of a single field filter.
///
/// Each consumer (URL codec, local engine, remote condition builder) matches
/// on every variant explicitly.
///
/// # Example
///
/// ```
/// use tablesync_lib::query::FilterValue;
///
/// assert_eq!(FilterValue::from("open"), FilterValue::Scalar("open".into()));
/// assert!(FilterValue::from("").is_empty());
/// assert!(FilterValue::List(vec![]).is_empty());
/// assert!(!FilterValue::Flag(false).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean flag, matched by strict equality.
    Flag(bool),
    /// Number, matched by strict equality.
    Numeric(f64),
    /// Free text, matched as a case-insensitive substring.
    Scalar(String),
    /// Set of accepted values, matched by membership.
    List(Vec<String>),
    /// No value; equivalent to the filter being absent.
    #[default]
    Empty,
}

impl FilterValue {
    /// Returns `true` if this value carries no constraint.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Scalar(s) => s.is_empty(),
            FilterValue::List(items) => items.is_empty(),
            FilterValue::Numeric(n) => !n.is_finite(),
            FilterValue::Flag(_) => false,
            FilterValue::Empty => true,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Scalar(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Scalar(v)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::List(v)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(v: Vec<&str>) -> Self {
        FilterValue::List(v.into_iter().map(str::to_string).collect())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Numeric(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Numeric(f64::from(v))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Numeric(v as f64)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Flag(v)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// A normalized map of field filters.
///
/// Empty values are never stored: setting a key to an empty value removes it.
/// Keys are kept sorted so equality checks and URL encoding are
/// deterministic.
///
/// # Example
///
/// ```
/// use tablesync_lib::query::Filters;
///
/// let mut filters = Filters::new()
///     .with("status", vec!["open", "closed"])
///     .with("name", "");
/// assert_eq!(filters.len(), 1);
///
/// filters.set("status", Vec::<String>::new());
/// assert!(filters.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, FilterValue>", into = "BTreeMap<String, FilterValue>")]
pub struct Filters {
    entries: BTreeMap<String, FilterValue>,
}

impl Filters {
    /// Creates an empty filter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets or clears a filter.
    ///
    /// An empty value removes the key; an empty key is ignored. Returns
    /// `true` if the map changed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> bool {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return false;
        }
        if value.is_empty() {
            return self.entries.remove(&key).is_some();
        }
        match self.entries.get(&key) {
            Some(existing) if *existing == value => false,
            _ => {
                self.entries.insert(key, value);
                true
            }
        }
    }

    /// Removes a filter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.entries.remove(key)
    }

    /// Returns the filter value for a key.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    /// Returns `true` if a filter is set for the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of active filters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over active filters in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FilterValue> {
        self.entries.iter()
    }

    /// Removes every filter.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (key, value) in iter {
            filters.set(key, value);
        }
        filters
    }
}

impl From<BTreeMap<String, FilterValue>> for Filters {
    fn from(map: BTreeMap<String, FilterValue>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Filters> for BTreeMap<String, FilterValue> {
    fn from(filters: Filters) -> Self {
        filters.entries
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = (&'a String, &'a FilterValue);
    type IntoIter = btree_map::Iter<'a, String, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
