//! In-process filtering, sorting and pagination.
//!
//! [`apply`] runs a fixed pipeline over a slice of [`Record`]s:
//!
//! 1. free-text match on the configured query field
//! 2. field filters
//! 3. stable sort
//! 4. pagination
//!
//! It is pure: the same input always yields the same page.

mod compare;

pub use compare::*;

use log::trace;

use crate::model::Record;
use crate::model::Value;
use crate::query::FilterValue;
use crate::query::Filters;
use crate::query::Page;
use crate::query::QueryState;
use crate::query::Sort;

/// Options for [`apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalQuery {
    /// Field matched by the free-text query; `None` disables free-text search.
    pub query_field: Option<String>,
    /// Free-text search term.
    pub query_value: String,
    /// Field filters.
    pub filters: Filters,
    /// Sort, if any.
    pub sort: Option<Sort>,
    /// Page, 1-indexed; 0 is treated as 1.
    pub page: usize,
    /// Page size; 0 is treated as 1.
    pub limit: usize,
}

impl LocalQuery {
    /// Builds the options for a table state.
    pub fn from_state(state: &QueryState, query_field: Option<&str>) -> Self {
        Self {
            query_field: query_field.map(str::to_string),
            query_value: state.query_value.clone(),
            filters: state.filters.clone(),
            sort: state.sort.clone(),
            page: state.page,
            limit: state.limit,
        }
    }
}

/// Filters, sorts and paginates records.
///
/// Returns the requested page together with the number of records that
/// matched before pagination.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tablesync_lib::local::LocalQuery;
/// use tablesync_lib::local::apply;
/// use tablesync_lib::query::Sort;
///
/// let items = vec![
///     json!({"name": "B", "price": 20}),
///     json!({"name": "A", "price": 10}),
/// ];
/// let query = LocalQuery {
///     sort: Some(Sort::asc("price")),
///     page: 1,
///     limit: 1,
///     ..LocalQuery::default()
/// };
///
/// let page = apply(&items, &query);
/// assert_eq!(page.total(), 2);
/// assert_eq!(page.items()[0]["name"], "A");
/// ```
pub fn apply<T: Record + Clone>(items: &[T], query: &LocalQuery) -> Page<T> {
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| matches_query(*item, query) && matches_filters(*item, &query.filters))
        .collect();

    if let Some(sort) = query.sort.as_ref().filter(|s| !s.field.is_empty()) {
        let mut keyed: Vec<(Option<Value>, &T)> = matched
            .into_iter()
            .map(|item| (item.field(&sort.field), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_fields(a.as_ref(), b.as_ref(), sort.direction));
        matched = keyed.into_iter().map(|(_, item)| item).collect();
    }

    let total = matched.len();
    let limit = query.limit.max(1);
    let offset = (query.page.max(1) - 1).saturating_mul(limit);
    trace!("Local query matched {} of {} records", total, items.len());

    let items = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Page::new(items, total)
}

/// Returns `true` if the record matches the free-text query.
///
/// Without a query field or with an empty query every record matches;
/// otherwise a record missing the field does not.
pub fn matches_query<R: Record + ?Sized>(record: &R, query: &LocalQuery) -> bool {
    let Some(field) = query.query_field.as_deref() else {
        return true;
    };
    if query.query_value.is_empty() {
        return true;
    }
    record
        .field(field)
        .and_then(|value| value.to_text())
        .is_some_and(|text| contains_folded(&text, &query.query_value))
}

/// Returns `true` if the record satisfies every filter.
///
/// A filter on a field the record does not have is ignored.
pub fn matches_filters<R: Record + ?Sized>(record: &R, filters: &Filters) -> bool {
    filters.iter().all(|(key, filter)| match record.field(key) {
        Some(value) if !value.is_null() => matches_filter(&value, filter),
        _ => true,
    })
}

/// Returns `true` if a present value satisfies a filter.
pub fn matches_filter(value: &Value, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::List(members) => match value {
            Value::List(items) => items
                .iter()
                .filter_map(Value::to_text)
                .any(|text| members.contains(&text)),
            _ => value.to_text().is_some_and(|text| members.contains(&text)),
        },
        FilterValue::Scalar(needle) => value
            .to_text()
            .is_some_and(|text| contains_folded(&text, needle)),
        FilterValue::Numeric(n) => matches!(value, Value::Number(v) if v == n),
        FilterValue::Flag(b) => matches!(value, Value::Bool(v) if v == b),
        FilterValue::Empty => true,
    }
}
