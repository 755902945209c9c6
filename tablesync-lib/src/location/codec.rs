//! Bidirectional mapping between [`QueryState`] and [`UrlParams`].
//!
//! | Key | Format | Meaning |
//! |---|---|---|
//! | `page` | integer > 1 | current page (omitted at page 1) |
//! | `sort` | `<field>\|<asc\|desc>` | active sort |
//! | `query` | string | free-text search |
//! | `filter_<key>` | JSON array or scalar text | one filter value |
//! | `viewSelected` | view id or name | active preset |
//!
//! Encoding omits every value that is at its default, so the default table
//! produces an empty query string. Decoding is total: malformed values fall
//! back to their defaults and are never reported.

use crate::model::format_number;
use crate::query::Direction;
use crate::query::FilterValue;
use crate::query::Filters;
use crate::query::QueryState;
use crate::query::Sort;
use crate::views::QUERY_FILTER_KEY;
use crate::views::View;

use super::UrlParams;

/// Key for the current page.
pub const PAGE_KEY: &str = "page";
/// Key for the active sort.
pub const SORT_KEY: &str = "sort";
/// Key for the free-text query.
pub const QUERY_KEY: &str = "query";
/// Prefix for filter keys.
pub const FILTER_PREFIX: &str = "filter_";
/// Key for the selected view.
pub const VIEW_KEY: &str = "viewSelected";

/// Encodes a query state on top of the previous parameters.
///
/// Keys not managed by the codec are kept as they are. All `filter_*` keys
/// are dropped before the current filters are written so removed filters do
/// not linger.
///
/// # Example
///
/// ```
/// use tablesync_lib::location::UrlParams;
/// use tablesync_lib::location::codec;
/// use tablesync_lib::query::QueryState;
/// use tablesync_lib::query::Sort;
///
/// let state = QueryState {
///     page: 2,
///     sort: Some(Sort::asc("price")),
///     ..QueryState::default()
/// };
/// let params = codec::encode(&state, &UrlParams::parse("tab=orders"), &[]);
/// assert_eq!(params.to_query_string(), "tab=orders&page=2&sort=price%7Casc");
/// ```
pub fn encode(state: &QueryState, previous: &UrlParams, views: &[View]) -> UrlParams {
    let mut params = previous.clone();
    params.retain(|key, _| !key.starts_with(FILTER_PREFIX));

    if state.page > 1 {
        params.set(PAGE_KEY, state.page.to_string());
    } else {
        params.remove(PAGE_KEY);
    }

    match &state.sort {
        Some(sort) if !sort.field.is_empty() => params.set(SORT_KEY, encode_sort(sort)),
        _ => params.remove(SORT_KEY),
    }

    if state.query_value.is_empty() {
        params.remove(QUERY_KEY);
    } else {
        params.set(QUERY_KEY, state.query_value.as_str());
    }

    for (key, value) in &state.filters {
        if let Some(encoded) = encode_filter_value(value) {
            params.append(format!("{FILTER_PREFIX}{key}"), encoded);
        }
    }

    match view_token(state.selected_view, views) {
        Some(token) => params.set(VIEW_KEY, token),
        None => params.remove(VIEW_KEY),
    }

    params
}

/// Decodes a query state from parameters.
///
/// `limit` is not part of the URL and is carried over from the caller.
pub fn decode(params: &UrlParams, views: &[View], limit: usize) -> QueryState {
    let page = params
        .get(PAGE_KEY)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1);

    let sort = params.get(SORT_KEY).and_then(decode_sort);

    let query_value = params.get(QUERY_KEY).unwrap_or_default().to_string();

    let filters: Filters = params
        .iter()
        .filter_map(|(key, raw)| {
            let field = key.strip_prefix(FILTER_PREFIX)?;
            if field == QUERY_FILTER_KEY {
                return None;
            }
            Some((field.to_string(), decode_filter_value(raw)))
        })
        .collect();

    let selected_view = params
        .get(VIEW_KEY)
        .map(|token| resolve_view(token, views))
        .unwrap_or(0);

    QueryState {
        page,
        limit: limit.max(1),
        query_value,
        filters,
        sort,
        selected_view,
    }
}

/// Encodes a sort as `<field>|<direction>`.
pub fn encode_sort(sort: &Sort) -> String {
    format!("{}|{}", sort.field, sort.direction.as_str())
}

/// Decodes a `<field>|<direction>` token.
///
/// Anything other than exactly two segments with a non-empty field and a
/// direction of `asc` or `desc` yields `None`.
pub fn decode_sort(token: &str) -> Option<Sort> {
    let mut parts = token.split('|');
    let field = parts.next()?;
    let direction = Direction::parse(parts.next()?)?;
    if parts.next().is_some() || field.is_empty() {
        return None;
    }
    Some(Sort::new(field, direction))
}

/// Encodes a single filter value, or `None` if it is empty.
///
/// Strings whose raw text would itself parse as JSON are written as JSON
/// string literals so that decoding yields a string again.
pub fn encode_filter_value(value: &FilterValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match value {
        FilterValue::List(items) => serde_json::to_string(items).ok(),
        FilterValue::Numeric(n) => Some(format_number(*n)),
        FilterValue::Flag(b) => Some(b.to_string()),
        FilterValue::Scalar(s) => {
            if serde_json::from_str::<serde_json::Value>(s).is_ok() {
                serde_json::to_string(s).ok()
            } else {
                Some(s.clone())
            }
        }
        FilterValue::Empty => None,
    }
}

/// Decodes a single filter value.
///
/// The text is first read as JSON (array, number, boolean or string
/// literal); anything else is taken verbatim as a string.
pub fn decode_filter_value(raw: &str) -> FilterValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => FilterValue::List(
            items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => n.as_f64().map(format_number),
                    serde_json::Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Ok(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(n) => FilterValue::Numeric(n),
            None => FilterValue::Scalar(raw.to_string()),
        },
        Ok(serde_json::Value::Bool(b)) => FilterValue::Flag(b),
        Ok(serde_json::Value::String(s)) => FilterValue::Scalar(s),
        Ok(serde_json::Value::Null | serde_json::Value::Object(_)) | Err(_) => {
            FilterValue::Scalar(raw.to_string())
        }
    }
}

fn view_token(index: usize, views: &[View]) -> Option<String> {
    if index == 0 {
        return None;
    }
    let view = views.get(index)?;
    Some(view.id.clone().unwrap_or_else(|| view.name.clone()))
}

fn resolve_view(token: &str, views: &[View]) -> usize {
    views
        .iter()
        .position(|v| v.id.as_deref() == Some(token))
        .or_else(|| views.iter().position(|v| v.name == token))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views() -> Vec<View> {
        vec![
            View::all(),
            View::new("Open", Filters::new().with("status", "open")),
            View::new("Mine", Filters::new()).with_id("v-42"),
        ]
    }

    fn full_state() -> QueryState {
        QueryState {
            page: 3,
            limit: 25,
            query_value: "red shoes".into(),
            filters: Filters::new()
                .with("status", vec!["open", "pending"])
                .with("name", "acme")
                .with("price", 12.5)
                .with("archived", false)
                .with("code", "42")
                .with("label", "[not json"),
            sort: Some(Sort::desc("created_at")),
            selected_view: 2,
        }
    }

    #[test]
    fn test_default_state_encodes_to_nothing() {
        let params = encode(&QueryState::default(), &UrlParams::new(), &[]);
        assert!(params.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let state = full_state();
        let decoded = decode(&encode(&state, &UrlParams::new(), &views()), &views(), 25);
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_round_trip_through_query_string() {
        let state = full_state();
        let text = encode(&state, &UrlParams::new(), &views()).to_query_string();
        let decoded = decode(&UrlParams::parse(&text), &views(), 25);
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_encode_is_idempotent() {
        let state = full_state();
        let once = encode(&state, &UrlParams::new(), &views());
        let twice = encode(&decode(&once, &views(), 25), &UrlParams::new(), &views());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_numeric_looking_strings_stay_strings() {
        assert_eq!(
            encode_filter_value(&FilterValue::from("42")).as_deref(),
            Some("\"42\"")
        );
        assert_eq!(
            encode_filter_value(&FilterValue::from("null")).as_deref(),
            Some("\"null\"")
        );
        assert_eq!(decode_filter_value("\"42\""), FilterValue::from("42"));
        assert_eq!(decode_filter_value("42"), FilterValue::Numeric(42.0));
        assert_eq!(decode_filter_value("true"), FilterValue::Flag(true));
        assert_eq!(decode_filter_value("acme"), FilterValue::from("acme"));
        assert_eq!(decode_filter_value("[\"a\",1]"), FilterValue::from(vec!["a", "1"]));
        assert_eq!(decode_filter_value("{\"a\":1}"), FilterValue::from("{\"a\":1}"));
    }

    #[test]
    fn test_numeric_list_members_use_number_text() {
        assert_eq!(decode_filter_value("[1.0, 2.50, 3]"), FilterValue::from(vec!["1", "2.5", "3"]));
    }

    #[test]
    fn test_reserved_query_key_is_not_a_filter() {
        let params = UrlParams::parse("filter_queryValue=x&filter_status=open");
        let state = decode(&params, &[], 10);
        assert_eq!(state.filters, Filters::new().with("status", "open"));
        assert_eq!(state.query_value, "");
    }

    #[test]
    fn test_stale_filters_are_cleared() {
        let previous = UrlParams::parse("filter_old=x&keep=1&page=4");
        let state = QueryState {
            filters: Filters::new().with("new", "y"),
            ..QueryState::default()
        };
        let params = encode(&state, &previous, &[]);
        assert_eq!(params.to_query_string(), "keep=1&filter_new=y");
    }

    #[test]
    fn test_malformed_sort() {
        assert_eq!(decode_sort("price|asc"), Some(Sort::asc("price")));
        assert_eq!(decode_sort("price"), None);
        assert_eq!(decode_sort("price|up"), None);
        assert_eq!(decode_sort("a|b|asc"), None);
        assert_eq!(decode_sort("|desc"), None);
        assert_eq!(decode_sort("price|ASC"), None);
    }

    #[test]
    fn test_malformed_params_fall_back() {
        let params = UrlParams::parse("page=abc&sort=bogus&filter_tags=%5Bbroken&filter_=x&filter_e=");
        let state = decode(&params, &[], 10);
        assert_eq!(state.page, 1);
        assert_eq!(state.sort, None);
        assert_eq!(state.filters, Filters::new().with("tags", "[broken"));

        let state = decode(&UrlParams::parse("page=0"), &[], 10);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_view_resolution() {
        let views = views();
        let by_id = decode(&UrlParams::parse("viewSelected=v-42"), &views, 10);
        assert_eq!(by_id.selected_view, 2);

        let by_name = decode(&UrlParams::parse("viewSelected=Open"), &views, 10);
        assert_eq!(by_name.selected_view, 1);

        let unknown = decode(&UrlParams::parse("viewSelected=Gone"), &views, 10);
        assert_eq!(unknown.selected_view, 0);

        let state = QueryState {
            selected_view: 1,
            ..QueryState::default()
        };
        assert_eq!(encode(&state, &UrlParams::new(), &views).get(VIEW_KEY), Some("Open"));

        let back_to_default = encode(&QueryState::default(), &UrlParams::parse("viewSelected=Open"), &views);
        assert!(!back_to_default.contains_key(VIEW_KEY));
    }
}
