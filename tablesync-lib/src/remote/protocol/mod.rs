//! Query-string conventions for remote backends.
//!
//! A [`QueryProtocol`] turns a [`RemoteQuery`] into query-string pairs and
//! reads the backend's response into a [`RawPage`]. Two conventions ship
//! with the crate:
//!
//! - [`ODataProtocol`] - `$filter`, `$orderby`, `$top`, `$skip`, `$count`
//! - [`CrudProtocol`] - `filter=field||$op||value`, `sort=field,ASC`, `limit`, `page`

mod crud;
mod odata;

pub use crud::CrudProtocol;
pub use odata::ODataProtocol;

use crate::error::ApiError;

use super::RemoteQuery;

/// Items and total read from a backend response, before typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    /// Records as JSON.
    pub items: Vec<serde_json::Value>,
    /// Total matching records on the backend.
    pub total: usize,
}

/// Converts table queries to a backend's query-string convention.
pub trait QueryProtocol: Send + Sync {
    /// Returns the query-string pairs for a request, unencoded.
    fn query_pairs(&self, query: &RemoteQuery) -> Vec<(String, String)>;

    /// Reads a page from the JSON response body.
    ///
    /// The default accepts `{items, total}`, `{data, total}` or a bare array.
    fn parse_page(&self, body: serde_json::Value, _query: &RemoteQuery) -> Result<RawPage, ApiError> {
        parse_items_total(body)
    }
}

/// Appends encoded query pairs to an endpoint URL.
///
/// Keys are protocol-defined and written as-is; values are percent-encoded.
pub fn build_url(endpoint: &str, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return endpoint.to_string();
    }
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{query}")
}

/// Reads `{items|data: [...], total: n}` or a bare array.
pub fn parse_items_total(body: serde_json::Value) -> Result<RawPage, ApiError> {
    match body {
        serde_json::Value::Array(items) => {
            let total = items.len();
            Ok(RawPage { items, total })
        }
        serde_json::Value::Object(mut map) => {
            let items = match map.remove("items").or_else(|| map.remove("data")) {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(ApiError::parse("response has no `items` array")),
            };
            let total = match map.get("total") {
                Some(total) => total
                    .as_u64()
                    .ok_or_else(|| ApiError::parse("`total` is not a non-negative integer"))?
                    as usize,
                None => items.len(),
            };
            Ok(RawPage { items, total })
        }
        other => Err(ApiError::parse(format!(
            "expected an object or array, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let pairs = vec![
            ("limit".to_string(), "20".to_string()),
            ("filter".to_string(), "name||$cont||a b".to_string()),
        ];
        assert_eq!(
            build_url("https://api.test/items", &pairs),
            "https://api.test/items?limit=20&filter=name%7C%7C%24cont%7C%7Ca%20b"
        );
        assert_eq!(
            build_url("https://api.test/items?tenant=1", &pairs[..1]),
            "https://api.test/items?tenant=1&limit=20"
        );
        assert_eq!(build_url("https://api.test/items", &[]), "https://api.test/items");
    }

    #[test]
    fn test_parse_items_total() {
        let page = parse_items_total(serde_json::json!({"items": [{"id": 1}], "total": 9})).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 9);

        let page = parse_items_total(serde_json::json!({"data": [1, 2]})).unwrap();
        assert_eq!(page.total, 2);

        let page = parse_items_total(serde_json::json!([1, 2, 3])).unwrap();
        assert_eq!(page.total, 3);

        assert!(parse_items_total(serde_json::json!({"total": 3})).is_err());
        assert!(parse_items_total(serde_json::json!({"items": [], "total": -1})).is_err());
        assert!(parse_items_total(serde_json::json!("nope")).is_err());
    }
}
