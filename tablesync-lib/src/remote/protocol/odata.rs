//! OData query-string convention.

use crate::error::ApiError;
use crate::query::Direction;
use crate::query::Sort;
use crate::remote::Condition;
use crate::remote::Literal;
use crate::remote::RemoteQuery;

use super::QueryProtocol;
use super::RawPage;

/// OData v4 query options.
///
/// Requests `$count=true` and reads `value` plus `@odata.count` from the
/// response. If the count is missing the total is estimated from the offset
/// and the number of returned items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ODataProtocol;

impl QueryProtocol for ODataProtocol {
    fn query_pairs(&self, query: &RemoteQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();

        let filter = query
            .conditions
            .iter()
            .map(condition_to_odata)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" and ");
        if !filter.is_empty() {
            params.push(("$filter".to_string(), filter));
        }

        if let Some(sort) = &query.sort {
            params.push(("$orderby".to_string(), sort_to_odata(sort)));
        }

        params.push(("$top".to_string(), query.limit.to_string()));
        if query.offset() > 0 {
            params.push(("$skip".to_string(), query.offset().to_string()));
        }
        params.push(("$count".to_string(), "true".to_string()));

        params
    }

    fn parse_page(&self, body: serde_json::Value, query: &RemoteQuery) -> Result<RawPage, ApiError> {
        let serde_json::Value::Object(mut map) = body else {
            return Err(ApiError::parse("expected an OData collection object"));
        };
        let items = match map.remove("value") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(ApiError::parse("response has no `value` array")),
        };
        let total = map
            .get("@odata.count")
            .and_then(serde_json::Value::as_u64)
            .map(|count| count as usize)
            .unwrap_or_else(|| query.offset() + items.len());
        Ok(RawPage { items, total })
    }
}

/// Converts a `Condition` to an OData `$filter` expression.
pub fn condition_to_odata(condition: &Condition) -> String {
    match condition {
        Condition::Eq(field, value) => format!("{} eq {}", field, literal_to_odata(value)),
        Condition::Contains(field, value) => {
            format!("contains({},{})", field, escape_string(value))
        }
        Condition::In(field, values) => {
            if values.is_empty() {
                return String::new();
            }
            let parts: Vec<_> = values
                .iter()
                .map(|v| format!("{} eq {}", field, escape_string(v)))
                .collect();
            format!("({})", parts.join(" or "))
        }
        Condition::And(conditions) => {
            if conditions.is_empty() {
                return String::new();
            }
            let parts: Vec<_> = conditions.iter().map(condition_to_odata).collect();
            format!("({})", parts.join(" and "))
        }
    }
}

/// Converts a `Literal` to an OData literal representation.
pub fn literal_to_odata(value: &Literal) -> String {
    match value {
        Literal::String(s) => escape_string(s),
        Literal::Bool(b) => b.to_string(),
        Literal::Number(_) => value.to_text(),
    }
}

/// Converts a `Sort` to an OData `$orderby` expression.
pub fn sort_to_odata(sort: &Sort) -> String {
    let dir = match sort.direction {
        Direction::Asc => "asc",
        Direction::Desc => "desc",
    };
    format!("{} {}", sort.field, dir)
}

/// Escapes a string for use in OData queries.
///
/// OData strings are enclosed in single quotes, with internal single quotes doubled.
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
