//! `field||$op||value` query-string convention used by CRUD-style REST
//! backends.

use crate::query::Direction;
use crate::remote::Condition;
use crate::remote::RemoteQuery;

use super::QueryProtocol;

/// Query convention with repeated `filter` parameters.
///
/// | Condition | Parameter |
/// |---|---|
/// | `Contains` | `filter=field\|\|$cont\|\|value` |
/// | `In` | `filter=field\|\|$in\|\|a,b` |
/// | `Eq` | `filter=field\|\|$eq\|\|value` |
///
/// Sorting is `sort=field,ASC`; paging is `limit` and 1-indexed `page`.
/// Responses are read with the default `{items, total}` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrudProtocol;

impl QueryProtocol for CrudProtocol {
    fn query_pairs(&self, query: &RemoteQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for condition in &query.conditions {
            push_condition(&mut params, condition);
        }
        if let Some(sort) = &query.sort {
            let dir = match sort.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            params.push(("sort".to_string(), format!("{},{}", sort.field, dir)));
        }
        params.push(("limit".to_string(), query.limit.to_string()));
        params.push(("page".to_string(), query.page.to_string()));
        params
    }
}

fn push_condition(params: &mut Vec<(String, String)>, condition: &Condition) {
    let value = match condition {
        Condition::Eq(field, value) => format!("{}||$eq||{}", field, value.to_text()),
        Condition::Contains(field, value) => format!("{}||$cont||{}", field, value),
        Condition::In(field, values) => format!("{}||$in||{}", field, values.join(",")),
        Condition::And(conditions) => {
            for inner in conditions {
                push_condition(params, inner);
            }
            return;
        }
    };
    params.push(("filter".to_string(), value));
}
