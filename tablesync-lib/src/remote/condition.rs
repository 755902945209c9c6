//! Backend-neutral filter conditions built from the table state.

use crate::model::format_number;
use crate::query::FilterValue;
use crate::query::QueryState;
use crate::query::Sort;

/// A literal operand in a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal.
    String(String),
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
}

impl Literal {
    /// Returns the unquoted text form of the literal.
    pub fn to_text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Number(n) => format_number(*n),
            Literal::Bool(b) => b.to_string(),
        }
    }
}

/// A filter condition sent to the backend.
///
/// Protocols render these into their own query-string syntax.
///
/// # Example
///
/// ```
/// use tablesync_lib::query::FilterValue;
/// use tablesync_lib::remote::Condition;
///
/// let condition = Condition::from_filter("status", &FilterValue::from(vec!["open", "pending"]));
/// assert_eq!(
///     condition,
///     Some(Condition::In("status".into(), vec!["open".into(), "pending".into()]))
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality: `field = value`.
    Eq(String, Literal),
    /// Substring match: `field contains value`.
    Contains(String, String),
    /// Membership: `field in (values...)`.
    In(String, Vec<String>),
    /// Logical AND of multiple conditions.
    And(Vec<Condition>),
}

impl Condition {
    /// Maps a table filter onto a condition.
    ///
    /// Strings become `Contains`, lists `In`, numbers and flags `Eq`.
    /// Empty values yield `None`.
    pub fn from_filter(field: &str, value: &FilterValue) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        let field = field.to_string();
        match value {
            FilterValue::Scalar(s) => Some(Condition::Contains(field, s.clone())),
            FilterValue::List(items) => Some(Condition::In(field, items.clone())),
            FilterValue::Numeric(n) => Some(Condition::Eq(field, Literal::Number(*n))),
            FilterValue::Flag(b) => Some(Condition::Eq(field, Literal::Bool(*b))),
            FilterValue::Empty => None,
        }
    }

    /// Creates a logical AND of multiple conditions.
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::And(conditions.into_iter().collect())
    }
}

/// Everything a [`QueryProtocol`](super::QueryProtocol) needs to build the
/// outbound query string.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    /// Filter conditions, combined with AND.
    pub conditions: Vec<Condition>,
    /// Active sort.
    pub sort: Option<Sort>,
    /// Page, 1-indexed.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl RemoteQuery {
    /// Builds a remote query from table state.
    ///
    /// The free-text query is folded in as a `Contains` condition on
    /// `query_field`, after the field filters.
    pub fn from_state(state: &QueryState, query_field: Option<&str>) -> Self {
        let mut conditions: Vec<Condition> = state
            .filters
            .iter()
            .filter_map(|(field, value)| Condition::from_filter(field, value))
            .collect();

        if let Some(field) = query_field.filter(|_| !state.query_value.is_empty()) {
            conditions.push(Condition::Contains(
                field.to_string(),
                state.query_value.clone(),
            ));
        }

        Self {
            conditions,
            sort: state.sort.clone(),
            page: state.page.max(1),
            limit: state.limit.max(1),
        }
    }

    /// Returns the zero-based offset of the first requested record.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}
