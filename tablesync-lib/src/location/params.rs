//! Ordered query-string parameters.

use std::fmt;

use url::form_urlencoded;

/// An ordered list of query-string parameters.
///
/// Values are stored decoded; encoding happens in
/// [`to_query_string`](Self::to_query_string) using
/// `application/x-www-form-urlencoded` rules.
///
/// # Example
///
/// ```
/// use tablesync_lib::location::UrlParams;
///
/// let mut params = UrlParams::parse("?page=2&query=red+shoes");
/// assert_eq!(params.get("query"), Some("red shoes"));
///
/// params.set("page", "3");
/// params.remove("query");
/// assert_eq!(params.to_query_string(), "page=3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    pairs: Vec<(String, String)>,
}

impl UrlParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Serializes the parameters into a query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Returns the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Sets a key to a single value.
    ///
    /// The first existing occurrence is replaced in place and any others are
    /// removed; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                self.pairs[pos].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= pos || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// Appends a value without touching existing occurrences.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Removes every occurrence of a key.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Keeps only the pairs for which the predicate returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.pairs.retain(|(k, v)| keep(k, v));
    }

    /// Iterates over the pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UrlParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for UrlParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes() {
        let params = UrlParams::parse("sort=price%7Casc&filter_tags=%5B%22a%22%5D");
        assert_eq!(params.get("sort"), Some("price|asc"));
        assert_eq!(params.get("filter_tags"), Some("[\"a\"]"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = UrlParams::parse("a=1&b=2&a=3&c=4");
        params.set("a", "9");
        assert_eq!(params.to_query_string(), "a=9&b=2&c=4");
        params.set("d", "5");
        assert_eq!(params.to_query_string(), "a=9&b=2&c=4&d=5");
    }

    #[test]
    fn test_round_trips_special_characters() {
        let mut params = UrlParams::new();
        params.set("query", "50% off & more");
        let parsed = UrlParams::parse(&params.to_query_string());
        assert_eq!(parsed.get("query"), Some("50% off & more"));
    }

    #[test]
    fn test_empty() {
        assert!(UrlParams::parse("").is_empty());
        assert!(UrlParams::parse("?").is_empty());
    }
}
