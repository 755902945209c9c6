//! Page type for paginated query results.

/// A page of query results together with the total matching count.
///
/// Both the local engine and the remote executor produce this type, so the
/// table does not care which path filled it. Pages are replaced wholesale on
/// every successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    total: usize,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    /// Returns a reference to the items in this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Consumes the page and returns the items and total.
    pub fn into_parts(self) -> (Vec<T>, usize) {
        (self.items, self.total)
    }

    /// Returns the total number of matching records across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}
