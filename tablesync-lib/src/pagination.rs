//! Pagination arithmetic.

/// Derived pagination values handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// Number of pages, at least 1.
    pub total_pages: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Range label such as `"21-40 of 45"`; empty when there is nothing to show.
    pub label: String,
}

/// Pagination derived from page, limit and total.
///
/// # Example
///
/// ```
/// use tablesync_lib::pagination::Pagination;
///
/// let pagination = Pagination::new(2, 20, 45);
/// assert_eq!(pagination.total_pages(), 3);
/// assert_eq!(pagination.label(), "21-40 of 45");
/// assert_eq!(pagination.clamp(10), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    limit: usize,
    total: usize,
}

impl Pagination {
    /// Creates pagination for a page; page and limit are raised to at least 1.
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            total,
        }
    }

    /// Returns `max(1, ceil(total / limit))`.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit).max(1)
    }

    /// Returns `true` if the page is after the first.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Returns `true` if the page is before the last.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Clamps a requested page into `[1, total_pages]`.
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    /// Returns the 1-based index of the first item on the page.
    pub fn start(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit).saturating_add(1)
    }

    /// Returns the 1-based index of the last item on the page.
    pub fn end(&self) -> usize {
        self.page.saturating_mul(self.limit).min(self.total)
    }

    /// Formats `"<start>-<end> of <total>"`.
    ///
    /// Returns an empty string when there are no results or the page lies
    /// past the last result.
    pub fn label(&self) -> String {
        if self.total == 0 || self.start() > self.total {
            return String::new();
        }
        format!("{}-{} of {}", self.start(), self.end(), self.total)
    }

    /// Returns all derived values.
    pub fn view(&self) -> PaginationView {
        PaginationView {
            total_pages: self.total_pages(),
            has_previous: self.has_previous(),
            has_next: self.has_next(),
            label: self.label(),
        }
    }
}
