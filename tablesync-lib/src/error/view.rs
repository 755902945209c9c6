//! View error types

/// Errors raised by view preset operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The built-in "All" view cannot be renamed, duplicated, updated or deleted.
    #[error("the default view cannot be modified")]
    Locked,

    /// The view index does not exist.
    #[error("view index {index} out of range (have {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of views.
        len: usize,
    },
}
