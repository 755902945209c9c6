//! Query state shared by the URL codec, the local engine and the remote
//! executor.
//!
//! # Types
//!
//! - [`QueryState`] - canonical page/limit/search/filters/sort/view state
//! - [`FilterValue`] / [`Filters`] - normalized per-field filter values
//! - [`Sort`] / [`Direction`] - single-field ordering
//! - [`Page`] - a page of results with the total matching count

mod filter;
mod order;
mod page;
mod state;

pub use filter::FilterValue;
pub use filter::Filters;
pub use order::Direction;
pub use order::Sort;
pub use page::Page;
pub use state::QueryState;
pub use state::DEFAULT_LIMIT;
