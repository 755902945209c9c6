//! Address-bar state: query parameters, the query-state codec and the
//! parameter stores that stand in for the browser location.

pub mod codec;
mod params;
mod store;

pub use params::UrlParams;
pub use store::*;
