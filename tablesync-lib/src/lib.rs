//! Table state synchronization library
//!
//! Keeps the pagination, search, filters, sort and named views of a data
//! table consistent between in-memory state, the address-bar query string and
//! either a remote paginated API or an in-memory collection.
//!
//! - [`table::DataTable`] - the orchestrator the presentation layer talks to
//! - [`location`] - URL parameters, the query-state codec and parameter stores
//! - [`local`] - in-process filter, sort and paginate engine
//! - [`remote`] - protocol-aware fetches with per-endpoint cancellation
//! - [`selection`], [`pagination`], [`views`] - the supporting state machines

pub mod error;
pub mod local;
pub mod location;
pub mod model;
pub mod pagination;
pub mod query;
pub mod remote;
pub mod selection;
pub mod table;
pub mod views;

pub use error::Error;
pub use table::DataTable;
pub use table::TableConfig;
pub use table::TableSnapshot;
