//! The table orchestrator.
//!
//! [`DataTable`] owns the canonical [`QueryState`](crate::query::QueryState)
//! and keeps it in step with the parameter store and the data source:
//!
//! ```text
//! setter ──► state (one lock) ──► debounced URL write ──► ParamStore
//!                            └──► local recompute | debounced remote fetch
//!                                                  └──► TableSnapshot + revision
//! ```

mod config;
mod data_table;
mod debounce;
mod snapshot;

pub use config::*;
pub use data_table::*;
pub use debounce::*;
pub use snapshot::*;
