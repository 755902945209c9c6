//! Remote query execution.
//!
//! [`RemoteExecutor`] turns table state into a request through a
//! [`QueryProtocol`], sends it with a [`Transport`], and keeps at most one
//! request in flight per endpoint.

mod condition;
mod executor;
pub mod protocol;
mod source;
mod transport;

pub use condition::*;
pub use executor::*;
pub use protocol::CrudProtocol;
pub use protocol::ODataProtocol;
pub use protocol::QueryProtocol;
pub use protocol::RawPage;
pub use source::*;
pub use transport::*;
