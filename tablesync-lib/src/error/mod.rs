//! Error types

mod api;
mod view;

pub use api::*;
pub use view::*;

/// Top-level error for table operations that perform I/O.
///
/// Pure computation (URL codec, local engine, selection, pagination) never
/// fails; only remote fetches and remote view calls produce these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error talking to the remote data or views endpoint.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A view operation was rejected.
    #[error(transparent)]
    View(#[from] ViewError),
}
