//! Record model consumed by the local engine

mod record;
mod value;

pub use record::*;
pub use value::*;
