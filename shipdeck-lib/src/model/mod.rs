//! Record model
//!
//! Dynamic records keyed by field name, the identifiers that address them in
//! the store, and the partial updates written back.

pub mod fields;

mod id;
mod patch;
mod record;
mod record_serde;
mod value;

pub use id::*;
pub use patch::*;
pub use record::*;
pub use value::*;
