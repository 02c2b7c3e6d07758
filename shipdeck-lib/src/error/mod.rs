//! Error types

mod field;
mod store;

pub use field::*;
pub use store::*;

/// Top-level error for the record library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A record field could not be read as the requested type.
    #[error(transparent)]
    Field(#[from] FieldError),
}
