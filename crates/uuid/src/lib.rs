//! Answer document identifiers and sharded storage paths.
//!
//! Every in-progress application or assessment is stored under an identifier derived from a
//! UUID. The identifier has exactly one accepted textual form: **32 lowercase hexadecimal
//! characters** with no hyphens, e.g. `550e8400e29b41d4a716446655440000`.
//!
//! ## Sharded directory layout
//! For a canonical identifier `u`, documents live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! This keeps any single directory from accumulating every document ever started.

mod document_id;

pub use document_id::DocumentId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
