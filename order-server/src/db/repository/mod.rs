//! Repository Module
//!
//! Per-entity query modules over the SQLite pool. State-machine writes are
//! conditional updates checked via `rows_affected()` — the compare-and-swap
//! that keeps concurrent mutations safe.

pub mod contact;
pub mod order;
pub mod payment;
pub mod supplier;
pub mod supplier_panel;

use thiserror::Error;

/// Repository error types.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A guarded update matched zero rows — the expected precondition no
    /// longer holds.
    #[error("Stale state: {0}")]
    Stale(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Stale(_) => crate::utils::AppError::stale(),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
