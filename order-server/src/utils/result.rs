//! Unified Result Types
//!
//! Type aliases for commonly used Result types across the application.

use crate::utils::AppError;

/// Application-level Result type, used in HTTP handlers and services.
pub type AppResult<T> = Result<T, AppError>;
