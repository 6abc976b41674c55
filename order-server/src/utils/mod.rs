//! Utility modules: errors, results, logging, validation.

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{ok, ok_with, AppError, AppResponse, FieldError};
pub use result::AppResult;
