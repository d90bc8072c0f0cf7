//! Convenience result type alias for Keliling.

use crate::error::AppError;

/// A specialized `Result` type for Keliling operations.
pub type AppResult<T> = Result<T, AppError>;
