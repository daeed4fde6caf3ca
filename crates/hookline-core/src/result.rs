//! Convenience result type alias for Hookline.

use crate::error::AppError;

/// A specialized `Result` type for Hookline operations.
pub type AppResult<T> = Result<T, AppError>;
