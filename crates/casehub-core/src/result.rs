//! Convenience result type alias for CaseHub.

use crate::error::AppError;

/// A specialized `Result` type for CaseHub operations.
pub type AppResult<T> = Result<T, AppError>;
