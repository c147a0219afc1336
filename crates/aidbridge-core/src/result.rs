//! Convenience result type alias for AidBridge.

use crate::error::AppError;

/// A specialized `Result` type for AidBridge operations.
pub type AppResult<T> = Result<T, AppError>;
