//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse` impl is defined in `casehub_core::http_error` (orphan
//! rule); this module re-exports its public items.

pub use casehub_core::http_error::{ApiErrorResponse, status_for};
