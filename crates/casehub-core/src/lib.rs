//! # casehub-core
//!
//! Core crate for CaseHub. Contains the unified error system, configuration
//! schemas, typed identifiers, and the traits implemented by the storage and
//! database crates.
//!
//! This crate has **no** internal dependencies on other CaseHub crates.

pub mod config;
pub mod error;
#[cfg(feature = "axum")]
pub mod http_error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
