//! # casehub-api
//!
//! HTTP API layer for CaseHub built on Axum.
//!
//! Provides the upload, association, removal and case endpoints, the
//! principal extractor, request logging and CORS middleware, DTOs, and the
//! mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_state, run_server};
pub use router::build_router;
pub use state::AppState;
