//! Route definitions for the CaseHub API.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Builds the complete application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    let body_limit =
        usize::try_from(state.config.server.max_body_size_bytes).unwrap_or(usize::MAX);
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(file_routes())
        .merge(case_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/files/upload", post(handlers::file::upload))
        .route("/v1/files/associate/{id}", post(handlers::file::associate))
        .route(
            "/v1/files/remove/{case_id}/{file_id}",
            delete(handlers::file::remove),
        )
}

fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cases", post(handlers::case::create_case))
        .route(
            "/v1/cases/{id}",
            get(handlers::case::get_case).delete(handlers::case::delete_case),
        )
        .route("/v1/cases/{id}/files", put(handlers::case::upload_case_files))
}
