//! Principal extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in the `X-User-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use casehub_core::error::AppError;
use casehub_core::types::UserId;
use casehub_service::RequestContext;

use crate::state::AppState;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that resolves the requesting principal.
///
/// Rejects the request with 401 when the header is missing or not a UUID.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::authentication("Missing user identity"))?
            .to_str()
            .map_err(|_| AppError::authentication("Invalid user identity header"))?;

        let user_id: UserId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::authentication("Invalid user identity"))?;

        Ok(AuthUser(RequestContext::new(user_id)))
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
