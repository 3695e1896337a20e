//! Authentication extractor
//!
//! Resolves the caller from the session cookie, falling back to an
//! `Authorization: Bearer` header for non-browser clients.

use crate::auth::Claims;
use crate::cookies::{self, TOKEN_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

/// Authenticated caller extracted from a verified session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    cookies::get(headers, TOKEN_COOKIE).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
    })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let claims = app_state.jwt().validate_token(token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser { claims })
    }
}
