//! Authentication routes
//!
//! Sign-up and sign-in issue a session token in the `token` cookie;
//! sign-out clears it. Password hashing runs on the blocking thread pool.

use crate::auth::AuthUser;
use crate::cookies::TOKEN_COOKIE;
use crate::error::{ApiError, ApiResult};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;
use acquisitions_shared::validation::{validate_sign_in, validate_signup};
use acquisitions_shared::{AuthResponse, CurrentUserResponse, MessageResponse, UserResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderName, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, warn};

/// JSON body plus a single `Set-Cookie` header
type WithCookie<T> = (StatusCode, [(HeaderName, HeaderValue); 1], Json<T>);

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
        .route("/me", get(current_user))
}

fn read_body(payload: Result<Json<Value>, JsonRejection>, action: &str) -> ApiResult<Value> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(action, error = %rejection.body_text(), "Unreadable request body");
        ApiError::from(rejection)
    })
}

/// Sign a token for `user` and wrap it in a session cookie
fn session_cookie(state: &AppState, user: &UserResponse) -> ApiResult<HeaderValue> {
    let token = state.jwt().issue(user)?;
    Ok(state.cookies().set(TOKEN_COOKIE, &token)?)
}

/// POST /api/auth/sign-up
async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<WithCookie<AuthResponse>> {
    let body = read_body(payload, "sign-up")?;

    let input = validate_signup(body).map_err(|details| {
        warn!(?details, "Signup validation failed");
        ApiError::Validation(details)
    })?;

    let user = AuthService::create_user(state.users(), &input)
        .await
        .map_err(|e| {
            match &e {
                AuthError::DuplicateEmail => {
                    warn!(email = %input.email, "Signup rejected: email already exists")
                }
                other => error!(error = %other, email = %input.email, "Signup error"),
            }
            ApiError::from(e)
        })?;

    let cookie = session_cookie(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "User registered successfully");
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: "User registered".to_string(),
            user,
        }),
    ))
}

/// POST /api/auth/sign-in
///
/// Unknown email and wrong password produce the same 401 response.
async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<WithCookie<AuthResponse>> {
    let body = read_body(payload, "sign-in")?;

    let input = validate_sign_in(body).map_err(|details| {
        warn!(?details, "Sign-in validation failed");
        ApiError::Validation(details)
    })?;

    let user = AuthService::authenticate_user(state.users(), &input)
        .await
        .map_err(|e| {
            match &e {
                AuthError::UserNotFound | AuthError::InvalidCredentials => {
                    warn!(email = %input.email, reason = %e, "Sign-in failed")
                }
                other => error!(error = %other, email = %input.email, "Sign-in error"),
            }
            ApiError::from(e)
        })?;

    let cookie = session_cookie(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "User signed in successfully");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: "User signed in successfully".to_string(),
            user,
        }),
    ))
}

/// POST /api/auth/sign-out
///
/// Clears the session cookie whether or not the caller was signed in.
async fn sign_out(State(state): State<AppState>) -> ApiResult<WithCookie<MessageResponse>> {
    let cookie = state.cookies().clear(TOKEN_COOKIE).map_err(|e| {
        error!(error = %e, "Sign-out error");
        ApiError::Internal(e)
    })?;

    info!("User signed out successfully");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(MessageResponse::new("User signed out successfully")),
    ))
}

/// GET /api/auth/me
async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = state
        .users()
        .find_by_id(auth.claims.id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %auth.claims.id, "Current user lookup error");
            ApiError::from(e)
        })?
        .ok_or_else(|| {
            warn!(user_id = %auth.claims.id, "Session refers to a missing user");
            ApiError::NotFound("User not found".to_string())
        })?;

    info!(user_id = %user.id, "Current user resolved");
    Ok(Json(CurrentUserResponse {
        user: user.to_public(),
    }))
}
