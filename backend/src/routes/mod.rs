//! Route definitions for the Acquisitions API
//!
//! This module organizes all API routes and applies middleware.

use crate::error::ApiError;
use crate::protection::{edge_protection, with_rate_limit};
use crate::state::AppState;
use acquisitions_shared::MessageResponse;
use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Json, Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;


pub use auth::auth_routes;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from Acquisitions!" }))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api", api_routes(&state))
        .fallback(|| async { ApiError::NotFound("Route not found".to_string()) })
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes behind edge protection.
///
/// The rate limit is the outermost layer, so throttled clients never reach
/// the shield and bot rules.
fn api_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route(
            "/",
            get(|| async { Json(MessageResponse::new("Acquisitions API is running!")) }),
        )
        .nest("/auth", auth::auth_routes());

    let protection = &state.config().protection;
    if !protection.enabled {
        return router;
    }

    let router = router.layer(middleware::from_fn_with_state(state.clone(), edge_protection));

    if protection.rate_limit.enabled {
        with_rate_limit(router, &protection.rate_limit)
    } else {
        router
    }
}
