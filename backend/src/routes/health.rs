//! Probe endpoints for orchestrators and uptime checks
//!
//! `/health` and `/health/live` answer as long as the process serves
//! requests; `/health/ready` also round-trips the user store.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Present on readiness reports only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ComponentHealth>,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub healthy: bool,
}

impl HealthReport {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            database: None,
        }
    }
}

pub async fn health_check() -> Json<HealthReport> {
    Json(HealthReport::new("healthy"))
}

pub async fn liveness_check() -> Json<HealthReport> {
    Json(HealthReport::new("alive"))
}

/// 503 while the user store is unreachable. The cause is logged, not
/// returned.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let healthy = match state.users().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            false
        }
    };

    let (code, status) = if healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let mut report = HealthReport::new(status);
    report.database = Some(ComponentHealth { healthy });
    (code, Json(report))
}
