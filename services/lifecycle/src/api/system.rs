//! System/health API handlers.
//!
//! # Purpose and responsibility
//! Provides lightweight endpoints for service metadata and health checks.
//!
//! # Where it fits
//! Used by operators, probes, and automation to validate service health and
//! discover the active gateway backend and confirmation tuning.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
//! - System info is derived from in-memory configuration.
//!
//! # Security considerations
//! - These endpoints are read-only but still reveal deployment metadata.
use axum::Json;
use axum::extract::State;

use crate::api::error::{ApiError, api_internal};
use crate::api::types::{HealthStatus, SystemInfo};
use crate::app::AppState;

#[utoipa::path(
    get,
    path = "/v1/system/info",
    tag = "system",
    responses(
        (status = 200, description = "Service identity and confirmation tuning", body = SystemInfo)
    )
)]
/// Return service identity and lifecycle tuning.
///
/// # What it does
/// Exposes the service name, API version, active gateway backend, and the
/// delete-confirmation parameters.
///
/// # Why it exists
/// Enables clients and operators to discover how deletions will behave before
/// issuing them.
///
/// # Errors
/// - Does not return errors.
pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    // Build the response from in-memory configuration (no I/O).
    let config = state.manager.config();
    Json(SystemInfo {
        service: state.service_name.clone(),
        api_version: state.api_version.clone(),
        gateway_backend: state.gateway.backend_name().to_string(),
        poll_interval_ms: config.poll_interval.as_millis() as u64,
        confirm_timeout_ms: config.confirm_timeout.as_millis() as u64,
    })
}

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
)]
/// Return service health status.
///
/// # What it does
/// Probes the cluster gateway and returns `ok` if reachable.
///
/// # Why it exists
/// Supports readiness/liveness checks and operational monitoring.
///
/// # Errors
/// - Returns 500 if the gateway health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    // Probe the gateway to surface dependency availability.
    if let Err(err) = state.gateway.health_check().await {
        return Err(api_internal("cluster gateway unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
