//! Namespace API handlers.
//!
//! # Purpose
//! Implements the create/list/delete endpoints for ephemeral namespaces. The
//! handlers validate input, translate lifecycle failures into HTTP responses,
//! and otherwise delegate to the lifecycle manager.
use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::api::ensure_request_field;
use crate::api::error::{
    ApiError, api_bad_gateway, api_conflict, api_gateway_timeout, api_internal,
    api_validation_error,
};
use crate::api::types::{CreateNamespaceRequest, DeleteNamespaceResponse, NamespaceListResponse};
use crate::app::AppState;
use crate::gateway::GatewayError;
use crate::lifecycle::{CreateNamespace, LifecycleError};
use crate::model::NamespaceView;

#[utoipa::path(
    post,
    path = "/v1/namespaces",
    tag = "namespaces",
    request_body = CreateNamespaceRequest,
    responses(
        (status = 201, description = "Namespace created", body = NamespaceView),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Namespace already exists", body = crate::api::types::ErrorResponse),
        (status = 502, description = "Cluster gateway unreachable", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_namespace(
    State(state): State<AppState>,
    Json(body): Json<CreateNamespaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_request_field("name", &body.name)?;
    ensure_request_field("owner", &body.owner)?;
    ensure_request_field("team", &body.team)?;
    if body.ttl_hours <= 0 {
        return Err(api_validation_error("ttl_hours must be greater than zero"));
    }
    let request = CreateNamespace {
        name: body.name,
        ttl_hours: body.ttl_hours,
        owner: body.owner,
        team: body.team,
    };
    match state.manager.create(request).await {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(NamespaceView::derive(&record, Utc::now())),
        )),
        Err(LifecycleError::InvalidRequest(message)) => Err(api_validation_error(&message)),
        Err(LifecycleError::Gateway(GatewayError::Conflict(_))) => {
            Err(api_conflict("already_exists", "namespace already exists"))
        }
        Err(err @ LifecycleError::Gateway(GatewayError::Transport(_))) => Err(api_bad_gateway(
            "gateway_unavailable",
            "cluster gateway unreachable",
            &err,
        )),
        Err(err) => Err(api_internal("failed to create namespace", &err)),
    }
}

#[utoipa::path(
    get,
    path = "/v1/namespaces",
    tag = "namespaces",
    params(
        ("owner" = Option<String>, Query, description = "Only return namespaces owned by this user")
    ),
    responses(
        (status = 200, description = "List namespaces with remaining TTL", body = NamespaceListResponse),
        (status = 502, description = "Cluster gateway unreachable", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_namespaces(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<Json<NamespaceListResponse>, ApiError> {
    let owner = params
        .get("owner")
        .map(String::as_str)
        .filter(|owner| !owner.is_empty());
    match state.manager.list(owner).await {
        Ok(items) => Ok(Json(NamespaceListResponse { items })),
        Err(err @ LifecycleError::Gateway(GatewayError::Transport(_))) => Err(api_bad_gateway(
            "gateway_unavailable",
            "cluster gateway unreachable",
            &err,
        )),
        Err(err) => Err(api_internal("failed to list namespaces", &err)),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/namespaces/{name}",
    tag = "namespaces",
    params(
        ("name" = String, Path, description = "Namespace name")
    ),
    responses(
        (status = 200, description = "Deletion confirmed", body = DeleteNamespaceResponse),
        (status = 502, description = "Deletion submission rejected", body = crate::api::types::ErrorResponse),
        (status = 504, description = "Deletion unconfirmed within the window", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_namespace(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteNamespaceResponse>, ApiError> {
    match state.manager.delete(&name).await {
        Ok(confirmation) => Ok(Json(DeleteNamespaceResponse {
            name: confirmation.name,
            polls: confirmation.polls,
            elapsed_ms: confirmation.elapsed.as_millis() as u64,
        })),
        Err(LifecycleError::InvalidRequest(message)) => Err(api_validation_error(&message)),
        Err(err @ LifecycleError::SubmitFailed(_)) => Err(api_bad_gateway(
            "submit_failed",
            "cluster gateway rejected the deletion",
            &err,
        )),
        Err(LifecycleError::ConfirmTimeout { name, waited }) => Err(api_gateway_timeout(&format!(
            "deletion of {name} unconfirmed after {}s; the gateway may still complete it",
            waited.as_secs()
        ))),
        Err(err) => Err(api_internal("failed to delete namespace", &err)),
    }
}
