//! OpenAPI schema aggregation for the lifecycle API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document, served
//! as plain JSON for docs and client generation.
use axum::Json;
use utoipa::OpenApi;

use crate::api::{
    namespaces, system,
    types::{
        CreateNamespaceRequest, DeleteNamespaceResponse, ErrorResponse, HealthStatus,
        NamespaceListResponse, SystemInfo,
    },
};
use crate::model::{NamespaceRecord, NamespaceView};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mayfly-lifecycle",
        version = "v1",
        description = "Ephemeral namespace lifecycle HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        namespaces::list_namespaces,
        namespaces::create_namespace,
        namespaces::delete_namespace
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        NamespaceRecord,
        NamespaceView,
        CreateNamespaceRequest,
        NamespaceListResponse,
        DeleteNamespaceResponse
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "namespaces", description = "Ephemeral namespace lifecycle")
    )
)]
pub struct ApiDoc;

pub(crate) async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
