//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the lifecycle REST API and OpenAPI schema
//! generation.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::NamespaceView;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub gateway_backend: String,
    pub poll_interval_ms: u64,
    pub confirm_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Body of `POST /v1/namespaces`. All fields default so that missing ones
/// reach validation and produce a structured 400 instead of a decode error.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
#[serde(default)]
pub struct CreateNamespaceRequest {
    pub name: String,
    pub ttl_hours: i64,
    pub owner: String,
    pub team: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NamespaceListResponse {
    pub items: Vec<NamespaceView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DeleteNamespaceResponse {
    pub name: String,
    /// Gateway reads it took to observe the record gone.
    pub polls: u32,
    pub elapsed_ms: u64,
}
