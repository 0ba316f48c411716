//! Lifecycle HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::api;
use crate::gateway::NamespaceGateway;
use crate::lifecycle::LifecycleManager;
use crate::observability;

#[derive(Clone)]
pub struct AppState {
    pub manager: LifecycleManager,
    pub gateway: Arc<dyn NamespaceGateway>,
    pub service_name: String,
    pub api_version: String,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/namespaces",
            axum::routing::get(api::namespaces::list_namespaces)
                .post(api::namespaces::create_namespace),
        )
        .route(
            "/v1/namespaces/:name",
            axum::routing::delete(api::namespaces::delete_namespace),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::serve_openapi),
        )
        .layer(trace_layer)
        .with_state(state)
}
