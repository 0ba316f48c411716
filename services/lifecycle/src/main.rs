//! Mayfly namespace lifecycle HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the cluster gateway, and the HTTP router, then starts
//! the API server alongside the metrics endpoint.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
mod api;
mod app;
mod config;
mod gateway;
mod lifecycle;
mod model;
mod observability;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use app::{AppState, build_router};
use gateway::{NamespaceGateway, http::HttpGateway, memory::InMemoryGateway};
use lifecycle::LifecycleManager;

const SERVICE_NAME: &str = "mayfly-lifecycle";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        config::LifecycleServiceConfig::from_env_or_yaml().expect("lifecycle service config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(
    config: config::LifecycleServiceConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability(SERVICE_NAME);
    let state = build_state(&config)?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        backend = state.gateway.backend_name(),
        "lifecycle service listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: &config::LifecycleServiceConfig) -> anyhow::Result<AppState> {
    let gateway: Arc<dyn NamespaceGateway> = match config.gateway_backend {
        config::GatewayBackend::Memory => Arc::new(InMemoryGateway::new()),
        config::GatewayBackend::Http => {
            let base_url = config
                .gateway_url
                .as_ref()
                .context("gateway url missing for http backend")?;
            Arc::new(HttpGateway::new(
                base_url.clone(),
                config.gateway_token.clone(),
            )?)
        }
    };
    let manager = LifecycleManager::new(gateway.clone(), config.lifecycle());
    Ok(AppState {
        manager,
        gateway,
        service_name: SERVICE_NAME.to_string(),
        api_version: "v1".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_config(backend: config::GatewayBackend) -> config::LifecycleServiceConfig {
        config::LifecycleServiceConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            gateway_backend: backend,
            gateway_url: None,
            gateway_token: None,
            poll_interval_ms: 500,
            confirm_timeout_secs: 30,
        }
    }

    #[tokio::test]
    async fn build_state_memory_backend() {
        let config = test_config(config::GatewayBackend::Memory);
        let state = build_state(&config).expect("state");
        assert_eq!(state.gateway.backend_name(), "memory");
        assert_eq!(state.api_version, "v1");
    }

    #[tokio::test]
    async fn build_state_http_requires_url() {
        let config = test_config(config::GatewayBackend::Http);
        let err = build_state(&config).err().expect("missing url");
        assert!(err.to_string().contains("gateway url missing"));
    }

    #[tokio::test]
    async fn build_state_http_constructs_client_without_connecting() {
        let mut config = test_config(config::GatewayBackend::Http);
        config.gateway_url = Some("http://127.0.0.1:1".to_string());
        let state = build_state(&config).expect("state");
        assert_eq!(state.gateway.backend_name(), "http");
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        let config = test_config(config::GatewayBackend::Memory);
        run_with_shutdown(config, async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
