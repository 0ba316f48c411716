use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::lifecycle::{DEFAULT_CONFIRM_TIMEOUT, DEFAULT_POLL_INTERVAL, LifecycleConfig};

/// Which gateway implementation talks to the cluster control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayBackend {
    Memory,
    Http,
}

impl GatewayBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "http" => Ok(Self::Http),
            other => bail!("unsupported gateway backend: {other}"),
        }
    }
}

// Lifecycle service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct LifecycleServiceConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub gateway_backend: GatewayBackend,
    pub gateway_url: Option<String>,
    pub gateway_token: Option<String>,
    pub poll_interval_ms: u64,
    pub confirm_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct LifecycleServiceConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    gateway_backend: Option<String>,
    gateway_url: Option<String>,
    gateway_token_file: Option<String>,
    poll_interval_ms: Option<u64>,
    confirm_timeout_secs: Option<u64>,
}

impl LifecycleServiceConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("MAYFLY_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse MAYFLY_BIND")?;
        let metrics_bind = std::env::var("MAYFLY_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse MAYFLY_METRICS_BIND")?;
        let gateway_backend = GatewayBackend::parse(
            &std::env::var("MAYFLY_GATEWAY").unwrap_or_else(|_| "memory".to_string()),
        )?;
        let gateway_url = std::env::var("MAYFLY_GATEWAY_URL").ok();
        let gateway_token = match std::env::var("MAYFLY_GATEWAY_TOKEN_FILE") {
            Ok(path) => Some(read_token_file(&path)?),
            Err(_) => None,
        };
        let poll_interval_ms = env_u64(
            "MAYFLY_DELETE_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL.as_millis() as u64,
        )?;
        let confirm_timeout_secs = env_u64(
            "MAYFLY_DELETE_CONFIRM_TIMEOUT_SECS",
            DEFAULT_CONFIRM_TIMEOUT.as_secs(),
        )?;
        let config = Self {
            bind_addr,
            metrics_bind,
            gateway_backend,
            gateway_url,
            gateway_token,
            poll_interval_ms,
            confirm_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("MAYFLY_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read MAYFLY_CONFIG: {path}"))?;
            let override_cfg: LifecycleServiceConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse lifecycle config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.gateway_backend {
                config.gateway_backend = GatewayBackend::parse(&value)?;
            }
            if let Some(value) = override_cfg.gateway_url {
                config.gateway_url = Some(value);
            }
            if let Some(value) = override_cfg.gateway_token_file {
                config.gateway_token = Some(read_token_file(&value)?);
            }
            if let Some(value) = override_cfg.poll_interval_ms {
                config.poll_interval_ms = value;
            }
            if let Some(value) = override_cfg.confirm_timeout_secs {
                config.confirm_timeout_secs = value;
            }
            config.validate()?;
        }
        Ok(config)
    }

    /// Confirmation-protocol tuning in the manager's terms.
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            confirm_timeout: Duration::from_secs(self.confirm_timeout_secs),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("delete poll interval must be positive");
        }
        if self.gateway_backend == GatewayBackend::Http && self.gateway_url.is_none() {
            bail!("a gateway url is required for the http backend");
        }
        Ok(())
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value.parse().with_context(|| format!("parse {name}")),
        Err(_) => Ok(default),
    }
}

fn read_token_file(path: &str) -> Result<String> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read gateway token file: {path}"))?;
    Ok(raw.trim().to_string())
}
