//! Namespace lifecycle orchestration.
//!
//! # Purpose
//! Implements the create/list/delete workflows on top of a
//! [`NamespaceGateway`]. Deletion is two-phase: submit the delete, then poll
//! the gateway until the record is confirmed gone or the confirmation window
//! closes. Only a definitive not-found counts as confirmation; a failing poll
//! says nothing about whether the record still exists.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;

use crate::gateway::{GatewayError, NamespaceGateway};
use crate::model::{LifecycleMeta, NamespaceRecord, NamespaceView};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning for the delete-confirmation protocol.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Pause between confirmation polls.
    pub poll_interval: Duration,
    /// Total window in which the deletion must be confirmed.
    pub confirm_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

/// A validated request to provision an ephemeral namespace.
#[derive(Debug, Clone)]
pub struct CreateNamespace {
    pub name: String,
    pub ttl_hours: i64,
    pub owner: String,
    pub team: String,
}

/// Proof that a deletion was observed as complete.
#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    pub name: String,
    /// Number of gateway reads it took to observe the record gone.
    pub polls: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("delete submission rejected: {0}")]
    SubmitFailed(#[source] GatewayError),
    #[error("deletion of {name} unconfirmed after {waited:?}")]
    ConfirmTimeout { name: String, waited: Duration },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct LifecycleManager {
    gateway: Arc<dyn NamespaceGateway>,
    config: LifecycleConfig,
}

impl LifecycleManager {
    pub fn new(gateway: Arc<dyn NamespaceGateway>, config: LifecycleConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Provisions a namespace stamped with owner, team, and expiry annotations.
    /// The expiry is computed once here; readers derive the remaining TTL from
    /// it on every list call.
    pub async fn create(
        &self,
        request: CreateNamespace,
    ) -> Result<NamespaceRecord, LifecycleError> {
        validate(&request)?;
        let ttl = chrono::Duration::try_hours(request.ttl_hours)
            .ok_or_else(|| LifecycleError::InvalidRequest("ttl_hours out of range".into()))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| LifecycleError::InvalidRequest("ttl_hours out of range".into()))?;
        let meta = LifecycleMeta {
            owner: request.owner,
            team: request.team,
            expires_at: Some(expires_at),
        };
        let record = self
            .gateway
            .create_record(&request.name, meta.encode())
            .await?;
        metrics::counter!("mayfly_namespace_creates_total").increment(1);
        tracing::info!(
            namespace = %record.name,
            owner = %meta.owner,
            team = %meta.team,
            %expires_at,
            "namespace created"
        );
        Ok(record)
    }

    /// Lists namespaces with their remaining TTL derived against one clock
    /// reading, optionally narrowed to an exact owner match.
    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<NamespaceView>, LifecycleError> {
        let records = self.gateway.list_records().await?;
        let now = Utc::now();
        let views = records
            .iter()
            .map(|record| NamespaceView::derive(record, now))
            .filter(|view| owner.map_or(true, |owner| view.owner == owner))
            .collect();
        Ok(views)
    }

    /// Submits the deletion and then confirms it completed.
    ///
    /// If the gateway rejects the submission no polling happens at all. After
    /// a successful submission the gateway is read every `poll_interval` until
    /// it reports the record gone; once `confirm_timeout` passes without that,
    /// the deletion counts as unconfirmed and an error is returned even though
    /// the control plane may still finish it later.
    pub async fn delete(&self, name: &str) -> Result<DeleteConfirmation, LifecycleError> {
        if name.is_empty() {
            return Err(LifecycleError::InvalidRequest("name must not be empty".into()));
        }
        if let Err(err) = self.gateway.delete_record(name).await {
            metrics::counter!("mayfly_namespace_deletes_total", "outcome" => "submit_failed")
                .increment(1);
            return Err(LifecycleError::SubmitFailed(err));
        }
        tracing::debug!(namespace = %name, "delete submitted, awaiting confirmation");
        self.confirm_deletion(name).await
    }

    async fn confirm_deletion(&self, name: &str) -> Result<DeleteConfirmation, LifecycleError> {
        let started = Instant::now();
        let deadline = started + self.config.confirm_timeout;
        let mut polls = 0u32;
        loop {
            polls += 1;
            match self.gateway.get_record(name).await {
                Err(err) if err.is_not_found() => {
                    let elapsed = started.elapsed();
                    metrics::counter!("mayfly_namespace_deletes_total", "outcome" => "confirmed")
                        .increment(1);
                    tracing::info!(namespace = %name, polls, ?elapsed, "deletion confirmed");
                    return Ok(DeleteConfirmation {
                        name: name.to_string(),
                        polls,
                        elapsed,
                    });
                }
                Err(err) => {
                    // The record may well still exist; keep polling.
                    tracing::warn!(namespace = %name, error = %err, "confirmation poll failed");
                }
                Ok(_) => {}
            }
            if Instant::now() >= deadline {
                metrics::counter!("mayfly_namespace_deletes_total", "outcome" => "unconfirmed")
                    .increment(1);
                return Err(LifecycleError::ConfirmTimeout {
                    name: name.to_string(),
                    waited: self.config.confirm_timeout,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

fn validate(request: &CreateNamespace) -> Result<(), LifecycleError> {
    if request.name.is_empty() {
        return Err(LifecycleError::InvalidRequest("name must not be empty".into()));
    }
    if request.owner.is_empty() {
        return Err(LifecycleError::InvalidRequest("owner must not be empty".into()));
    }
    if request.team.is_empty() {
        return Err(LifecycleError::InvalidRequest("team must not be empty".into()));
    }
    if request.ttl_hours <= 0 {
        return Err(LifecycleError::InvalidRequest(
            "ttl_hours must be greater than zero".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::model::LifecycleMeta;

    fn manager(gateway: Arc<InMemoryGateway>) -> LifecycleManager {
        LifecycleManager::new(gateway, LifecycleConfig::default())
    }

    fn request(name: &str, owner: &str) -> CreateNamespace {
        CreateNamespace {
            name: name.to_string(),
            ttl_hours: 6,
            owner: owner.to_string(),
            team: "platform".to_string(),
        }
    }

    #[tokio::test]
    async fn create_stamps_lifecycle_annotations() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway.clone());
        manager.create(request("demo", "alice")).await.expect("create");

        let record = gateway.get_record("demo").await.expect("stored");
        let meta = LifecycleMeta::decode(&record.annotations);
        assert_eq!(meta.owner, "alice");
        assert_eq!(meta.team, "platform");
        let remaining = meta.expires_at.expect("expiry") - Utc::now();
        assert!(remaining <= chrono::Duration::hours(6));
        assert!(remaining > chrono::Duration::minutes(355));
    }

    #[tokio::test]
    async fn create_rejects_incomplete_requests() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway.clone());

        let mut missing_owner = request("demo", "alice");
        missing_owner.owner.clear();
        let err = manager.create(missing_owner).await.expect_err("owner");
        assert!(matches!(err, LifecycleError::InvalidRequest(_)));

        let mut zero_ttl = request("demo", "alice");
        zero_ttl.ttl_hours = 0;
        let err = manager.create(zero_ttl).await.expect_err("ttl");
        assert!(matches!(err, LifecycleError::InvalidRequest(_)));

        // Nothing reached the gateway.
        assert!(gateway.list_records().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn create_surfaces_gateway_conflicts() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway);
        manager.create(request("demo", "alice")).await.expect("create");
        let err = manager
            .create(request("demo", "bob"))
            .await
            .expect_err("duplicate");
        assert!(matches!(
            err,
            LifecycleError::Gateway(GatewayError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_on_exact_owner() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway);
        manager.create(request("alpha", "alice")).await.expect("create");
        manager.create(request("bravo", "bob")).await.expect("create");
        manager.create(request("gamma", "alice")).await.expect("create");

        let all = manager.list(None).await.expect("list");
        assert_eq!(all.len(), 3);

        let alices: Vec<String> = manager
            .list(Some("alice"))
            .await
            .expect("list")
            .into_iter()
            .map(|view| view.name)
            .collect();
        assert_eq!(alices, ["alpha", "gamma"]);

        assert!(manager.list(Some("mallory")).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_confirms_against_an_immediate_gateway() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway);
        manager.create(request("demo", "alice")).await.expect("create");

        let confirmation = manager.delete("demo").await.expect("delete");
        assert_eq!(confirmation.name, "demo");
        assert_eq!(confirmation.polls, 1);
    }
}
