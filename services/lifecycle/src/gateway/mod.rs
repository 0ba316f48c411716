use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::NamespaceRecord;

pub mod http;
pub mod memory;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl GatewayError {
    /// True only for the definitive record-is-gone signal. Transport and other
    /// failures carry no information about whether the record still exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Seam to the cluster control plane that owns namespace records.
///
/// `delete_record` only submits the deletion; the record may linger while the
/// control plane finalizes it. Callers that need certainty poll `get_record`
/// until it reports [`GatewayError::NotFound`].
#[async_trait]
pub trait NamespaceGateway: Send + Sync {
    async fn create_record(
        &self,
        name: &str,
        annotations: HashMap<String, String>,
    ) -> GatewayResult<NamespaceRecord>;
    async fn get_record(&self, name: &str) -> GatewayResult<NamespaceRecord>;
    async fn delete_record(&self, name: &str) -> GatewayResult<()>;
    async fn list_records(&self) -> GatewayResult<Vec<NamespaceRecord>>;

    async fn health_check(&self) -> GatewayResult<()>;
    fn backend_name(&self) -> &'static str;
}
