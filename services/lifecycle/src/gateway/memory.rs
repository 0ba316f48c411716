//! In-memory implementation of the namespace gateway.
//!
//! # Purpose
//! Implements [`NamespaceGateway`] entirely in memory behind a
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no cluster required)
//! - exercising the delete-confirmation protocol deterministically
//!
//! # Deletion lag
//! A real control plane finalizes deletions asynchronously: the record keeps
//! resolving for a while after the delete was accepted. `with_deletion_lag`
//! reproduces that window. A deleted record stays readable until the lag
//! elapses and is purged lazily on the next access, the same expiry-on-read
//! scheme the ephemeral caches use. Without a configured lag, deletes take
//! effect immediately.
//!
//! Not durable: all state is lost on process restart.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{GatewayError, GatewayResult, NamespaceGateway};
use crate::model::NamespaceRecord;

struct StoredRecord {
    record: NamespaceRecord,
    /// Set when a delete was accepted but the lag has not yet elapsed.
    deleted_at: Option<Instant>,
}

pub struct InMemoryGateway {
    /// Insertion-ordered so list output is deterministic.
    records: RwLock<Vec<StoredRecord>>,
    deletion_lag: Option<Duration>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            deletion_lag: None,
        }
    }

    /// Builds a gateway whose deletes keep the record resolvable for `lag`
    /// before it disappears.
    pub fn with_deletion_lag(lag: Duration) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            deletion_lag: Some(lag),
        }
    }

    fn purge_finalized(&self, records: &mut Vec<StoredRecord>) {
        let Some(lag) = self.deletion_lag else {
            return;
        };
        records.retain(|entry| match entry.deleted_at {
            Some(deleted_at) => deleted_at.elapsed() < lag,
            None => true,
        });
    }

    fn lookup(records: &[StoredRecord], name: &str) -> GatewayResult<NamespaceRecord> {
        records
            .iter()
            .find(|entry| entry.record.name == name)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamespaceGateway for InMemoryGateway {
    async fn create_record(
        &self,
        name: &str,
        annotations: HashMap<String, String>,
    ) -> GatewayResult<NamespaceRecord> {
        let mut records = self.records.write().await;
        self.purge_finalized(&mut records);
        // A record still finalizing its deletion also blocks re-creation.
        if records.iter().any(|entry| entry.record.name == name) {
            return Err(GatewayError::Conflict("namespace exists".into()));
        }
        let record = NamespaceRecord {
            name: name.to_string(),
            annotations,
            created_at: Utc::now(),
        };
        records.push(StoredRecord {
            record: record.clone(),
            deleted_at: None,
        });
        metrics::gauge!("mayfly_namespace_records").set(records.len() as f64);
        Ok(record)
    }

    async fn get_record(&self, name: &str) -> GatewayResult<NamespaceRecord> {
        // Without a lag there is nothing to purge; readers share the lock.
        if self.deletion_lag.is_none() {
            let records = self.records.read().await;
            return Self::lookup(&records, name);
        }
        let mut records = self.records.write().await;
        self.purge_finalized(&mut records);
        Self::lookup(&records, name)
    }

    async fn delete_record(&self, name: &str) -> GatewayResult<()> {
        let mut records = self.records.write().await;
        self.purge_finalized(&mut records);
        let Some(position) = records.iter().position(|entry| entry.record.name == name) else {
            return Err(GatewayError::NotFound(name.to_string()));
        };
        match self.deletion_lag {
            None => {
                records.remove(position);
            }
            Some(_) => {
                let entry = &mut records[position];
                // Repeat deletes keep the original finalization deadline.
                if entry.deleted_at.is_none() {
                    entry.deleted_at = Some(Instant::now());
                }
            }
        }
        metrics::gauge!("mayfly_namespace_records").set(records.len() as f64);
        Ok(())
    }

    async fn list_records(&self) -> GatewayResult<Vec<NamespaceRecord>> {
        if self.deletion_lag.is_none() {
            let records = self.records.read().await;
            metrics::gauge!("mayfly_namespace_records").set(records.len() as f64);
            return Ok(records.iter().map(|entry| entry.record.clone()).collect());
        }
        let mut records = self.records.write().await;
        self.purge_finalized(&mut records);
        metrics::gauge!("mayfly_namespace_records").set(records.len() as f64);
        Ok(records.iter().map(|entry| entry.record.clone()).collect())
    }

    async fn health_check(&self) -> GatewayResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
