//! Namespace model definitions and lifecycle metadata.
//!
//! # Purpose
//! Defines the gateway-owned namespace record, the typed lifecycle metadata
//! carried in its annotations, and the read-side view with the remaining TTL
//! derived at request time.
use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Annotation key holding the requesting user.
pub const ANNOTATION_OWNER: &str = "owner";
/// Annotation key holding the owning team.
pub const ANNOTATION_TEAM: &str = "team";
/// Annotation key holding the RFC 3339 expiry timestamp.
pub const ANNOTATION_EXPIRES_AT: &str = "expires_at";

/// A namespace as the backing gateway stores it. Lifecycle state lives in the
/// string annotation map; [`LifecycleMeta`] is the typed façade over it.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NamespaceRecord {
    pub name: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Typed form of the reserved lifecycle annotations.
///
/// Records written by other tooling may carry none of the reserved keys, so
/// decoding is total: missing owner or team decode to empty strings and a
/// missing or unparseable expiry decodes to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleMeta {
    pub owner: String,
    pub team: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LifecycleMeta {
    /// Renders the metadata into the annotation map the gateway persists.
    /// The expiry is written as RFC 3339 in UTC.
    pub fn encode(&self) -> HashMap<String, String> {
        let mut annotations = HashMap::new();
        annotations.insert(ANNOTATION_OWNER.to_string(), self.owner.clone());
        annotations.insert(ANNOTATION_TEAM.to_string(), self.team.clone());
        if let Some(expires_at) = self.expires_at {
            annotations.insert(
                ANNOTATION_EXPIRES_AT.to_string(),
                expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        annotations
    }

    /// Reads the reserved keys back out of an annotation map.
    pub fn decode(annotations: &HashMap<String, String>) -> Self {
        let text = |key: &str| annotations.get(key).cloned().unwrap_or_default();
        let expires_at = annotations
            .get(ANNOTATION_EXPIRES_AT)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc));
        Self {
            owner: text(ANNOTATION_OWNER),
            team: text(ANNOTATION_TEAM),
            expires_at,
        }
    }
}

/// Read-side projection of a [`NamespaceRecord`] returned by list calls.
///
/// `remaining_ttl_hours` is derived from the wall clock at request time, never
/// stored: whole hours left until expiry, clamped to zero once expired or when
/// the record carries no expiry at all.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NamespaceView {
    pub name: String,
    pub owner: String,
    pub team: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub remaining_ttl_hours: i64,
}

impl NamespaceView {
    /// Projects a record against the supplied clock reading.
    pub fn derive(record: &NamespaceRecord, now: DateTime<Utc>) -> Self {
        let meta = LifecycleMeta::decode(&record.annotations);
        let remaining_ttl_hours = meta
            .expires_at
            .map(|expires_at| (expires_at - now).num_hours().max(0))
            .unwrap_or(0);
        Self {
            name: record.name.clone(),
            owner: meta.owner,
            team: meta.team,
            created_at: record.created_at,
            expires_at: meta.expires_at,
            remaining_ttl_hours,
        }
    }
}
