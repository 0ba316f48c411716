//! Lifecycle data model module.
//!
//! # Purpose
//! Re-exports the namespace record, typed lifecycle metadata, and derived view
//! used by the gateway and API layers.
mod namespace;

pub use namespace::{
    ANNOTATION_EXPIRES_AT, ANNOTATION_OWNER, ANNOTATION_TEAM, LifecycleMeta, NamespaceRecord,
    NamespaceView,
};
