//! Namespace lifecycle service library crate.
//!
//! # Purpose
//! Exposes the lifecycle API surface, configuration, gateway implementations,
//! and the delete-confirmation protocol for use by the binary and tests.
//!
//! # Notes
//! Module boundaries mirror the HTTP API and the gateway seam for clarity.
pub mod api;
pub mod app;
pub mod config;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod observability;
