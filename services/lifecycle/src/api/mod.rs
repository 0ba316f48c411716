//! Lifecycle HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared request validation helper.
pub mod error;
pub mod namespaces;
pub mod openapi;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_validation_error};

/// Rejects empty required request fields with a structured 400.
pub(crate) fn ensure_request_field(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(api_validation_error(&format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn empty_fields_are_rejected() {
        let err = ensure_request_field("owner", "").expect_err("empty");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.message.contains("owner"));

        ensure_request_field("owner", "alice").expect("present");
    }
}
