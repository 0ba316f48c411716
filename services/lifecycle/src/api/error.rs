//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction to keep error shapes uniform
//! across lifecycle endpoints.
//!
//! # Where it fits
//! All API handlers use these helpers to return structured errors to clients
//! and to translate lifecycle and gateway failures into HTTP responses.
//!
//! # Key invariants and assumptions
//! - Error responses must include a stable `code` and human-readable `message`.
//! - Status codes must align with the error category; in particular, an
//!   unconfirmed deletion is a gateway timeout, never a success.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
//! - Request IDs are optional; avoid leaking sensitive details in messages.
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::types::ErrorResponse;

/// Structured API error returned by handlers.
///
/// # What it does
/// Couples an HTTP status code with a JSON error body.
///
/// # Why it exists
/// Provides a single error type that implements `IntoResponse` for Axum.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use mayfly_lifecycle::api::error::ApiError;
/// use mayfly_lifecycle::api::types::ErrorResponse;
///
/// let err = ApiError {
///     status: StatusCode::BAD_REQUEST,
///     body: ErrorResponse {
///         code: "validation_error".to_string(),
///         message: "name is required".to_string(),
///         request_id: None,
///     },
/// };
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build a 400 Bad Request validation error.
///
/// # What it does
/// Returns an `ApiError` with code `validation_error`.
///
/// # Errors
/// - Does not fail.
pub fn api_validation_error(message: &str) -> ApiError {
    // Client input failed validation or was malformed.
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            code: "validation_error".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 409 Conflict error.
///
/// # What it does
/// Returns an `ApiError` with a caller-provided conflict code.
///
/// # Errors
/// - Does not fail.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    // Caller provides a specific conflict code for precise client handling.
    ApiError {
        status: StatusCode::CONFLICT,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 500 Internal Server Error from an underlying failure.
///
/// # What it does
/// Logs the error and returns a generic internal error response.
///
/// # Errors
/// - Does not fail.
pub fn api_internal(message: &str, err: &dyn std::error::Error) -> ApiError {
    // Log internal details server-side for debugging; return generic message.
    tracing::error!(error = %err, "lifecycle internal error");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            code: "internal".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 502 Bad Gateway error for failures talking to the cluster gateway.
///
/// # What it does
/// Logs the gateway failure and returns an `ApiError` with a caller-provided
/// code so clients can tell a refused submission from an unreachable gateway.
///
/// # Errors
/// - Does not fail.
pub fn api_bad_gateway(code: &str, message: &str, err: &dyn std::error::Error) -> ApiError {
    tracing::error!(error = %err, "cluster gateway failure");
    ApiError {
        status: StatusCode::BAD_GATEWAY,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 504 Gateway Timeout error for unconfirmed deletions.
///
/// # What it does
/// Returns an `ApiError` with code `confirm_timeout`. Used when the
/// confirmation window closed while the record still resolved; the control
/// plane may still complete the deletion afterwards.
///
/// # Errors
/// - Does not fail.
pub fn api_gateway_timeout(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::GATEWAY_TIMEOUT,
        body: ErrorResponse {
            code: "confirm_timeout".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");

        let conflict = api_conflict("already_exists", "conflict");
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.body.code, "already_exists");

        let timeout = api_gateway_timeout("unconfirmed");
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.body.code, "confirm_timeout");
    }

    #[test]
    fn api_internal_logs_and_wraps_the_source() {
        let err = crate::gateway::GatewayError::Unexpected(anyhow::anyhow!("boom"));
        let api = api_internal("gateway failed", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.code, "internal");
        assert_eq!(api.body.message, "gateway failed");
    }

    #[test]
    fn api_bad_gateway_keeps_the_caller_code() {
        let err = crate::gateway::GatewayError::Transport("connection refused".to_string());
        let api = api_bad_gateway("gateway_unavailable", "gateway unreachable", &err);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.body.code, "gateway_unavailable");
    }
}
