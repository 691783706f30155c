//! Error envelope for the JSON API.
//!
//! Every failed request returns
//! `{ "error": "<KIND>", "message": "<human>", "details": { ... },
//! "request_id": "<id>" }` with a status code matching the error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use searoute_lib::Error as LibError;

/// Wire shape of a failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Stable machine-readable error kind.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
    pub request_id: String,

    #[serde(skip)]
    status: u16,
}

impl ErrorEnvelope {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: kind.into(),
            message: message.into(),
            details: Value::Null,
            request_id: request_id.into(),
            status: status.as_u16(),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn validation(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message, StatusCode::BAD_REQUEST, request_id)
    }

    pub fn port_not_found(
        code: &str,
        suggestions: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let message = if suggestions.is_empty() {
            format!("port {code} not found")
        } else {
            format!("port {code} not found; did you mean {}?", suggestions.join(", "))
        };
        Self::new("PORT_NOT_FOUND", message, StatusCode::NOT_FOUND, request_id).with_details(json!({
            "code": code,
            "suggestions": suggestions,
        }))
    }

    pub fn deadline_exceeded(request_id: impl Into<String>) -> Self {
        Self::new(
            "DEADLINE_EXCEEDED",
            "route calculation exceeded its deadline",
            StatusCode::REQUEST_TIMEOUT,
            request_id,
        )
    }

    pub fn overloaded(request_id: impl Into<String>) -> Self {
        Self::new(
            "OVERLOADED",
            "route planner is at capacity; retry with backoff",
            StatusCode::TOO_MANY_REQUESTS,
            request_id,
        )
    }

    pub fn backend_unavailable(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            "BACKEND_UNAVAILABLE",
            message,
            StatusCode::SERVICE_UNAVAILABLE,
            request_id,
        )
    }

    pub fn internal(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            "INTERNAL_ERROR",
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
            request_id,
        )
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}

/// Map a library error onto the wire envelope.
///
/// A no-route outcome never reaches this function: the coordinator returns
/// it as a successful response with diagnostics.
pub fn envelope_for_error(error: &LibError, request_id: &str) -> ErrorEnvelope {
    match error {
        LibError::Validation { message } => ErrorEnvelope::validation(message, request_id),
        LibError::PortNotFound { code, suggestions } => {
            ErrorEnvelope::port_not_found(code, suggestions, request_id)
        }
        LibError::DeadlineExceeded | LibError::Cancelled => {
            ErrorEnvelope::deadline_exceeded(request_id)
        }
        LibError::Overloaded => ErrorEnvelope::overloaded(request_id),
        LibError::BackendUnavailable { backend, message } => ErrorEnvelope::backend_unavailable(
            format!("{backend} unavailable: {message}"),
            request_id,
        ),
        other => ErrorEnvelope::internal(other.to_string(), request_id),
    }
}
