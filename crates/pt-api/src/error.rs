//! API error handling
//!
//! Every tracker failure becomes a JSON error body with a stable identifier.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pt_core::error::{TrackerError, ValidationErrors};
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str, id: String },
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NotFound",
            ApiError::Validation(_) => "PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "Unauthenticated",
            ApiError::Forbidden(_) => "MissingPermission",
            ApiError::BadRequest(_) => "InvalidRequestBody",
            ApiError::Conflict(_) => "InvalidState",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            TrackerError::Forbidden { message } => ApiError::Forbidden(message),
            TrackerError::NotFound { entity, id } => ApiError::NotFound { resource: entity, id },
            TrackerError::InvalidState { message } => ApiError::Conflict(message),
            TrackerError::Validation(errors) => ApiError::Validation(errors),
            TrackerError::Database(_)
            | TrackerError::Storage(_)
            | TrackerError::Internal(_)
            | TrackerError::Config(_) => {
                tracing::error!(error = %err, "request failed");
                ApiError::Internal("Internal server error".into())
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_identifier: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_identifier = format!("urn:project-tracker:errors:{}", self.identifier());
        let body = match self {
            ApiError::NotFound { resource, id } => ErrorBody {
                error_identifier,
                message: format!("{} with id {} not found", resource, id),
                errors: None,
            },
            ApiError::Validation(errors) => ErrorBody {
                error_identifier,
                message: errors.full_messages().join(", "),
                errors: Some(errors.errors),
            },
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::BadRequest(message)
            | ApiError::Conflict(message)
            | ApiError::Internal(message) => ErrorBody {
                error_identifier,
                message,
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
