use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

/// Error taxonomy for the request boundary. Everything a handler can fail
/// with collapses into one of these and is translated to a response; nothing
/// here aborts the process.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Malformed or out-of-range field (400), surfaced with the field name
    Validation { field: String, message: String },
    /// Principal lacks scope or role for the entity/action (403)
    Authorization { action: String, resource: String },
    /// Entity id does not exist at all (404)
    NotFound { resource: String, id: String },
    /// No usable principal on the request (401)
    Unauthenticated,
    /// Unique-constraint violation (409)
    Duplicate { resource: String },
    /// Store or other unexpected failure (500)
    Internal { message: String },
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn forbidden(action: &str, resource: &str) -> Self {
        Self::Authorization {
            action: action.to_string(),
            resource: resource.to_string(),
        }
    }

    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            ApiError::Authorization { action, resource } => {
                write!(f, "Not authorized to {action} {resource}")
            }
            ApiError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            ApiError::Unauthenticated => write!(f, "Authentication required"),
            ApiError::Duplicate { resource } => {
                write!(f, "A {resource} with these unique fields already exists")
            }
            ApiError::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => ApiError::NotFound {
                resource: "record".to_string(),
                id: message,
            },
            other => {
                let message = other.to_string();
                if message.contains("UNIQUE constraint") || message.contains("duplicate key") {
                    ApiError::Duplicate {
                        resource: "record".to_string(),
                    }
                } else {
                    ApiError::Internal { message }
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Authorization { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE_RESOURCE"),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if let ApiError::Internal { message } = &self {
            tracing::error!("internal error: {message}");
        }

        let body = match &self {
            ApiError::Validation { field, .. } => Json(json!({
                "error": {
                    "code": code,
                    "message": self.to_string(),
                    "field": field,
                }
            })),
            ApiError::Internal { .. } => Json(json!({
                // Store failure details stay in the logs
                "error": { "code": code, "message": "Internal server error" }
            })),
            _ => Json(json!({
                "error": { "code": code, "message": self.to_string() }
            })),
        };

        (status, body).into_response()
    }
}

/// Result type alias for request handlers and scoped store operations
pub type ApiResult<T> = Result<T, ApiError>;
