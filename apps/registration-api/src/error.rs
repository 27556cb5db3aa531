use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use account_lib::errors_service::RegistrationError;
use account_lib::validation::FieldErrors;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 whose body is the raw field -> messages map.
    Validation(FieldErrors),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_uuid() -> Self {
        ApiError::BadRequest("invalid uuid".to_string())
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("user not found".to_string())
    }
}

fn envelope(status: StatusCode, error: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        message: Some(message),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::BadRequest(msg) => envelope(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => envelope(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => {
                envelope(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(errors) => ApiError::Validation(errors),
            RegistrationError::NotFound => ApiError::NotFound("resource not found".to_string()),
            RegistrationError::InvalidUuid(msg) => {
                ApiError::BadRequest(format!("invalid uuid: {}", msg))
            }
            RegistrationError::Internal(err) => ApiError::Internal(err.to_string()),
            _ => ApiError::Internal("unexpected error".to_string()),
        }
    }
}

/// Check if environment is production-like (prod, prod01, prod02, etc.)
pub fn is_prod_like(env: &str) -> bool {
    env.to_lowercase().starts_with("prod")
}

/// Converts a service error to an ApiError, logging internal errors.
/// In production, internal error details are hidden.
pub fn handle_service_error(err: RegistrationError, env: &str, operation: &str) -> ApiError {
    match &err {
        RegistrationError::Internal(_) | RegistrationError::InvalidUuid(_) => {
            tracing::error!(env = %env, error = ?err, operation = %operation, "service error");
            if is_prod_like(env) {
                ApiError::Internal("internal server error".to_string())
            } else {
                ApiError::from(err)
            }
        }
        _ => ApiError::from(err),
    }
}
