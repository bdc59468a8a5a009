use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use storefront_auth::{Denial, PasswordError};
use storefront_core::DomainError;
use storefront_infra::store::StoreError;

/// Fixed rendering of an API denial. Bodies never say which roles would have
/// been accepted or whether the target exists.
pub fn denial_to_response(denial: Denial) -> Response {
    if denial.is_unauthenticated() {
        message(StatusCode::UNAUTHORIZED, "unauthenticated")
    } else {
        message(StatusCode::FORBIDDEN, "unauthorized")
    }
}

/// Generic sign-in failure, identical for every cause.
pub fn sign_in_failed() -> Response {
    message(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub fn message(status: StatusCode, message: &'static str) -> Response {
    (status, axum::Json(json!({ "message": message }))).into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => not_found(),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// Store failures: conflicts and misses are reported, anything else is logged
/// and hidden behind a 500.
pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => not_found(),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => {
            tracing::error!(error = %other, "store operation failed");
            internal_error()
        }
    }
}

pub fn password_error_to_response(err: PasswordError) -> Response {
    match err {
        PasswordError::TooShort => json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", err.to_string()),
        PasswordError::Hashing(msg) => {
            tracing::error!(error = %msg, "password hashing failed");
            internal_error()
        }
    }
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

pub fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}

pub fn internal_error() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}
