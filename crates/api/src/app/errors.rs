use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use scribe_core::{DomainError, FieldErrors};
use scribe_infra::store::StoreError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(StoreError::Conflict(msg)) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
        ServiceError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "No active account found with the given credentials.",
        ),
        ServiceError::Password(e) => {
            tracing::error!(error = %e, "password hashing failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        ServiceError::Token(e) => {
            tracing::error!(error = %e, "token issuance failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        ServiceError::Task(msg) => {
            tracing::error!(error = %msg, "background task failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(fields) => validation_error(fields),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Not found."),
        DomainError::Unauthorized => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication credentials were not valid.",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 with the standard body plus a `fields` map of per-field messages.
pub fn validation_error(fields: FieldErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": fields.to_string(),
            "fields": fields,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (ServiceError::Domain(DomainError::not_found()), StatusCode::NOT_FOUND),
            (ServiceError::Domain(DomainError::invalid_id("PostId: bad")), StatusCode::BAD_REQUEST),
            (ServiceError::Domain(DomainError::validation("title", "blank")), StatusCode::BAD_REQUEST),
            (ServiceError::Domain(DomainError::Unauthorized), StatusCode::UNAUTHORIZED),
            (ServiceError::Store(StoreError::Conflict("username already exists".into())), StatusCode::CONFLICT),
            (ServiceError::Store(StoreError::Backend("down".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
