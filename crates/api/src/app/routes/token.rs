use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::{AppServices, ServiceError};
use crate::app::{dto, errors};

/// Exchange username + password for a bearer token.
pub async fn obtain_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TokenRequest>,
) -> axum::response::Response {
    match services.obtain_token(&body.username, &body.password).await {
        Ok(token) => (StatusCode::OK, Json(dto::TokenResponse::from(token))).into_response(),
        Err(e) => {
            if matches!(e, ServiceError::InvalidCredentials) {
                tracing::info!(username = %body.username, "token request with bad credentials");
            }
            errors::service_error_to_response(e)
        }
    }
}
