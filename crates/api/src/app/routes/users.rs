use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use scribe_auth::RegisterUser;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Create an account. Open to anonymous callers.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUser>,
) -> axum::response::Response {
    match services.register(body).await {
        Ok(user) => (StatusCode::CREATED, Json(user.profile())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The caller's own profile, read fresh from the store.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.profile(principal.user_id()).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
