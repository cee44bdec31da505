use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use scribe_auth::JwtValidator;
use scribe_infra::store::UserStore;

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub users: Arc<dyn UserStore>,
}

/// Resolve the bearer token into a [`PrincipalContext`] or reject with 401.
///
/// A well-signed token is not enough: its subject must still be a stored account.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication credentials were not provided.",
        )
    })?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Given token not valid.")
    })?;

    let user = match state.users.get(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!(user_id = %claims.sub, "bearer token for unknown user");
            return Err(errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "User not found."));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during authentication");
            return Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "storage failure",
            ));
        }
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(user.id, user.username.as_str()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers("Bearer    ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
