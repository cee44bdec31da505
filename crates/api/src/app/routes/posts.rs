use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use scribe_core::PostId;
use scribe_posts::{NewPost, PostChanges};

use crate::app::routes::route_both;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// `/api/posts` collection and item routes, each also reachable with a trailing slash.
pub fn router() -> Router {
    let router = route_both(Router::new(), "/api/posts", get(list_posts).post(create_post));
    route_both(
        router,
        "/api/posts/:id",
        get(get_post).put(update_post).patch(partial_update_post).delete(delete_post),
    )
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.posts_list(principal.user_id()).await {
        Ok(items) => (StatusCode::OK, Json(dto::PostList { items })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewPost>,
) -> axum::response::Response {
    match services.posts_create(principal.user_id(), body).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_post_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.posts_get(principal.user_id(), id).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<NewPost>,
) -> axum::response::Response {
    let id = match parse_post_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.posts_replace(principal.user_id(), id, body).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn partial_update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<PostChanges>,
) -> axum::response::Response {
    let id = match parse_post_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.posts_patch(principal.user_id(), id, body).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_post_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.posts_delete(principal.user_id(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_post_id(raw: &str) -> Result<PostId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id"))
}
