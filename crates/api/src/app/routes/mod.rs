use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

pub mod posts;
pub mod system;
pub mod token;
pub mod users;

/// Register `handler` under `path` and under `path` with a trailing slash.
pub(crate) fn route_both(router: Router, path: &str, handler: MethodRouter) -> Router {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    let router = route_both(Router::new(), "/api/users/register", post(users::register));
    route_both(router, "/api/token", post(token::obtain_token))
}

/// Router for all authenticated endpoints.
pub fn protected_router() -> Router {
    let router = route_both(Router::new(), "/api/users/profile", get(users::profile))
        .route("/whoami", get(system::whoami));
    router.merge(posts::router())
}
