use serde::{Deserialize, Serialize};

use scribe_auth::IssuedToken;
use scribe_posts::Post;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access: token.access,
            token_type: "Bearer",
            expires_in: token.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub items: Vec<Post>,
}
