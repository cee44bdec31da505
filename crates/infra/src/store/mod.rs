//! Storage boundary for users and posts.
//!
//! Post access is always owner-scoped: every read and write takes the owning
//! user's id, and there is no way to fetch a post without it.

use async_trait::async_trait;
use thiserror::Error;

use scribe_auth::User;
use scribe_core::{PostId, UserId};
use scribe_posts::Post;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryPostStore, InMemoryUserStore, OwnerScopedTable};
pub use postgres::{PgPostStore, PgUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was hit (e.g. username already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend failed (connection, lock poisoning, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Registered accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `Conflict` when username or email is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Posts, partitioned by owner.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts of `owner`, oldest first.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Post>, StoreError>;

    async fn get_for_owner(&self, owner: UserId, id: PostId) -> Result<Option<Post>, StoreError>;

    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    /// Overwrite the stored post with the same id and owner. `false` when no such post exists.
    async fn update(&self, post: &Post) -> Result<bool, StoreError>;

    /// `false` when `owner` has no post with this id.
    async fn delete_for_owner(&self, owner: UserId, id: PostId) -> Result<bool, StoreError>;
}
