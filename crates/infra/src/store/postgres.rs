//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | Row decode failure | N/A | `Corrupt` |
//! | Other (pool closed, network, ...) | N/A | `Backend` |
//!
//! Every posts query carries `owner_id` in its WHERE clause, so a post owned by
//! someone else is never loaded, updated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Span, instrument};
use uuid::Uuid;

use scribe_auth::{Email, User, Username};
use scribe_core::{PostId, UserId};
use scribe_posts::Post;

use super::{PostStore, StoreError, UserStore};

/// Postgres user store.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;
        let total: i64 = row.try_get("total").map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(total.max(0) as u64)
    }
}

/// Postgres post store.
#[derive(Debug, Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    #[instrument(skip(self), fields(owner_id = %owner, post_count = tracing::field::Empty), err)]
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, content, created_at, updated_at
            FROM posts
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;

        Span::current().record("post_count", rows.len());
        rows.iter().map(post_from_row).collect()
    }

    #[instrument(skip(self), fields(owner_id = %owner, post_id = %id), err)]
    async fn get_for_owner(&self, owner: UserId, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, content, created_at, updated_at
            FROM posts
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(owner.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_post", e))?;

        row.as_ref().map(post_from_row).transpose()
    }

    #[instrument(skip(self, post), fields(owner_id = %post.owner, post_id = %post.id), err)]
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, owner_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.owner.as_uuid())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_post", e))?;
        Ok(())
    }

    #[instrument(skip(self, post), fields(owner_id = %post.owner, post_id = %post.id), err)]
    async fn update(&self, post: &Post) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $3, content = $4, updated_at = $5
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(post.owner.as_uuid())
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(owner_id = %owner, post_id = %id), err)]
    async fn delete_for_owner(&self, owner: UserId, id: PostId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE owner_id = $1 AND id = $2")
            .bind(owner.as_uuid())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;
        Ok(result.rows_affected() == 1)
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let corrupt = |e: sqlx::Error| StoreError::Corrupt(format!("users row: {e}"));

    let id: Uuid = row.try_get("id").map_err(corrupt)?;
    let username: String = row.try_get("username").map_err(corrupt)?;
    let email: String = row.try_get("email").map_err(corrupt)?;
    let date_joined: DateTime<Utc> = row.try_get("date_joined").map_err(corrupt)?;

    Ok(User {
        id: UserId::from_uuid(id),
        username: Username::parse(&username).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        email: Email::parse(&email).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        first_name: row.try_get("first_name").map_err(corrupt)?,
        last_name: row.try_get("last_name").map_err(corrupt)?,
        password_hash: row.try_get("password_hash").map_err(corrupt)?,
        date_joined,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, StoreError> {
    let corrupt = |e: sqlx::Error| StoreError::Corrupt(format!("posts row: {e}"));

    let id: Uuid = row.try_get("id").map_err(corrupt)?;
    let owner: Uuid = row.try_get("owner_id").map_err(corrupt)?;

    Ok(Post {
        id: PostId::from_uuid(id),
        owner: UserId::from_uuid(owner),
        title: row.try_get("title").map_err(corrupt)?,
        content: row.try_get("content").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
        updated_at: row.try_get("updated_at").map_err(corrupt)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let what = match db_err.constraint() {
                    Some("users_username_key") => "username already exists".to_string(),
                    Some("users_email_key") => "email already exists".to_string(),
                    Some(other) => format!("duplicate value violates {other}"),
                    None => "duplicate value".to_string(),
                };
                StoreError::Conflict(what)
            } else {
                StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}
