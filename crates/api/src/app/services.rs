//! Application services: store wiring plus the operations the routes call.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use scribe_auth::{
    Argon2Hasher, Hs256TokenIssuer, IssuedToken, PasswordError, PasswordHasher, RegisterUser, TokenError,
    TokenIssuer, User,
};
use scribe_core::{DomainError, PostId, UserId};
use scribe_infra::{
    AppConfig, db,
    store::{InMemoryPostStore, InMemoryUserStore, PgPostStore, PgUserStore, PostStore, StoreError, UserStore},
};
use scribe_posts::{NewPost, Post, PostChanges};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("background task failed: {0}")]
    Task(String),
}

#[derive(Clone)]
pub struct AppServices {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

/// Pick the store backend from configuration: Postgres when `database_url` is
/// set, in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let tokens: Arc<dyn TokenIssuer> = Arc::new(Hs256TokenIssuer::new(&config.jwt_secret, config.token_ttl));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await?;
            db::migrate(&pool).await?;
            tracing::info!("using postgres stores");
            Ok(AppServices::new(
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgPostStore::new(pool)),
                hasher,
                tokens,
            ))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory stores");
            Ok(AppServices::new(
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryPostStore::new()),
                hasher,
                tokens,
            ))
        }
    }
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            posts,
            hasher,
            tokens,
        }
    }

    /// Account lookup used by the auth gate.
    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }

    // -------------------------
    // Accounts
    // -------------------------

    /// Validate, hash and persist a new account.
    pub async fn register(&self, form: RegisterUser) -> Result<User, ServiceError> {
        let registration = form.validate()?;

        let hasher = Arc::clone(&self.hasher);
        let password = registration.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))??;

        let user = User::register(UserId::new(), registration, password_hash, now());
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and mint an access token.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))??;
        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(self.tokens.issue(user.id, user.username.as_str(), now())?)
    }

    /// The session user's stored account. A token outliving its user is unauthorized.
    pub async fn profile(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.users
            .get(user_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::Unauthorized))
    }

    // -------------------------
    // Posts (always owner-scoped)
    // -------------------------

    pub async fn posts_list(&self, owner: UserId) -> Result<Vec<Post>, ServiceError> {
        Ok(self.posts.list_for_owner(owner).await?)
    }

    pub async fn posts_get(&self, owner: UserId, id: PostId) -> Result<Post, ServiceError> {
        self.posts
            .get_for_owner(owner, id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::not_found()))
    }

    pub async fn posts_create(&self, owner: UserId, input: NewPost) -> Result<Post, ServiceError> {
        let post = Post::create(PostId::new(), owner, input, now())?;
        self.posts.insert(&post).await?;
        tracing::info!(post_id = %post.id, owner_id = %owner, "post created");
        Ok(post)
    }

    pub async fn posts_replace(&self, owner: UserId, id: PostId, input: NewPost) -> Result<Post, ServiceError> {
        let mut post = self.posts_get(owner, id).await?;
        post.replace(input, now())?;
        self.save(&post).await?;
        Ok(post)
    }

    pub async fn posts_patch(&self, owner: UserId, id: PostId, changes: PostChanges) -> Result<Post, ServiceError> {
        let mut post = self.posts_get(owner, id).await?;
        if changes.is_empty() {
            return Ok(post);
        }
        post.apply_changes(changes, now())?;
        self.save(&post).await?;
        Ok(post)
    }

    pub async fn posts_delete(&self, owner: UserId, id: PostId) -> Result<(), ServiceError> {
        if !self.posts.delete_for_owner(owner, id).await? {
            return Err(DomainError::not_found().into());
        }
        tracing::info!(post_id = %id, owner_id = %owner, "post deleted");
        Ok(())
    }

    async fn save(&self, post: &Post) -> Result<(), ServiceError> {
        // Deleted between load and write.
        if !self.posts.update(post).await? {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }
}

/// Wall clock at the precision Postgres `TIMESTAMPTZ` keeps (microseconds).
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> AppServices {
        AppServices::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryPostStore::new()),
            Arc::new(Argon2Hasher::new()),
            Arc::new(Hs256TokenIssuer::new("test-secret", chrono::Duration::minutes(5))),
        )
    }

    fn form(username: &str) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "blue-kettle-42".to_string(),
            password2: "blue-kettle-42".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn registration_creates_exactly_one_user() {
        let svc = services();
        assert_eq!(svc.users.count().await.unwrap(), 0);

        let user = svc.register(form("ada")).await.unwrap();
        assert_eq!(svc.users.count().await.unwrap(), 1);
        assert_ne!(user.password_hash, "blue-kettle-42");

        let err = svc.register(form("ada")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Conflict(_))), "{err:?}");
        assert_eq!(svc.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_registration_stores_nothing() {
        let svc = services();
        let err = svc
            .register(RegisterUser {
                password2: "something-else".to_string(),
                ..form("ada")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(svc.users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn token_requires_matching_password() {
        let svc = services();
        svc.register(form("ada")).await.unwrap();

        assert!(svc.obtain_token("ada", "blue-kettle-42").await.is_ok());
        assert!(matches!(
            svc.obtain_token("ada", "wrong-password").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.obtain_token("nobody", "blue-kettle-42").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_unauthorized() {
        let svc = services();
        assert!(matches!(
            svc.profile(UserId::new()).await,
            Err(ServiceError::Domain(DomainError::Unauthorized))
        ));
    }

    #[tokio::test]
    async fn posts_are_scoped_to_their_owner() {
        let svc = services();
        let alice = UserId::new();
        let bob = UserId::new();

        let post = svc.posts_create(alice, new_post("alice's")).await.unwrap();
        svc.posts_create(bob, new_post("bob's")).await.unwrap();

        let listed = svc.posts_list(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|p| p.is_owned_by(alice)));

        for result in [
            svc.posts_get(bob, post.id).await.map(|_| ()),
            svc.posts_replace(bob, post.id, new_post("mine now")).await.map(|_| ()),
            svc.posts_patch(
                bob,
                post.id,
                PostChanges {
                    title: Some("mine now".to_string()),
                    content: None,
                },
            )
            .await
            .map(|_| ()),
            svc.posts_delete(bob, post.id).await,
        ] {
            assert!(matches!(result, Err(ServiceError::Domain(DomainError::NotFound))));
        }

        assert_eq!(svc.posts_get(alice, post.id).await.unwrap().title, "alice's");
    }

    #[tokio::test]
    async fn patch_and_delete_round_out_the_lifecycle() {
        let svc = services();
        let owner = UserId::new();
        let post = svc.posts_create(owner, new_post("draft")).await.unwrap();

        let patched = svc
            .posts_patch(
                owner,
                post.id,
                PostChanges {
                    title: Some("final".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.title, "final");
        assert_eq!(svc.posts_get(owner, post.id).await.unwrap(), patched);

        svc.posts_delete(owner, post.id).await.unwrap();
        assert!(svc.posts_list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_patch_keeps_updated_at() {
        let svc = services();
        let owner = UserId::new();
        let post = svc.posts_create(owner, new_post("draft")).await.unwrap();

        let patched = svc.posts_patch(owner, post.id, PostChanges::default()).await.unwrap();
        assert_eq!(patched, post);
        assert_eq!(svc.posts_get(owner, post.id).await.unwrap().updated_at, post.updated_at);
    }

    #[tokio::test]
    async fn timestamps_are_stored_at_microsecond_precision() {
        let svc = services();
        let owner = UserId::new();
        let post = svc.posts_create(owner, new_post("precise")).await.unwrap();
        let replaced = svc.posts_replace(owner, post.id, new_post("still precise")).await.unwrap();
        let user = svc.register(form("ada")).await.unwrap();

        for ts in [post.created_at, post.updated_at, replaced.updated_at, user.date_joined] {
            assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0, "{ts:?}");
        }
    }
}
