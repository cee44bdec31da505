//! In-memory stores for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use scribe_auth::User;
use scribe_core::{Entity, PostId, UserId};
use scribe_posts::Post;

use super::{PostStore, StoreError, UserStore};

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory lock poisoned".to_string())
}

/// Owner-isolated key/value table.
///
/// Records are keyed by `(owner, id)`, so a lookup under the wrong owner
/// simply misses.
#[derive(Debug)]
pub struct OwnerScopedTable<V: Entity> {
    inner: RwLock<HashMap<(UserId, V::Id), V>>,
}

impl<V: Entity> OwnerScopedTable<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Entity> Default for OwnerScopedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OwnerScopedTable<V>
where
    V: Entity + Clone,
{
    pub fn get(&self, owner: UserId, id: V::Id) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(owner, id)).cloned())
    }

    /// Insert or overwrite.
    pub fn upsert(&self, owner: UserId, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert((owner, value.id()), value);
        Ok(())
    }

    /// Overwrite only if `(owner, id)` already exists.
    pub fn replace(&self, owner: UserId, value: V) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&(owner, value.id())) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn list(&self, owner: UserId) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter_map(|((o, _id), v)| if *o == owner { Some(v.clone()) } else { None })
            .collect())
    }

    pub fn remove(&self, owner: UserId, id: V::Id) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&(owner, id)).is_some())
    }
}

/// Posts held in an [`OwnerScopedTable`].
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    table: OwnerScopedTable<Post>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.table.list(owner)?;
        posts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(posts)
    }

    async fn get_for_owner(&self, owner: UserId, id: PostId) -> Result<Option<Post>, StoreError> {
        self.table.get(owner, id)
    }

    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        if self.table.get(post.owner, post.id)?.is_some() {
            return Err(StoreError::Conflict(format!("post {} already exists", post.id)));
        }
        self.table.upsert(post.owner, post.clone())
    }

    async fn update(&self, post: &Post) -> Result<bool, StoreError> {
        self.table.replace(post.owner, post.clone())
    }

    async fn delete_for_owner(&self, owner: UserId, id: PostId) -> Result<bool, StoreError> {
        self.table.remove(owner, id)
    }
}

/// Accounts keyed by id; username and email uniqueness enforced on insert.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        for existing in map.values() {
            if existing.username == user.username {
                return Err(StoreError::Conflict("username already exists".to_string()));
            }
            if existing.email == user.email {
                return Err(StoreError::Conflict("email already exists".to_string()));
            }
        }
        if map.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }

        map.insert(user.id, user.clone());
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|u| u.username.as_str() == username).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use scribe_auth::RegisterUser;
    use scribe_posts::NewPost;

    use super::*;

    fn user(username: &str, email: &str) -> User {
        let registration = RegisterUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "blue-kettle-42".to_string(),
            password2: "blue-kettle-42".to_string(),
            ..RegisterUser::default()
        }
        .validate()
        .unwrap();
        User::register(UserId::new(), registration, "$argon2id$stub".to_string(), Utc::now())
    }

    fn post(owner: UserId, title: &str, minute: i64) -> Post {
        let at = Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap() + Duration::minutes(minute);
        Post::create(
            PostId::new(),
            owner,
            NewPost {
                title: title.to_string(),
                content: "body".to_string(),
            },
            at,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn posts_are_isolated_by_owner() {
        let store = InMemoryPostStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let a1 = post(alice, "a1", 0);
        let b1 = post(bob, "b1", 1);
        store.insert(&a1).await.unwrap();
        store.insert(&b1).await.unwrap();

        let listed = store.list_for_owner(alice).await.unwrap();
        assert_eq!(listed, vec![a1.clone()]);

        assert_eq!(store.get_for_owner(bob, a1.id).await.unwrap(), None);
        assert!(!store.delete_for_owner(bob, a1.id).await.unwrap());
        assert_eq!(store.get_for_owner(alice, a1.id).await.unwrap(), Some(a1));
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let store = InMemoryPostStore::new();
        let owner = UserId::new();
        let later = post(owner, "later", 10);
        let earlier = post(owner, "earlier", 1);
        store.insert(&later).await.unwrap();
        store.insert(&earlier).await.unwrap();

        let titles: Vec<_> = store
            .list_for_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["earlier", "later"]);
    }

    #[tokio::test]
    async fn update_requires_existing_post_under_same_owner() {
        let store = InMemoryPostStore::new();
        let owner = UserId::new();
        let mut p = post(owner, "draft", 0);

        assert!(!store.update(&p).await.unwrap());
        store.insert(&p).await.unwrap();

        p.title = "final".to_string();
        assert!(store.update(&p).await.unwrap());
        assert_eq!(store.get_for_owner(owner, p.id).await.unwrap().unwrap().title, "final");

        let mut hijacked = p.clone();
        hijacked.owner = UserId::new();
        assert!(!store.update(&hijacked).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let store = InMemoryUserStore::new();
        store.insert(&user("alice", "alice@example.com")).await.unwrap();

        let err = store.insert(&user("alice", "other@example.com")).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("username already exists".to_string()));

        let err = store.insert(&user("alice2", "ALICE@example.com")).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("email already exists".to_string()));

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_by_id_and_username() {
        let store = InMemoryUserStore::new();
        let alice = user("alice", "alice@example.com");
        store.insert(&alice).await.unwrap();

        assert_eq!(store.get(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_by_username("alice").await.unwrap(), Some(alice));
        assert_eq!(store.find_by_username("Alice").await.unwrap(), None);
        assert_eq!(store.get(UserId::new()).await.unwrap(), None);
    }
}
