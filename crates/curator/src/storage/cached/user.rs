//! Cached user repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use curator_core::cache::{user_key, USERS_LIST_KEY};
use curator_core::pagination::{Page, PageRequest};
use curator_core::records::User;
use curator_core::storage::{Result, UserRepository};

use super::{may_have_written, remember_decoded};
use crate::cache::CacheAside;

/// Cached user repository decorator.
///
/// Caches the full user list under `users` and each user under `user:{id}`.
/// Every write drops both keys.
pub struct CachedUserRepository<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    cache: Arc<CacheAside>,
    ttl: Duration,
}

impl<R> CachedUserRepository<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>, cache: Arc<CacheAside>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    async fn invalidate(&self, id: Uuid) {
        self.cache.remove(USERS_LIST_KEY).await;
        self.cache.remove(&user_key(id)).await;
    }
}

#[async_trait]
impl<R> UserRepository for CachedUserRepository<R>
where
    R: UserRepository + 'static,
{
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, &user_key(id), self.ttl, || repository.get_user(id)).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.get_user_by_email(email).await
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.repository.get_user_by_phone(phone).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.repository.get_user_by_username(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, USERS_LIST_KEY, self.ttl, || repository.list_users()).await
    }

    async fn list_users_paginated(&self, request: &PageRequest) -> Result<Page<User>> {
        self.repository.list_users_paginated(request).await
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let result = self.repository.create_user(user).await;
        if may_have_written(&result) {
            self.invalidate(user.id).await;
        }
        result?;
        tracing::debug!(user_id = %user.id, "User created, cache invalidated");
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = self.repository.update_user(user).await;
        if may_have_written(&result) {
            self.invalidate(user.id).await;
        }
        result?;
        tracing::debug!(user_id = %user.id, "User updated, cache invalidated");
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let result = self.repository.delete_user(id).await;
        if may_have_written(&result) {
            self.invalidate(id).await;
        }
        result?;
        tracing::debug!(user_id = %id, "User deleted, cache invalidated");
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.repository.email_exists(email).await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        self.repository.phone_exists(phone).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use tokio::sync::RwLock;

    use curator_core::pagination::window;
    use curator_core::storage::RepositoryError;

    use crate::cache::MemoryCache;

    // Mock repository that counts reads
    struct MockUserRepository {
        users: RwLock<Vec<User>>,
        list_calls: AtomicUsize,
        get_calls: AtomicUsize,
        // Writes land but report the storage as unavailable
        lose_acks: AtomicBool,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                users: RwLock::new(Vec::new()),
                list_calls: AtomicUsize::new(0),
                get_calls: AtomicUsize::new(0),
                lose_acks: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
        }

        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
        }

        async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .find(|u| u.phone.as_deref() == Some(phone))
                .cloned())
        }

        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn list_users(&self) -> Result<Vec<User>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.read().await.clone())
        }

        async fn list_users_paginated(&self, request: &PageRequest) -> Result<Page<User>> {
            Ok(window(self.users.read().await.clone(), request))
        }

        async fn create_user(&self, user: &User) -> Result<()> {
            self.users.write().await.push(user.clone());
            if self.lose_acks.load(Ordering::SeqCst) {
                return Err(RepositoryError::StorageUnavailable("timed out".to_string()));
            }
            Ok(())
        }

        async fn update_user(&self, user: &User) -> Result<()> {
            let mut users = self.users.write().await;
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(stored) => {
                    *stored = user.clone();
                    Ok(())
                }
                None => Err(RepositoryError::not_found("User", user.id)),
            }
        }

        async fn delete_user(&self, id: Uuid) -> Result<()> {
            self.users.write().await.retain(|u| u.id != id);
            Ok(())
        }

        async fn email_exists(&self, email: &str) -> Result<bool> {
            Ok(self.users.read().await.iter().any(|u| u.email == email))
        }

        async fn phone_exists(&self, phone: &str) -> Result<bool> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .any(|u| u.phone.as_deref() == Some(phone)))
        }
    }

    fn setup() -> (Arc<MockUserRepository>, CachedUserRepository<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::new());
        let cache = Arc::new(CacheAside::new(
            Arc::new(MemoryCache::new(100)),
            Duration::from_secs(1),
        ));
        let cached = CachedUserRepository::new(repo.clone(), cache, Duration::from_secs(600));
        (repo, cached)
    }

    #[tokio::test]
    async fn test_list_users_is_cached() {
        let (repo, cached) = setup();
        cached.create_user(&User::new("alice", "a@x.com")).await.unwrap();

        let first = cached.list_users().await.unwrap();
        let second = cached.list_users().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_user_invalidates_list() {
        let (repo, cached) = setup();
        cached.list_users().await.unwrap();

        cached.create_user(&User::new("alice", "a@x.com")).await.unwrap();
        let users = cached.list_users().await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_user_is_cached_until_update() {
        let (repo, cached) = setup();
        let mut user = User::new("alice", "a@x.com");
        cached.create_user(&user).await.unwrap();

        cached.get_user(user.id).await.unwrap();
        cached.get_user(user.id).await.unwrap();
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);

        user.email = "alice@x.com".to_string();
        cached.update_user(&user).await.unwrap();
        let fetched = cached.get_user(user.id).await.unwrap().unwrap();

        assert_eq!(fetched.email, "alice@x.com");
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delete_user_invalidates_item_and_list() {
        let (repo, cached) = setup();
        let user = User::new("alice", "a@x.com");
        cached.create_user(&user).await.unwrap();
        cached.get_user(user.id).await.unwrap();
        cached.list_users().await.unwrap();

        cached.delete_user(user.id).await.unwrap();

        assert_eq!(cached.get_user(user.id).await.unwrap(), None);
        assert!(cached.list_users().await.unwrap().is_empty());
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 2);
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let (repo, cached) = setup();
        cached.list_users().await.unwrap();

        let result = cached.update_user(&User::new("ghost", "g@x.com")).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        cached.list_users().await.unwrap();
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unacknowledged_write_invalidates_cache() {
        let (repo, cached) = setup();
        assert!(cached.list_users().await.unwrap().is_empty());
        repo.lose_acks.store(true, Ordering::SeqCst);

        let result = cached.create_user(&User::new("alice", "a@x.com")).await;

        assert!(matches!(result, Err(RepositoryError::StorageUnavailable(_))));
        assert_eq!(cached.list_users().await.unwrap().len(), 1);
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 2);
    }
}
