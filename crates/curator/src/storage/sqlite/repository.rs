//! SQLite repository implementation.
//!
//! Implements the repository traits from `curator_core::storage` using SQLite.
//! Users and settings live here; the two nested-set trees are in
//! [`super::hierarchical`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, Params, Row};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use curator_core::pagination::{like_pattern, Page, PageRequest};
use curator_core::records::{Setting, User};
use curator_core::storage::{RepositoryError, Result, SettingRepository, UserRepository};

use super::conversions::{format_datetime, format_optional_datetime, row_to_setting, row_to_user};
use super::error::{
    domain_err, map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id, wrap_err,
};
use super::schema;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based repository implementation.
///
/// Every call runs on the connection's background thread. Reads give up
/// waiting after `timeout`. Writes are never abandoned once queued: they
/// refuse to start past their deadline, and once started they run to commit
/// or rollback, with SQLite's busy handler bounding the lock wait.
pub struct SqliteRepository {
    conn: Connection,
    timeout: Duration,
}

impl SqliteRepository {
    /// Opens (or creates) a file-based database and applies the schema.
    pub async fn new(path: &str, timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::StorageUnavailable(e.to_string()))?;

        let repository = Self { conn, timeout };
        repository.init().await?;
        Ok(repository)
    }

    /// Creates a repository over an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::StorageUnavailable(e.to_string()))?;

        let repository = Self {
            conn,
            timeout: DEFAULT_TIMEOUT,
        };
        repository.init().await?;
        Ok(repository)
    }

    async fn init(&self) -> Result<()> {
        let busy_timeout = self.timeout;
        self.call(move |conn| {
            conn.busy_timeout(busy_timeout).map_err(wrap_err)?;
            conn.pragma_update(None, "foreign_keys", true)
                .map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Schema"))
    }

    /// Runs a mutating `function` on the connection thread.
    ///
    /// The deadline is checked on the connection thread itself, before any
    /// statement runs. The caller always awaits the real outcome, so a write
    /// that committed is never reported as failed.
    pub(super) async fn write<F, R>(&self, function: F) -> tokio_rusqlite::Result<R>
    where
        F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;

        self.conn
            .call(move |conn| {
                if Instant::now() >= deadline {
                    tracing::warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "SQLite write not started before its deadline"
                    );
                    return Err(domain_err(RepositoryError::StorageUnavailable(format!(
                        "database write not started within {}ms",
                        timeout.as_millis()
                    ))));
                }
                function(conn)
            })
            .await
    }

    /// Runs a read-only `function` on the connection thread, giving up after `timeout`.
    pub(super) async fn call<F, R>(&self, function: F) -> tokio_rusqlite::Result<R>
    where
        F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        match tokio::time::timeout(self.timeout, self.conn.call(function)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "SQLite call timed out");
                Err(domain_err(RepositoryError::StorageUnavailable(format!(
                    "database call timed out after {}ms",
                    self.timeout.as_millis()
                ))))
            }
        }
    }
}

// ============================================================================
// Statement helpers
// ============================================================================

pub(super) fn query_optional<T, P, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
    map: F,
) -> tokio_rusqlite::Result<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    conn.query_row(sql, params, map).optional().map_err(wrap_err)
}

pub(super) fn query_all<T, P, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
    map: F,
) -> tokio_rusqlite::Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
    let rows = stmt.query_map(params, map).map_err(wrap_err)?;

    let mut items = Vec::new();
    for row_result in rows {
        items.push(row_result.map_err(wrap_err)?);
    }
    Ok(items)
}

pub(super) fn count<P: Params>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
) -> tokio_rusqlite::Result<i64> {
    conn.query_row(sql, params, |row| row.get(0))
        .map_err(wrap_err)
}

/// Turns "no row was affected" into the NotFound of the caller's entity.
pub(super) fn expect_affected(rows: usize) -> tokio_rusqlite::Result<()> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();

        self.call(move |conn| query_optional(conn, schema::SELECT_USER_BY_ID, [&id_str], row_to_user))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_USER_BY_EMAIL, [&email], row_to_user)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let phone = phone.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_USER_BY_PHONE, [&phone], row_to_user)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_USER_BY_USERNAME, [&username], row_to_user)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.call(|conn| query_all(conn, schema::SELECT_USERS, [], row_to_user))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn list_users_paginated(&self, request: &PageRequest) -> Result<Page<User>> {
        let query = request.query().to_string();
        let like = like_pattern(&query);
        let limit = request.limit();
        let offset = request.offset();

        let (total, users) = self
            .call(move |conn| {
                let total = count(
                    conn,
                    schema::COUNT_USERS_MATCHING,
                    rusqlite::params![query, like],
                )?;
                let users = query_all(
                    conn,
                    schema::SELECT_USERS_MATCHING,
                    rusqlite::params![query, like, limit, offset],
                    row_to_user,
                )?;
                Ok((total, users))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))?;

        Ok(Page::new(request, total, users))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let username = user.username.clone();
        let email = user.email.clone();
        let phone = user.phone.clone();
        let created_at = format_datetime(&user.created_at);
        let updated_at = format_datetime(&user.updated_at);
        let deleted_at = format_optional_datetime(user.deleted_at.as_ref());
        let user_id = user.id.to_string();

        self.write(move |conn| {
            conn.execute(
                schema::INSERT_USER,
                rusqlite::params![id, username, email, phone, created_at, updated_at, deleted_at],
            )
            .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user_id))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let username = user.username.clone();
        let email = user.email.clone();
        let phone = user.phone.clone();
        let updated_at = format_datetime(&user.updated_at);
        let user_id = user.id.to_string();

        self.write(move |conn| {
            let rows = conn
                .execute(
                    schema::UPDATE_USER,
                    rusqlite::params![id, username, email, phone, updated_at],
                )
                .map_err(wrap_err)?;
            expect_affected(rows)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user_id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let deleted_at = format_datetime(&Utc::now());

        self.write(move |conn| {
            let tx = conn.transaction().map_err(wrap_err)?;
            let current: Option<Option<String>> = query_optional(
                &tx,
                schema::SELECT_USER_DELETED_AT,
                [&id_str],
                |row| row.get(0),
            )?;
            match current {
                None => return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows)),
                // Already deleted: nothing to do.
                Some(Some(_)) => {}
                Some(None) => {
                    tx.execute(schema::SOFT_DELETE_USER, [&id_str, &deleted_at])
                        .map_err(wrap_err)?;
                }
            }
            tx.commit().map_err(wrap_err)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_string()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let email = email.to_string();

        self.call(move |conn| {
            conn.query_row(schema::USER_EMAIL_EXISTS, [&email], |row| row.get(0))
                .map_err(wrap_err)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        let phone = phone.to_string();

        self.call(move |conn| {
            conn.query_row(schema::USER_PHONE_EXISTS, [&phone], |row| row.get(0))
                .map_err(wrap_err)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }
}

// ============================================================================
// SettingRepository implementation
// ============================================================================

#[async_trait]
impl SettingRepository for SqliteRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let key = key.to_string();

        self.call(move |conn| {
            query_optional(conn, schema::SELECT_SETTING_BY_KEY, [&key], row_to_setting)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Setting"))
    }

    async fn list_settings(&self) -> Result<Vec<Setting>> {
        self.call(|conn| query_all(conn, schema::SELECT_SETTINGS, [], row_to_setting))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Setting"))
    }

    async fn put_setting(&self, setting: &Setting) -> Result<Setting> {
        let id = setting.id.to_string();
        let key = setting.key.clone();
        let value = setting.value.clone();
        let model_type = setting.model_type.clone();
        let model_id = setting.model_id.map(|id| id.to_string());
        let created_at = format_datetime(&setting.created_at);
        let updated_at = format_datetime(&setting.updated_at);
        let setting_key = setting.key.clone();

        self.write(move |conn| {
            let tx = conn.transaction().map_err(wrap_err)?;
            tx.execute(
                schema::UPSERT_SETTING,
                rusqlite::params![id, key, value, model_type, model_id, created_at, updated_at],
            )
            .map_err(wrap_err)?;
            let stored = tx
                .query_row(schema::SELECT_SETTING_BY_KEY, [&key], row_to_setting)
                .map_err(wrap_err)?;
            tx.commit().map_err(wrap_err)?;
            Ok(stored)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Setting", setting_key))
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let key_str = key.to_string();

        self.write(move |conn| {
            let rows = conn
                .execute(schema::DELETE_SETTING, [&key_str])
                .map_err(wrap_err)?;
            expect_affected(rows)
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Setting", key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> SqliteRepository {
        SqliteRepository::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let repo = setup().await;
        let user = User::new("alice", "a@x.com").with_phone("123");

        repo.create_user(&user).await.unwrap();

        let by_id = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.phone.as_deref(), Some("123"));
        assert_eq!(by_id.created_at, user.created_at);

        let by_email = repo.get_user_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        let by_phone = repo.get_user_by_phone("123").await.unwrap();
        assert_eq!(by_phone.map(|u| u.id), Some(user.id));
        let by_username = repo.get_user_by_username("alice").await.unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_get_missing_user_is_none() {
        let repo = setup().await;

        assert_eq!(repo.get_user(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(repo.get_user_by_email("nobody@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = setup().await;
        repo.create_user(&User::new("alice", "a@x.com")).await.unwrap();

        let result = repo.create_user(&User::new("bob", "a@x.com")).await;

        assert_eq!(result, Err(RepositoryError::conflict("User", "email")));
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let repo = setup().await;
        repo.create_user(&User::new("alice", "a@x.com").with_phone("555"))
            .await
            .unwrap();

        let result = repo
            .create_user(&User::new("bob", "b@x.com").with_phone("555"))
            .await;

        assert_eq!(result, Err(RepositoryError::conflict("User", "phone")));
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = setup().await;
        let mut user = User::new("alice", "a@x.com");
        repo.create_user(&user).await.unwrap();

        user.email = "alice@x.com".to_string();
        user.updated_at = Utc::now();
        repo.update_user(&user).await.unwrap();

        let stored = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let repo = setup().await;
        let user = User::new("ghost", "g@x.com");

        let result = repo.update_user(&user).await;

        assert_eq!(result, Err(RepositoryError::not_found("User", user.id)));
    }

    #[tokio::test]
    async fn test_delete_user_is_soft_and_idempotent() {
        let repo = setup().await;
        let user = User::new("alice", "a@x.com").with_phone("123");
        repo.create_user(&user).await.unwrap();

        repo.delete_user(user.id).await.unwrap();
        repo.delete_user(user.id).await.unwrap();

        assert_eq!(repo.get_user(user.id).await.unwrap(), None);
        assert!(repo.list_users().await.unwrap().is_empty());
        // The natural keys stay taken.
        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(repo.phone_exists("123").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let repo = setup().await;
        let id = Uuid::new_v4();

        let result = repo.delete_user(id).await;

        assert_eq!(result, Err(RepositoryError::not_found("User", id)));
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let repo = setup().await;
        repo.create_user(&User::new("alice", "a@x.com")).await.unwrap();

        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(!repo.email_exists("b@x.com").await.unwrap());
        assert!(!repo.phone_exists("123").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_users_paginated() {
        let repo = setup().await;
        for i in 0..23 {
            repo.create_user(&User::new(format!("user{i:02}"), format!("u{i}@x.com")))
                .await
                .unwrap();
        }

        let page = repo
            .list_users_paginated(&PageRequest::for_page("", 3, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 23);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.data[0].username, "user20");
    }

    #[tokio::test]
    async fn test_list_users_paginated_search() {
        let repo = setup().await;
        repo.create_user(&User::new("alice", "alice@x.com")).await.unwrap();
        repo.create_user(&User::new("bob", "bob@y.com").with_phone("0600"))
            .await
            .unwrap();
        repo.create_user(&User::new("100%real", "r@z.com")).await.unwrap();

        let by_domain = repo
            .list_users_paginated(&PageRequest::new("Y.COM", 10, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(by_domain.total, 1);
        assert_eq!(by_domain.data[0].username, "bob");

        let by_phone = repo
            .list_users_paginated(&PageRequest::new("060", 10, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(by_phone.total, 1);

        // `%` is literal, not a wildcard.
        let literal = repo
            .list_users_paginated(&PageRequest::new("0%r", 10, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(literal.total, 1);
        assert_eq!(literal.data[0].username, "100%real");
    }

    #[tokio::test]
    async fn test_put_setting_upserts_by_key() {
        let repo = setup().await;
        let first = Setting::new("theme", "dark");

        let stored = repo.put_setting(&first).await.unwrap();
        assert_eq!(stored.value, "dark");

        let second = Setting::new("theme", "light");
        let updated = repo.put_setting(&second).await.unwrap();

        // The original row keeps its identity.
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.value, "light");
        assert_eq!(repo.list_settings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_setting_model_scope_round_trip() {
        let repo = setup().await;
        let owner = Uuid::new_v4();

        repo.put_setting(&Setting::new("locale", "fr").for_model("user", owner))
            .await
            .unwrap();

        let stored = repo.get_setting("locale").await.unwrap().unwrap();
        assert_eq!(stored.model_type.as_deref(), Some("user"));
        assert_eq!(stored.model_id, Some(owner));
    }

    #[tokio::test]
    async fn test_delete_setting() {
        let repo = setup().await;
        repo.put_setting(&Setting::new("theme", "dark")).await.unwrap();

        repo.delete_setting("theme").await.unwrap();

        assert_eq!(repo.get_setting("theme").await.unwrap(), None);
        assert_eq!(
            repo.delete_setting("theme").await,
            Err(RepositoryError::not_found("Setting", "theme"))
        );
    }

    #[tokio::test]
    async fn test_write_past_deadline_is_not_applied() {
        let mut repo = setup().await;
        repo.timeout = Duration::from_millis(50);
        let repo = std::sync::Arc::new(repo);

        let blocker = repo.clone();
        let stall = tokio::spawn(async move {
            blocker
                .conn
                .call(|_| {
                    std::thread::sleep(Duration::from_millis(200));
                    Ok::<_, tokio_rusqlite::Error>(())
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = repo.create_user(&User::new("alice", "a@x.com")).await;
        assert!(matches!(result, Err(RepositoryError::StorageUnavailable(_))));

        stall.await.unwrap().unwrap();
        assert_eq!(repo.get_user_by_email("a@x.com").await.unwrap(), None);
    }
}
