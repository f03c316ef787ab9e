//! Cached setting repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use curator_core::cache::{setting_key, SETTINGS_LIST_KEY};
use curator_core::records::Setting;
use curator_core::storage::{Result, SettingRepository};

use super::{may_have_written, remember_decoded};
use crate::cache::CacheAside;

pub struct CachedSettingRepository<R>
where
    R: SettingRepository,
{
    repository: Arc<R>,
    cache: Arc<CacheAside>,
    ttl: Duration,
}

impl<R> CachedSettingRepository<R>
where
    R: SettingRepository,
{
    pub fn new(repository: Arc<R>, cache: Arc<CacheAside>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    async fn invalidate(&self, key: &str) {
        self.cache.remove(SETTINGS_LIST_KEY).await;
        self.cache.remove(&setting_key(key)).await;
    }
}

#[async_trait]
impl<R> SettingRepository for CachedSettingRepository<R>
where
    R: SettingRepository + 'static,
{
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, &setting_key(key), self.ttl, || {
            repository.get_setting(key)
        })
        .await
    }

    async fn list_settings(&self) -> Result<Vec<Setting>> {
        let repository = &self.repository;
        remember_decoded(&self.cache, SETTINGS_LIST_KEY, self.ttl, || {
            repository.list_settings()
        })
        .await
    }

    async fn put_setting(&self, setting: &Setting) -> Result<Setting> {
        let result = self.repository.put_setting(setting).await;
        if may_have_written(&result) {
            self.invalidate(&setting.key).await;
        }
        let stored = result?;
        tracing::debug!(key = %setting.key, "Setting stored, cache invalidated");
        Ok(stored)
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let result = self.repository.delete_setting(key).await;
        if may_have_written(&result) {
            self.invalidate(key).await;
        }
        result?;
        tracing::debug!(key = %key, "Setting deleted, cache invalidated");
        Ok(())
    }
}
