use crate::error::ProviderError;
use crate::models::{ChannelStats, ListedVideo, Page, SearchQuery, Video};
use crate::services::provider::VideoProvider;
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Results of pure provider calls, keyed by operation name and serialized arguments.
///
/// Entries live as long as the cache itself and are never invalidated. Errors are
/// not stored, so a failed call is retried the next time it is asked for.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_key(operation: &str, args: &Value) -> String {
        format!("{operation}:{args}")
    }

    pub fn len(&self) -> usize {
        if let Ok(entries) = self.entries.lock() {
            entries.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        let stored = entries.get(key)?;
        serde_json::from_value(stored.clone()).ok()
    }

    fn store<T: Serialize>(&self, key: String, result: &T) {
        match serde_json::to_value(result) {
            Ok(value) => {
                if let Ok(mut entries) = self.entries.lock() {
                    entries.insert(key, value);
                }
            }
            Err(e) => debug!("Not caching {key}: {e}"),
        }
    }

    pub async fn memoize<T, F, Fut>(
        &self,
        operation: &str,
        args: Value,
        fetch: F,
    ) -> Result<T, ProviderError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let key = Self::cache_key(operation, &args);
        if let Some(hit) = self.lookup::<T>(&key) {
            debug!("Cache hit: {key}");
            return Ok(hit);
        }

        debug!("Cache miss: {key}");
        let result = fetch().await?;
        self.store(key, &result);
        Ok(result)
    }
}

/// Memoizes every call of the wrapped provider for the lifetime of one session.
pub struct CachedProvider {
    inner: Arc<dyn VideoProvider>,
    cache: ResultCache,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn VideoProvider>) -> Self {
        Self {
            inner,
            cache: ResultCache::new(),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl VideoProvider for CachedProvider {
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, ProviderError> {
        self.cache
            .memoize("channel_id_for_username", json!([username]), || {
                self.inner.channel_id_for_username(username)
            })
            .await
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>, ProviderError> {
        self.cache
            .memoize("search_channel", json!([query]), || {
                self.inner.search_channel(query)
            })
            .await
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, ProviderError> {
        self.cache
            .memoize("uploads_playlist_id", json!([channel_id]), || {
                self.inner.uploads_playlist_id(channel_id)
            })
            .await
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        let args = json!([playlist_id, page_token, max_results]);
        self.cache
            .memoize("list_playlist_items", args, || {
                self.inner
                    .list_playlist_items(playlist_id, page_token, max_results)
            })
            .await
    }

    async fn list_video_details(&self, ids: &[String]) -> Result<Vec<Video>, ProviderError> {
        self.cache
            .memoize("list_video_details", json!([ids]), || {
                self.inner.list_video_details(ids)
            })
            .await
    }

    async fn list_channel_statistics(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStats>, ProviderError> {
        self.cache
            .memoize("list_channel_statistics", json!([ids]), || {
                self.inner.list_channel_statistics(ids)
            })
            .await
    }

    async fn search_videos(
        &self,
        query: &SearchQuery,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        let args = json!([query, page_token, max_results]);
        self.cache
            .memoize("search_videos", args, || {
                self.inner.search_videos(query, page_token, max_results)
            })
            .await
    }
}
