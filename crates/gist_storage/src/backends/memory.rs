use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gist_core::{ArticleCache, CacheEntry, Result};
use tokio::sync::RwLock;

use crate::url_digest;

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry with an explicit modification time.
    pub async fn insert_at(&self, url: &str, content: &str, modified_at: DateTime<Utc>) -> CacheEntry {
        let entry = CacheEntry {
            key: url_digest(url),
            path: None,
            content: content.to_string(),
            modified_at,
        };
        self.entries
            .write()
            .await
            .insert(entry.key.clone(), entry.clone());
        entry
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleCache for MemoryCache {
    fn key_for(&self, url: &str) -> String {
        url_digest(url)
    }

    async fn get(&self, url: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(&url_digest(url)).cloned())
    }

    async fn put(&self, url: &str, content: &str) -> Result<CacheEntry> {
        Ok(self.insert_at(url, content, Utc::now()).await)
    }
}
