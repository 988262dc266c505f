use async_trait::async_trait;
use crate::types::CacheEntry;
use crate::Result;

#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// Digest used to address the entry for `url`
    fn key_for(&self, url: &str) -> String;

    /// Look up the stored text for a URL, fresh or not
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>>;

    /// Store text for a URL, replacing any previous entry
    async fn put(&self, url: &str, content: &str) -> Result<CacheEntry>;
}
