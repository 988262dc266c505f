use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gist_core::{ArticleCache, CacheEntry, Error, Result};
use tracing::debug;

use crate::{url_digest, CACHE_EXTENSION};

/// One plain-text file per URL, named by the URL digest.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", url_digest(url), CACHE_EXTENSION))
    }

    async fn modified_at(path: &Path) -> Result<DateTime<Utc>> {
        let metadata = tokio::fs::metadata(path).await?;
        let modified = metadata
            .modified()
            .map_err(|e| Error::Cache(format!("No modification time for {}: {}", path.display(), e)))?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

#[async_trait]
impl ArticleCache for FileCache {
    fn key_for(&self, url: &str) -> String {
        url_digest(url)
    }

    async fn get(&self, url: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(url);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modified_at = Self::modified_at(&path).await?;
        debug!("Cache entry found at {}", path.display());

        Ok(Some(CacheEntry {
            key: self.key_for(url),
            path: Some(path),
            content,
            modified_at,
        }))
    }

    async fn put(&self, url: &str, content: &str) -> Result<CacheEntry> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Cache(format!("Failed to create cache directory {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(url);
        // Overwrites in place, a stale entry is never appended to.
        tokio::fs::write(&path, content).await?;
        let modified_at = Self::modified_at(&path).await?;
        debug!("Cached {} bytes at {}", content.len(), path.display());

        Ok(CacheEntry {
            key: self.key_for(url),
            path: Some(path),
            content: content.to_string(),
            modified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_entry() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.get("https://example.com/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));
        let url = "https://example.com/a";

        let stored = cache.put(url, "Article body").await.unwrap();
        assert_eq!(stored.path.as_deref(), Some(cache.path_for(url).as_path()));
        assert!(cache.path_for(url).to_string_lossy().ends_with(".txt"));

        let entry = cache.get(url).await.unwrap().unwrap();
        assert_eq!(entry.content, "Article body");
        assert_eq!(entry.key, url_digest(url));
        assert!(entry.is_fresh(Utc::now(), std::time::Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let url = "https://example.com/a";

        cache.put(url, "first version, which is longer").await.unwrap();
        cache.put(url, "second").await.unwrap();

        let on_disk = std::fs::read_to_string(cache.path_for(url)).unwrap();
        assert_eq!(on_disk, "second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
