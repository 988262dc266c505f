use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gist_core::{ArticleCache, Config, Error, Result, TextExtractor};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Cache,
    Network,
    /// Download or conversion failed; the text is empty.
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub url: String,
    pub text: String,
    pub source: ContentSource,
    /// Cache read or write failures. The text is still usable.
    pub cache_warnings: Vec<String>,
}

/// Downloads article text, going through the cache first.
pub struct ContentFetcher {
    client: Client,
    cache: Arc<dyn ArticleCache>,
    extractor: Arc<dyn TextExtractor>,
    max_age: Duration,
}

impl ContentFetcher {
    pub fn new(
        config: &Config,
        cache: Arc<dyn ArticleCache>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            cache,
            extractor,
            max_age: config.cache_max_age,
        })
    }

    /// Never fails: a broken download yields empty text and `ContentSource::Unavailable`.
    pub async fn fetch(&self, url: &str) -> FetchedContent {
        let mut cache_warnings = Vec::new();
        match self.cache.get(url).await {
            Ok(Some(entry)) if entry.is_fresh(Utc::now(), self.max_age) => {
                debug!("Cache hit for {} ({})", url, entry.key);
                return FetchedContent {
                    url: url.to_string(),
                    text: entry.content,
                    source: ContentSource::Cache,
                    cache_warnings,
                };
            }
            Ok(Some(entry)) => debug!(
                "Cache entry for {} is stale ({}s old)",
                url,
                entry.age(Utc::now()).as_secs()
            ),
            Ok(None) => debug!("No cache entry for {}", url),
            Err(e) => cache_warnings.push(format!("Could not read cache entry: {}", e)),
        }

        match self.download(url).await {
            Ok(text) => {
                if let Err(e) = self.cache.put(url, &text).await {
                    cache_warnings.push(format!("Could not write cache entry: {}", e));
                }
                FetchedContent {
                    url: url.to_string(),
                    text,
                    source: ContentSource::Network,
                    cache_warnings,
                }
            }
            Err(e) => FetchedContent {
                url: url.to_string(),
                text: String::new(),
                source: ContentSource::Unavailable(e.to_string()),
                cache_warnings,
            },
        }
    }

    async fn download(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{} returned {}", url, status)));
        }
        let html = response.text().await?;
        debug!("Downloaded {} bytes from {}", html.len(), url);
        self.extractor.extract(&html)
    }
}
