use std::sync::Arc;

use gist_core::{
    ArticleCache, Config, Error, InferenceApi, Result, SummaryRequest, SummaryResult,
    TextExtractor, UnloadReport,
};
use gist_inference::{sanitize, LengthValidator, LifecycleManager, OllamaClient, SummaryRequester};
use gist_storage::FileCache;
use url::Url;

use crate::extract::HtmlTextExtractor;
use crate::fetcher::{ContentFetcher, ContentSource, FetchedContent};
use crate::logging::Logger;

#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub model: String,
    pub content: FetchedContent,
    /// `None` when the resident model list could not be queried.
    pub unload: Option<UnloadReport>,
    pub result: SummaryResult,
    /// Exactly what belongs on stdout under the configured overage policy.
    pub output: String,
}

/// Fetch, unload, request, sanitize, validate.
pub struct SummaryPipeline {
    config: Config,
    api: Arc<dyn InferenceApi>,
    fetcher: ContentFetcher,
    lifecycle: LifecycleManager,
    requester: SummaryRequester,
    validator: LengthValidator,
    logger: Logger,
}

impl SummaryPipeline {
    pub fn new(
        config: Config,
        api: Arc<dyn InferenceApi>,
        cache: Arc<dyn ArticleCache>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: ContentFetcher::new(&config, cache, extractor)?,
            lifecycle: LifecycleManager::new(api.clone(), &config),
            requester: SummaryRequester::new(api.clone(), &config),
            validator: LengthValidator::from_config(&config),
            logger: Logger::new(),
            api,
            config,
        })
    }

    /// Wires the Ollama client, the on-disk cache and the HTML extractor.
    pub fn from_config(config: Config) -> Result<Self> {
        let api = Arc::new(OllamaClient::new(&config)?);
        let cache = Arc::new(FileCache::new(&config.cache_dir));
        let extractor = Arc::new(HtmlTextExtractor::from_config(&config));
        Self::new(config, api, cache, extractor)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> Arc<dyn InferenceApi> {
        self.api.clone()
    }

    pub async fn summarize(&self, url: &str) -> Result<SummaryOutcome> {
        self.summarize_with(url, &self.config.model, &self.logger)
            .await
    }

    pub async fn summarize_with(
        &self,
        url: &str,
        model: &str,
        logger: &Logger,
    ) -> Result<SummaryOutcome> {
        validate_url(url)?;

        logger.info(&format!("🔎 Checking model {} on {}", model, self.api.host()));
        if let Err(e) = self.lifecycle.ensure_installed(model).await {
            if let Error::ModelNotFound { available, .. } = &e {
                logger.error(&format!("Model {} is not installed. Available models:", model));
                for name in available {
                    logger.error(&format!("  - {}", name));
                }
            }
            return Err(e);
        }

        logger.info(&format!("📰 Fetching {}", url));
        let content = self.fetcher.fetch(url).await;
        for warning in &content.cache_warnings {
            logger.warn(&format!("⚠️ {}", warning));
        }
        match &content.source {
            ContentSource::Cache => logger.info(&format!(
                "📦 Using cached text ({} characters)",
                content.text.chars().count()
            )),
            ContentSource::Network => logger.info(&format!(
                "🌐 Downloaded and cached text ({} characters)",
                content.text.chars().count()
            )),
            ContentSource::Unavailable(reason) => {
                logger.warn(&format!("⚠️ Could not fetch article, continuing without text: {}", reason))
            }
        }

        let unload = self.unload_resident(logger).await;

        let request = SummaryRequest {
            model: model.to_string(),
            target_length: self.config.summary_length,
            article: content.text.clone(),
        };
        let raw = self.requester.request(&request).await.map_err(|e| {
            logger.error(&format!("❌ Summary request failed: {}", e));
            e
        })?;

        let result = self.validator.validate(&sanitize(&raw));
        if result.placeholder {
            logger.warn("⚠️ Model returned an empty summary");
        }
        if result.exceeds_target() {
            logger.warn(&format!(
                "⚠️ Summary is {} characters, over the {} character target",
                result.length, result.target_length
            ));
        } else {
            logger.info(&format!(
                "✨ Summary length {}/{} characters",
                result.length, result.target_length
            ));
        }

        let output = self.validator.render(&result);
        Ok(SummaryOutcome {
            model: model.to_string(),
            content,
            unload,
            result,
            output,
        })
    }

    /// Unload pass with its outcome reported through `logger`. Never fails.
    pub async fn unload_resident(&self, logger: &Logger) -> Option<UnloadReport> {
        match self.lifecycle.unload_all().await {
            Ok(report) => {
                for outcome in &report.outcomes {
                    if outcome.is_success() {
                        logger.info(&format!("⏏️ Unloaded {}", outcome.model));
                    }
                }
                if !report.is_success() {
                    let failed: Vec<&str> = report.failures().map(|o| o.model.as_str()).collect();
                    logger.warn(&format!(
                        "⚠️ Some models could not be unloaded: {}",
                        failed.join(", ")
                    ));
                }
                Some(report)
            }
            Err(e) => {
                logger.warn(&format!("⚠️ Could not list resident models: {}", e));
                None
            }
        }
    }
}

fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::InvalidUrl(format!("{}: unsupported scheme {}", url, scheme))),
    }
}
