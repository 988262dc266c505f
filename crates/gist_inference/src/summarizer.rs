use std::sync::Arc;

use gist_core::{Config, InferenceApi, Result, SummaryRequest};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

lazy_static! {
    static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").unwrap();
}

pub struct SummaryRequester {
    api: Arc<dyn InferenceApi>,
    max_article_chars: usize,
}

impl SummaryRequester {
    pub fn new(api: Arc<dyn InferenceApi>, config: &Config) -> Self {
        Self {
            api,
            max_article_chars: config.max_article_chars,
        }
    }

    pub fn build_prompt(&self, request: &SummaryRequest) -> String {
        format!(
            "Respond only with a {}-character summary of the following article. \
             Do not include any thinking output.\n\n{}",
            request.target_length,
            clean_article(&request.article, self.max_article_chars)
        )
    }

    /// Returns the raw model output. Transport and decoding failures are not retried.
    pub async fn request(&self, request: &SummaryRequest) -> Result<String> {
        let prompt = self.build_prompt(request);
        info!(
            "🤖 Requesting {}-character summary from {} at {}",
            request.target_length,
            request.model,
            self.api.host()
        );
        let response = self.api.generate(&request.model, &prompt).await?;
        debug!("Raw model output: {:?}", response);
        Ok(response)
    }
}

/// Drops terminal escapes and control characters (newlines and tabs survive),
/// then caps the text at `max_chars` characters.
pub fn clean_article(text: &str, max_chars: usize) -> String {
    ANSI_ESCAPE
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(max_chars)
        .collect()
}
