use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_PORT: u16 = 11434;
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_SUMMARY_LENGTH: usize = 257;
pub const DEFAULT_WRAP_WIDTH: usize = 80;
pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 20_000;
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_RESULTS_FILE: &str = "gist-batch-results.txt";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// What happens when a summary is longer than the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OveragePolicy {
    /// Print the summary anyway and warn on stderr.
    #[default]
    Warn,
    /// Replace the summary with a reject message.
    Reject,
}

impl FromStr for OveragePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(format!("Invalid overage policy: {} (expected warn or reject)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference server, without trailing slash.
    pub host: String,
    pub model: String,
    pub summary_length: usize,
    pub cache_dir: PathBuf,
    pub cache_max_age: Duration,
    pub wrap_width: usize,
    pub max_article_chars: usize,
    pub user_agent: String,
    pub overage_policy: OveragePolicy,
    pub unload_verify_attempts: u32,
    pub unload_verify_delay: Duration,
    pub exclude_models: Vec<String>,
    pub results_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            summary_length: DEFAULT_SUMMARY_LENGTH,
            cache_dir: default_cache_dir(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            wrap_width: DEFAULT_WRAP_WIDTH,
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            overage_policy: OveragePolicy::Warn,
            unload_verify_attempts: 3,
            unload_verify_delay: Duration::from_secs(1),
            exclude_models: Vec::new(),
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
        }
    }
}

impl Config {
    pub fn with_host(mut self, host: &str) -> Result<Self> {
        self.host = normalize_host(host)?;
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_summary_length(mut self, length: usize) -> Self {
        self.summary_length = length;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model name must not be empty".to_string()));
        }
        if self.summary_length == 0 {
            return Err(Error::Config("summary length must be greater than zero".to_string()));
        }
        if self.wrap_width == 0 {
            return Err(Error::Config("wrap width must be greater than zero".to_string()));
        }
        Ok(())
    }
}

pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("gist"))
        .unwrap_or_else(|| PathBuf::from(".gist-cache"))
}

/// Turns `host`, `host:port` or a full URL into `scheme://host:port`.
pub fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::Config("host must not be empty".to_string()));
    }
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    let parsed = Url::parse(&with_scheme)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", host, e)))?;
    let hostname = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: missing host", host)))?;
    let port = parsed.port().unwrap_or(DEFAULT_PORT);

    let mut base = format!("{}://{}:{}", parsed.scheme(), hostname, port);
    let path = parsed.path().trim_end_matches('/');
    if !path.is_empty() {
        base.push_str(path);
    }
    Ok(base)
}
