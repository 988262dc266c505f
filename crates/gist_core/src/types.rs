use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extracted article text stored under the digest of its source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub path: Option<PathBuf>,
    pub content: String,
    pub modified_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        // A modification time in the future counts as brand new.
        (now - self.modified_at).to_std().unwrap_or_default()
    }

    /// An entry is stale once its age reaches `max_age`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) < max_age
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Installed,
    Resident,
}

/// A model as reported by the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    pub name: String,
    pub state: ModelState,
    pub size: Option<u64>,
}

impl ModelHandle {
    pub fn installed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ModelState::Installed,
            size: None,
        }
    }

    pub fn resident(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ModelState::Resident,
            size: None,
        }
    }

    /// Untagged names match the `:latest` tag the server adds on pull.
    pub fn matches(&self, requested: &str) -> bool {
        if self.name == requested {
            return true;
        }
        !requested.contains(':')
            && self
                .name
                .strip_suffix(":latest")
                .map_or(false, |base| base == requested)
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub model: String,
    pub target_length: usize,
    pub article: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
    /// Length in characters, not bytes.
    pub length: usize,
    pub target_length: usize,
    pub placeholder: bool,
}

impl SummaryResult {
    pub fn exceeds_target(&self) -> bool {
        self.length > self.target_length
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnloadStatus {
    Unloaded,
    StillResident,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadOutcome {
    pub model: String,
    pub status: UnloadStatus,
}

impl UnloadOutcome {
    pub fn is_success(&self) -> bool {
        self.status == UnloadStatus::Unloaded
    }
}

/// Per-model results of one unload pass over the resident models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnloadReport {
    pub outcomes: Vec<UnloadOutcome>,
}

impl UnloadReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(UnloadOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
