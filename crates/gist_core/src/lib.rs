pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod storage;
pub mod types;

pub use config::{Config, OveragePolicy};
pub use error::{Error, Result};
pub use extract::TextExtractor;
pub use models::InferenceApi;
pub use storage::ArticleCache;
pub use types::{
    CacheEntry, ModelHandle, ModelState, SummaryRequest, SummaryResult, UnloadOutcome,
    UnloadReport, UnloadStatus,
};
