pub mod client;
pub mod lifecycle;
pub mod sanitize;
pub mod summarizer;
pub mod validate;

pub use client::OllamaClient;
pub use lifecycle::LifecycleManager;
pub use sanitize::sanitize;
pub use summarizer::SummaryRequester;
pub use validate::{LengthValidator, EMPTY_SUMMARY_PLACEHOLDER};
