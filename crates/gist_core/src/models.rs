use async_trait::async_trait;
use crate::types::ModelHandle;
use crate::Result;

/// Typed access to an Ollama-compatible inference server.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// Base URL of the server, used in diagnostics
    fn host(&self) -> &str;

    /// Models installed on disk (`/api/tags`)
    async fn installed_models(&self) -> Result<Vec<ModelHandle>>;

    /// Models currently loaded in memory (`/api/ps`)
    async fn resident_models(&self) -> Result<Vec<ModelHandle>>;

    /// Non-streaming generation, returns the `response` field verbatim
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Asks the server to evict a model by generating with a zero keep-alive
    async fn unload(&self, model: &str) -> Result<()>;
}
