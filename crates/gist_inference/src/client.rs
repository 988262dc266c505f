use std::fmt;

use async_trait::async_trait;
use gist_core::config::normalize_host;
use gist_core::{Config, Error, InferenceApi, ModelHandle, ModelState, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<u64>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
    #[serde(default)]
    size: Option<u64>,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

/// HTTP client for the Ollama API.
pub struct OllamaClient {
    client: Client,
    host: String,
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("client", &"<reqwest::Client>")
            .field("host", &self.host)
            .finish()
    }
}

impl OllamaClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_host(&config.host)
    }

    pub fn with_host(host: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            host: normalize_host(host)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        // Callers report the returned error through their own logger.
        debug!(error = %e, host = %self.host, "Request to inference server failed");
        if e.is_connect() {
            Error::ServerUnreachable {
                host: self.host.clone(),
                reason: e.to_string(),
            }
        } else {
            Error::Inference(format!("Network error: {}", e))
        }
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(Error::Inference(format!("API error ({}): {}", status, detail)))
    }

    async fn list(&self, path: &str, state: ModelState) -> Result<Vec<ModelHandle>> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;
        let list = response
            .json::<ModelList>()
            .await
            .map_err(|e| Error::Inference(format!("Malformed model list from {}: {}", path, e)))?;

        Ok(list
            .models
            .into_iter()
            .map(|entry| ModelHandle {
                name: entry.name,
                state,
                size: entry.size,
            })
            .collect())
    }

    async fn post_generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse> {
        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;
        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::Inference(format!("Malformed generate response: {}", e)))
    }
}

#[async_trait]
impl InferenceApi for OllamaClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn installed_models(&self) -> Result<Vec<ModelHandle>> {
        self.list("/api/tags", ModelState::Installed).await
    }

    async fn resident_models(&self) -> Result<Vec<ModelHandle>> {
        self.list("/api/ps", ModelState::Resident).await
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        debug!(model, prompt_len = prompt.len(), "Sending generate request");
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            keep_alive: None,
        };
        self.post_generate(&request)
            .await?
            .response
            .ok_or_else(|| Error::Inference("Generate response has no 'response' field".to_string()))
    }

    async fn unload(&self, model: &str) -> Result<()> {
        debug!(model, "Sending unload request");
        let request = GenerateRequest {
            model,
            prompt: "",
            stream: false,
            keep_alive: Some(0),
        };
        self.post_generate(&request).await.map(|_| ())
    }
}
