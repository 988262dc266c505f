use std::sync::Arc;
use std::time::Duration;

use gist_core::{
    Config, Error, InferenceApi, ModelHandle, Result, UnloadOutcome, UnloadReport, UnloadStatus,
};
use tracing::debug;

/// Evicts resident models before a new request so large models don't compete for memory.
pub struct LifecycleManager {
    api: Arc<dyn InferenceApi>,
    verify_attempts: u32,
    verify_delay: Duration,
}

impl LifecycleManager {
    pub fn new(api: Arc<dyn InferenceApi>, config: &Config) -> Self {
        Self {
            api,
            verify_attempts: config.unload_verify_attempts.max(1),
            verify_delay: config.unload_verify_delay,
        }
    }

    /// Fails with `ModelNotFound` (listing what is installed) when `model` is absent.
    pub async fn ensure_installed(&self, model: &str) -> Result<ModelHandle> {
        let installed = self.api.installed_models().await?;
        match installed.iter().find(|m| m.matches(model)) {
            Some(handle) => Ok(handle.clone()),
            None => Err(Error::ModelNotFound {
                model: model.to_string(),
                available: installed.into_iter().map(|m| m.name).collect(),
            }),
        }
    }

    /// Best effort: every resident model gets an unload request and a confirmation query.
    ///
    /// Only a failure to list resident models is returned as an error; per-model
    /// failures are recorded in the report.
    pub async fn unload_all(&self) -> Result<UnloadReport> {
        let resident = self.api.resident_models().await?;
        let mut report = UnloadReport::default();

        if resident.is_empty() {
            debug!("No resident models to unload");
            return Ok(report);
        }

        for model in resident {
            debug!("Unloading model {}", model.name);
            let status = self.unload_one(&model.name).await;
            match &status {
                UnloadStatus::Unloaded => debug!("Model {} unloaded", model.name),
                UnloadStatus::StillResident => {
                    debug!("Model {} is still resident after unload request", model.name)
                }
                UnloadStatus::Failed(reason) => {
                    debug!("Failed to unload model {}: {}", model.name, reason)
                }
            }
            report.outcomes.push(UnloadOutcome {
                model: model.name,
                status,
            });
        }

        Ok(report)
    }

    async fn unload_one(&self, model: &str) -> UnloadStatus {
        if let Err(e) = self.api.unload(model).await {
            return UnloadStatus::Failed(e.to_string());
        }

        for attempt in 1..=self.verify_attempts {
            match self.api.resident_models().await {
                Ok(models) if !models.iter().any(|m| m.name == model) => {
                    return UnloadStatus::Unloaded;
                }
                Ok(_) => debug!(
                    "Model {} still listed ({}/{})",
                    model, attempt, self.verify_attempts
                ),
                Err(e) => return UnloadStatus::Failed(format!("could not confirm unload: {}", e)),
            }
            if attempt < self.verify_attempts && !self.verify_delay.is_zero() {
                tokio::time::sleep(self.verify_delay).await;
            }
        }

        UnloadStatus::StillResident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory server. Models in `sticky` ignore unload requests.
    struct MockApi {
        installed: Vec<String>,
        resident: Mutex<Vec<String>>,
        sticky: HashSet<String>,
        broken: HashSet<String>,
        unload_calls: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn new(installed: &[&str], resident: &[&str]) -> Self {
            Self {
                installed: installed.iter().map(|s| s.to_string()).collect(),
                resident: Mutex::new(resident.iter().map(|s| s.to_string()).collect()),
                sticky: HashSet::new(),
                broken: HashSet::new(),
                unload_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceApi for MockApi {
        fn host(&self) -> &str {
            "mock"
        }

        async fn installed_models(&self) -> Result<Vec<ModelHandle>> {
            Ok(self.installed.iter().map(ModelHandle::installed).collect())
        }

        async fn resident_models(&self) -> Result<Vec<ModelHandle>> {
            Ok(self
                .resident
                .lock()
                .unwrap()
                .iter()
                .map(ModelHandle::resident)
                .collect())
        }

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }

        async fn unload(&self, model: &str) -> Result<()> {
            self.unload_calls.lock().unwrap().push(model.to_string());
            if self.broken.contains(model) {
                return Err(Error::Inference("boom".to_string()));
            }
            if !self.sticky.contains(model) {
                self.resident.lock().unwrap().retain(|m| m != model);
            }
            Ok(())
        }
    }

    fn manager(api: Arc<MockApi>) -> LifecycleManager {
        let config = Config {
            unload_verify_delay: Duration::ZERO,
            ..Config::default()
        };
        LifecycleManager::new(api, &config)
    }

    #[tokio::test]
    async fn test_no_resident_models_is_noop() {
        let api = Arc::new(MockApi::new(&["a"], &[]));
        let report = manager(api.clone()).unload_all().await.unwrap();

        assert!(report.is_empty());
        assert!(report.is_success());
        assert!(api.unload_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unloads_every_resident_model() {
        let api = Arc::new(MockApi::new(&["a", "b"], &["a", "b"]));
        let report = manager(api.clone()).unload_all().await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(*api.unload_calls.lock().unwrap(), vec!["a", "b"]);
        assert!(api.resident.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_not_fatal() {
        let mut api = MockApi::new(&["a", "b", "c"], &["a", "b", "c"]);
        api.sticky.insert("a".to_string());
        api.broken.insert("b".to_string());
        let api = Arc::new(api);

        let report = manager(api.clone()).unload_all().await.unwrap();

        assert!(!report.is_success());
        assert_eq!(report.outcomes[0].status, UnloadStatus::StillResident);
        assert!(matches!(report.outcomes[1].status, UnloadStatus::Failed(_)));
        assert_eq!(report.outcomes[2].status, UnloadStatus::Unloaded);
        assert_eq!(api.unload_calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ensure_installed() {
        let api = Arc::new(MockApi::new(&["llama3.2:latest", "qwen3:8b"], &[]));
        let manager = manager(api);

        let handle = manager.ensure_installed("llama3.2").await.unwrap();
        assert_eq!(handle.name, "llama3.2:latest");

        match manager.ensure_installed("mistral").await {
            Err(Error::ModelNotFound { model, available }) => {
                assert_eq!(model, "mistral");
                assert_eq!(available, vec!["llama3.2:latest", "qwen3:8b"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
