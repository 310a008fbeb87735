//! Ordered fallback across model endpoints.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::config::ModelConfig;

/// Fallback chain over an ordered list of model configs.
///
/// Models are attempted lowest priority first, each up to its
/// `max_retries`; the first successful response wins. When every config
/// fails the chain returns an explicit failure response carrying the last
/// observed error; it never raises.
pub struct FallbackChain {
    configs: Vec<ModelConfig>,
    clients: RwLock<HashMap<String, Arc<LlmClient>>>,
}

impl FallbackChain {
    pub fn new(mut configs: Vec<ModelConfig>) -> Self {
        configs.sort_by_key(|c| c.priority);
        Self {
            configs,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Chain with no configured models; every request fails fast.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_configured(&self) -> bool {
        !self.configs.is_empty()
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.configs
    }

    fn client_for(&self, config: &ModelConfig) -> Arc<LlmClient> {
        let key = config.client_key();
        if let Ok(cache) = self.clients.read() {
            if let Some(client) = cache.get(&key) {
                return Arc::clone(client);
            }
        }
        match self.clients.write() {
            Ok(mut cache) => Arc::clone(
                cache
                    .entry(key)
                    .or_insert_with(|| Arc::new(LlmClient::new(config.clone()))),
            ),
            // A poisoned cache only costs memoisation; serve an
            // uncached client instead of failing the chain.
            Err(_) => Arc::new(LlmClient::new(config.clone())),
        }
    }

    /// Generate a completion via the first model that answers.
    pub async fn generate(&self, request: &LlmRequest) -> LlmResponse {
        if self.configs.is_empty() {
            return LlmResponse::failed("none", "none", 0.0, "No models configured in fallback chain");
        }

        let mut last_error = String::new();

        for config in &self.configs {
            let client = self.client_for(config);
            for attempt in 1..=config.max_retries {
                info!(
                    provider = config.provider.as_str(),
                    model = %config.model,
                    attempt,
                    max_retries = config.max_retries,
                    "llm attempt"
                );
                let response = client.generate(request).await;
                if response.is_success() {
                    info!(
                        provider = config.provider.as_str(),
                        model = %config.model,
                        "llm fallback succeeded"
                    );
                    return response;
                }
                last_error = response
                    .error
                    .unwrap_or_else(|| "empty response".to_string());
                warn!(
                    provider = config.provider.as_str(),
                    model = %config.model,
                    attempt,
                    error = %last_error,
                    "llm attempt failed"
                );
            }
        }

        warn!(
            models_tried = self.configs.len(),
            last_error = %last_error,
            "llm fallback exhausted"
        );
        LlmResponse::failed(
            "fallback_exhausted",
            "none",
            0.0,
            format!(
                "All {} models failed. Last error: {last_error}",
                self.configs.len()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_chain_fails_fast() {
        let chain = FallbackChain::empty();
        let response = chain.generate(&LlmRequest::new("x")).await;
        assert!(!response.is_success());
        assert_eq!(response.model, "none");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_error() {
        // Both endpoints are unreachable; the chain must degrade, not panic.
        let chain = FallbackChain::new(vec![
            ModelConfig::new(LlmProvider::Ollama, "a", 2)
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_millis(100)),
            ModelConfig::new(LlmProvider::Ollama, "b", 1)
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_millis(100)),
        ]);
        let response = chain.generate(&LlmRequest::new("x")).await;
        assert!(!response.is_success());
        assert_eq!(response.model, "fallback_exhausted");
        assert!(response.error.as_deref().unwrap().contains("All 2 models"));
    }

    #[test]
    fn configs_are_sorted_by_priority() {
        let chain = FallbackChain::new(vec![
            ModelConfig::new(LlmProvider::Ollama, "slow", 3),
            ModelConfig::new(LlmProvider::OpenAi, "fast", 1),
        ]);
        assert_eq!(chain.models()[0].model, "fast");
    }

    #[test]
    fn clients_are_memoised_by_provider_and_model() {
        let config = ModelConfig::new(LlmProvider::OpenAi, "gpt-4o-mini", 1);
        let chain = FallbackChain::new(vec![config.clone()]);
        let a = chain.client_for(&config);
        let b = chain.client_for(&config);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
