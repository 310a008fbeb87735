//! Model configuration for the fallback chain.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// OpenAI-compatible chat-completions endpoint (OpenAI, OpenRouter,
    /// LiteLLM proxies).
    OpenAi,
    /// Anthropic messages endpoint.
    Anthropic,
    /// Local Ollama generate endpoint.
    Ollama,
}

impl LlmProvider {
    /// Default base URL for the provider.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Ollama => "ollama",
        }
    }
}

/// Configuration of a single model in the chain.
///
/// Priorities define a strict total order within a chain: lower values
/// are attempted earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_retries() -> u32 {
    1
}

mod duration_secs {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

impl ModelConfig {
    pub fn new(provider: LlmProvider, model: impl Into<String>, priority: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            priority,
            api_key: None,
            base_url: None,
            timeout: default_timeout(),
            max_retries: default_retries(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Base URL, falling back to the provider default.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    /// Memoisation key of the client for this config.
    pub fn client_key(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.model)
    }
}

/// Default chain: a fast hosted model first, then a hosted fallback,
/// finally a local model that works offline.
pub fn default_chain_configs() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new(LlmProvider::OpenAi, "gpt-4o-mini", 1)
            .with_timeout(Duration::from_secs(30)),
        ModelConfig::new(LlmProvider::Anthropic, "claude-3-haiku-20240307", 2)
            .with_timeout(Duration::from_secs(30)),
        ModelConfig::new(LlmProvider::Ollama, "llama3.2", 3)
            .with_timeout(Duration::from_secs(120))
            .with_max_retries(2),
    ]
}
