//! Provider wire protocols behind a single client type.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::{LlmProvider, ModelConfig};

/// A completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A completion response; `error` contains the transport failure when the
/// call did not succeed. Callers never see a raised transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
    pub tokens_used: u64,
    pub latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LlmResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.content.trim().is_empty()
    }

    pub fn failed(model: &str, provider: &str, latency_ms: f64, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            model: model.to_string(),
            provider: provider.to_string(),
            tokens_used: 0,
            latency_ms,
            error: Some(error.into()),
        }
    }
}

/// HTTP client for one (provider, model) pair.
///
/// The underlying reqwest client is retained for the process lifetime;
/// the chain memoises instances by `ModelConfig::client_key`.
pub struct LlmClient {
    config: ModelConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: ModelConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Issue a completion; transport failures come back inside the
    /// response envelope.
    pub async fn generate(&self, request: &LlmRequest) -> LlmResponse {
        let started = Instant::now();
        let result = match self.config.provider {
            LlmProvider::OpenAi => self.generate_openai(request).await,
            LlmProvider::Anthropic => self.generate_anthropic(request).await,
            LlmProvider::Ollama => self.generate_ollama(request).await,
        };
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok((content, tokens_used)) => {
                debug!(
                    provider = self.config.provider.as_str(),
                    model = %self.config.model,
                    latency_ms,
                    tokens = tokens_used,
                    "llm generation complete"
                );
                LlmResponse {
                    content,
                    model: self.config.model.clone(),
                    provider: self.config.provider.as_str().to_string(),
                    tokens_used,
                    latency_ms,
                    error: None,
                }
            }
            Err(e) => {
                error!(
                    provider = self.config.provider.as_str(),
                    model = %self.config.model,
                    error = %e,
                    "llm generation failed"
                );
                LlmResponse::failed(
                    &self.config.model,
                    self.config.provider.as_str(),
                    latency_ms,
                    e,
                )
            }
        }
    }

    async fn post_json(&self, url: &str, headers: &[(&str, String)], body: &Value) -> Result<Value, String> {
        let mut request = self.http.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            // Rate limits and server errors are transport failures; the
            // chain treats them as fall-through.
            return Err(format!("HTTP {status}"));
        }
        response.json::<Value>().await.map_err(|e| e.to_string())
    }

    async fn generate_openai(&self, request: &LlmRequest) -> Result<(String, u64), String> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut headers: Vec<(&str, String)> = Vec::new();
        if let Some(key) = &self.config.api_key {
            headers.push(("Authorization", format!("Bearer {key}")));
        }

        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        let url = format!("{}/chat/completions", self.config.effective_base_url());
        let data = self.post_json(&url, &headers, &body).await?;

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or("malformed chat completion response")?
            .to_string();
        let tokens = data["usage"]["total_tokens"].as_u64().unwrap_or(0);
        Ok((content, tokens))
    }

    async fn generate_anthropic(&self, request: &LlmRequest) -> Result<(String, u64), String> {
        let mut headers: Vec<(&str, String)> = vec![(
            "anthropic-version",
            "2023-06-01".to_string(),
        )];
        if let Some(key) = &self.config.api_key {
            headers.push(("x-api-key", key.clone()));
        }

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(system) = &request.system_prompt {
            body["system"] = Value::from(system.clone());
        }

        let url = format!("{}/messages", self.config.effective_base_url());
        let data = self.post_json(&url, &headers, &body).await?;

        let content = data["content"][0]["text"]
            .as_str()
            .ok_or("malformed messages response")?
            .to_string();
        let tokens = data["usage"]["input_tokens"].as_u64().unwrap_or(0)
            + data["usage"]["output_tokens"].as_u64().unwrap_or(0);
        Ok((content, tokens))
    }

    async fn generate_ollama(&self, request: &LlmRequest) -> Result<(String, u64), String> {
        let mut body = json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });
        if let Some(system) = &request.system_prompt {
            body["system"] = Value::from(system.clone());
        }

        let url = format!("{}/api/generate", self.config.effective_base_url());
        let data = self.post_json(&url, &[], &body).await?;

        let content = data["response"].as_str().unwrap_or_default().to_string();
        let tokens = data["eval_count"].as_u64().unwrap_or(0);
        Ok((content, tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_not_success() {
        let response = LlmResponse {
            content: "  ".to_string(),
            model: "m".to_string(),
            provider: "openai".to_string(),
            tokens_used: 0,
            latency_ms: 1.0,
            error: None,
        };
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_contained_failure() {
        let config = ModelConfig::new(LlmProvider::Ollama, "llama3.2", 1)
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(std::time::Duration::from_millis(200));
        let client = LlmClient::new(config);
        let response = client.generate(&LlmRequest::new("test")).await;
        assert!(!response.is_success());
        assert!(response.error.is_some());
    }
}
