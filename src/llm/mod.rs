mod anthropic;
pub mod generator;
mod ollama;
mod openai;
pub(crate) mod parsing;
mod prompts;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::cli::LlmProvider;
use crate::config::Config;

/// One element of the array the model returned, kept exactly as parsed.
///
/// The prompt asks for `question`, `answer`, `difficulty`, `type`, `tags`
/// and `metadata {page, chunk}`, but nothing is coerced or dropped: a
/// record the model shaped differently is stored as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QaPair(Value);

impl QaPair {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn question(&self) -> Option<&str> {
        self.0.get("question").and_then(Value::as_str)
    }

    pub fn answer(&self) -> Option<&str> {
        self.0.get("answer").and_then(Value::as_str)
    }

    /// `metadata.error`, set on placeholder records for unparseable output
    pub fn error(&self) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get("error"))
            .and_then(Value::as_str)
    }
}

/// A single chat-completion call
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProviderTrait: Send + Sync {
    /// Send one chat completion and return the raw text of the reply
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &'static str;
}

/// Main LLM client that abstracts over providers
pub struct LlmClient {
    provider: Box<dyn LlmProviderTrait>,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client for the specified provider
    pub fn new(
        provider: LlmProvider,
        config: &Config,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let name = provider.to_string();
        let provider_config = config
            .get_provider(&name)
            .with_context(|| format!("Provider '{}' is not configured", name))?;
        let model = model_override
            .map(String::from)
            .or_else(|| provider_config.model.clone())
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = provider_config.base_url.as_deref();

        let provider_impl: Box<dyn LlmProviderTrait> = match provider {
            LlmProvider::Groq => Box::new(openai::OpenAIProvider::groq(
                &provider_config.api_key,
                &model,
                base_url,
            )?),
            LlmProvider::OpenAI => Box::new(openai::OpenAIProvider::new(
                &provider_config.api_key,
                &model,
                base_url,
            )?),
            LlmProvider::Anthropic => Box::new(anthropic::AnthropicProvider::new(
                &provider_config.api_key,
                &model,
                base_url,
            )?),
            LlmProvider::Ollama => Box::new(ollama::OllamaProvider::new(
                base_url.unwrap_or("http://localhost:11434"),
                &model,
            )?),
        };

        Ok(Self {
            provider: provider_impl,
            model,
        })
    }

    #[cfg(test)]
    pub fn from_provider(provider: Box<dyn LlmProviderTrait>, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
        }
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.provider.complete(request).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// HTTP client shared by the hosted providers. Request deadlines are
/// enforced per call by the generator.
fn http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qa_pair_accessors() {
        let pair = QaPair::new(json!({
            "question": "Who founded Acme?",
            "answer": "Jane Doe founded Acme in 1999.",
            "difficulty": 2,
            "type": "factual",
            "tags": ["history", "acme"],
            "metadata": {"page": 4, "chunk": 2}
        }));
        assert_eq!(pair.question(), Some("Who founded Acme?"));
        assert_eq!(pair.answer(), Some("Jane Doe founded Acme in 1999."));
        assert_eq!(pair.error(), None);
    }

    #[test]
    fn test_qa_pair_serializes_unchanged() {
        let value = json!({
            "question": "Q",
            "answer": 42,
            "difficulty": "number 1-5",
            "tags": "history",
            "metadata": {"page": -1, "chunk": "2", "section": "intro"},
            "source_quote": "verbatim"
        });
        let pair: QaPair = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(pair.answer(), None);
        assert_eq!(serde_json::to_value(&pair).unwrap(), value);
    }

    #[test]
    fn test_qa_pair_non_object() {
        let pair = QaPair::new(json!("just a string"));
        assert_eq!(pair.question(), None);
        assert_eq!(pair.error(), None);
        assert_eq!(serde_json::to_value(&pair).unwrap(), json!("just a string"));
    }

    #[test]
    fn test_http_client_builds() {
        assert!(http_client().is_ok());
    }
}
