//! LLM Client abstractions and provider management
//!
//! Every agent talks to the model through [`LLMClient::generate_json`]: one
//! system prompt, one user prompt, a sampling temperature, and an endpoint
//! forced into JSON-object mode. Two providers are supported, both through
//! the OpenAI-compatible chat-completions API:
//! - **OpenAI**: api.openai.com or any compatible gateway
//! - **Ollama**: a local Ollama server via its `/v1` compatibility layer

use crate::types::{AppError, Result};
use crate::utils::toml_config::{LlmProviderKind, NewsroomConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Run one chat completion whose payload must be a single JSON value.
    ///
    /// Returns the raw response text. Fails with [`AppError::Transport`] when
    /// the call cannot complete (network, auth, quota, timeout).
    async fn generate_json(&self, system: &str, prompt: &str, temperature: f32)
        -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including compatible gateways)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// `base_url` is the server root (`http://localhost:11434`); requests go
    /// to its OpenAI-compatible `/v1` endpoint, which honours JSON mode.
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build the provider described by `[llm]`, resolving the API key from the environment
    pub fn from_config(config: &NewsroomConfig) -> Result<Self> {
        match config.llm.provider {
            LlmProviderKind::OpenAI => Ok(Provider::OpenAI {
                api_key: config
                    .llm_api_key()
                    .map_err(|e| AppError::Config(e.to_string()))?,
                api_base: config.llm.api_base.clone(),
                model: config.llm.model.clone(),
            }),
            LlmProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: config.llm.api_base.clone(),
                model: config.llm.model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// `timeout` bounds every call the client makes; an expired call surfaces
    /// as [`AppError::Transport`].
    pub fn create_client(&self, timeout: Duration) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(super::openai::OpenAIClient::new(
                Some(api_key.clone()),
                api_base.clone(),
                model.clone(),
                timeout,
            )?)),

            Provider::Ollama { base_url, model } => {
                let base = base_url.trim_end_matches('/');
                let api_base = if base.ends_with("/v1") {
                    base.to_string()
                } else {
                    format!("{}/v1", base)
                };
                Ok(Arc::new(super::openai::OpenAIClient::new(
                    None,
                    api_base,
                    model.clone(),
                    timeout,
                )?))
            }
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Creates clients for a default provider with a fixed call timeout
pub struct LLMClientFactory {
    default_provider: Provider,
    timeout: Duration,
}

impl LLMClientFactory {
    pub fn new(default_provider: Provider, timeout: Duration) -> Self {
        Self {
            default_provider,
            timeout,
        }
    }

    pub fn from_config(config: &NewsroomConfig) -> Result<Self> {
        Ok(Self::new(Provider::from_config(config)?, config.llm.timeout()))
    }

    /// Create a client using the default provider
    pub fn create_default(&self) -> Result<Arc<dyn LLMClient>> {
        self.default_provider.create_client(self.timeout)
    }

    /// Get a reference to the default provider
    pub fn default_provider(&self) -> &Provider {
        &self.default_provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
