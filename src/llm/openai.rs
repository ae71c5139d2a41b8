use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat-completions client for OpenAI and OpenAI-compatible servers.
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(
        api_key: Option<String>,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("newsroom/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_base,
            model,
        })
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        }
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_json(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Transport(format!("LLM request timed out: {}", e))
            } else {
                AppError::Transport(format!("LLM request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!(
                "LLM endpoint returned {}: {}",
                status,
                detail.chars().take(300).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Unreadable LLM response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Transport("No response from LLM".to_string()))?;

        tracing::debug!(model = %self.model, bytes = content.len(), "LLM response received");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
