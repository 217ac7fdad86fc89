//! OpenAI-compatible chat-completions adapter.
//!
//! Works with Mistral (the default endpoint), OpenAI, and any compatible API.
//! Implements `TextGenerationPort`; the returned text is not interpreted here.

use crate::domain::DomainError;
use crate::ports::{CompletionRequest, TextGenerationPort};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Longest slice of an error body kept in logs and error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// OpenAI-compatible text generation adapter.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new adapter.
    ///
    /// # Arguments
    /// * `api_url` - Endpoint (e.g. "https://api.mistral.ai/v1/chat/completions")
    /// * `api_key` - Bearer credential; empty means "not configured"
    /// * `model` - Model name (e.g. "mistral-small-latest")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key, model)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        api_key: String,
        model: String,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key: api_key.trim().to_string(),
            model,
        }
    }
}

/// Chat-completions request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

fn preview(text: &str) -> String {
    text.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[async_trait::async_trait]
impl TextGenerationPort for OpenAiAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        if !self.is_configured() {
            return Err(DomainError::MissingCredentials);
        }

        info!(
            model = %self.model,
            payload_len = request.user.len(),
            json_mode = request.json_mode,
            "sending completion request"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %preview(&text), "completion API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                preview(&text)
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| DomainError::Ai("No response choices returned".to_string()))?;

        debug!(raw_len = content.len(), raw = %preview(&content), "received completion");
        Ok(content)
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
