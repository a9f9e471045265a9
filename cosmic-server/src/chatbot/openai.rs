//! Chat-completion client (OpenAI wire format)

use async_trait::async_trait;
use cosmic_common::config::OpenAiConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat client setup failed: {0}")]
    Setup(String),

    #[error("Chat request failed: {0}")]
    Network(String),

    #[error("Chat API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Chat API returned no reply")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Produces the assistant reply for a conversation
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| ChatError::Setup(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("cosmic-server/", env!("CARGO_PKG_VERSION"))),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Setup(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &OpenAiConfig) -> Result<Option<Self>, ChatError> {
        match &config.api_key {
            Some(key) => Self::new(key, config.model.clone(), DEFAULT_BASE_URL).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, messages = messages.len(), "Requesting chat completion");

        let response = self
            .http_client
            .post(&url)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ChatError::EmptyReply)
    }
}
