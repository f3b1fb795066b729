// OpenAI-compatible chat completions client (OpenAI, Groq, any /v1/chat/completions host)

use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Non-success HTTP status returned by a completion endpoint.
///
/// Travels inside `anyhow::Error`; callers that need to tell a rejected
/// request from a transport failure can `downcast_ref::<ApiStatusError>()`.
#[derive(Debug, thiserror::Error)]
#[error("API error ({status}): {body}")]
pub struct ApiStatusError {
    pub status: StatusCode,
    pub body: String,
}

/// OpenAI-compatible client (HTTP direct, no SDK)
#[derive(Debug)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl OpenAIClient {
    /// Create new client for a full chat-completions endpoint URL
    pub fn new(endpoint: impl Into<String>, api_key: impl AsRef<str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.as_ref()))
                .context("Invalid API key format")?,
        );
        
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;
        
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

/// Request body. Messages already serialize in wire shape, image parts
/// included.
#[derive(Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(flatten)]
    options: &'a ChatOptions,
}

impl<'a> ChatPayload<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            options: &request.options,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ChatPayload::from_request(&request))
            .send()
            .await
            .context("Failed to send request")?;
        
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiStatusError { status, body }.into());
        }
        
        let raw: Value = response
            .json()
            .await
            .context("Failed to parse response")?;
        let completion: Completion = serde_json::from_value(raw.clone())
            .context("Unexpected completion response shape")?;
        
        let choice = completion.choices.into_iter().next();
        Ok(ChatResponse {
            content: choice.as_ref().and_then(|c| c.message.content.clone()),
            usage: completion.usage,
            finish_reason: choice.and_then(|c| c.finish_reason),
            raw,
        })
    }
}

// Only what the client reads; everything else stays in `raw`.
#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
