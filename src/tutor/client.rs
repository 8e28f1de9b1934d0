//! Blocking client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{ChatMessage, Provider};

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("Authentication failed (check your API key)")]
    AuthFailed,

    #[error("Rate limited by the provider, try again shortly")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Could not parse model output: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TutorError>;

/// Sampling settings for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

/// Anything that can turn a conversation into the assistant's reply
pub trait ChatClient {
    fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for OpenAI and Grok (xAI), which share the chat completions API
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// Build a client for `provider`, reading the key from its environment variable
    pub fn from_env(
        provider: Provider,
        base_url: Option<&str>,
        model: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = std::env::var(provider.api_key_env())
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TutorError::MissingApiKey(provider.api_key_env()))?;

        Self::new(
            base_url.unwrap_or(provider.default_base_url()),
            api_key,
            model.unwrap_or(provider.default_model()).to_string(),
            timeout,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatClient for OpenAiClient {
    fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        log::debug!("POST {} ({} messages, model {})", self.url(), messages.len(), self.model);
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(TutorError::AuthFailed),
            StatusCode::TOO_MANY_REQUESTS => return Err(TutorError::RateLimited),
            status if !status.is_success() => {
                let text = response.text().unwrap_or_default();
                return Err(TutorError::Api {
                    status: status.as_u16(),
                    message: api_error_message(&text),
                });
            }
            _ => {}
        }

        let parsed: CompletionResponse = response.json()?;
        first_choice_content(parsed)
    }
}

fn first_choice_content(response: CompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(TutorError::EmptyResponse)
}

/// Pull the human-readable message out of an error body, if it has one
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect())
}
