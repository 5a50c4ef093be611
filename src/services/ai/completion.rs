//! Completion capability and its chat-completions HTTP client.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bases::CompletionSettings;

/// Text-in, text-out generation service.
///
/// Output is untrusted: callers validate whatever comes back.
pub trait CompletionClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompletion {
    settings: CompletionSettings,
    api_key: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompletion {
    /// Builds a client, reading the API key from `settings.api_key_env`.
    pub fn from_env(settings: CompletionSettings) -> Result<Self> {
        let api_key = env::var(&settings.api_key_env)
            .with_context(|| format!("{} is not set", settings.api_key_env))?;
        Self::new(settings, api_key)
    }

    pub fn new(settings: CompletionSettings, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            bail!("completion API key is empty");
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build completion HTTP client")?;
        Ok(Self {
            settings,
            api_key,
            client,
        })
    }
}

impl CompletionClient for OpenAiCompletion {
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.settings.model, "Calling completion endpoint");
        let request = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .context("Completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Completion request failed with status {status}: {body}");
        }

        let parsed: ChatResponse = response
            .json()
            .context("Failed to decode completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Empty response from completion endpoint"))
    }
}
