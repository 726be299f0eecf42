//! OpenRouter chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sermondeck_shared::{OpenRouterConfig, Result, SermonDeckError};

use crate::ModelService;

/// Hard client-level timeout. The pipeline applies its own (configurable)
/// per-call deadline on top; this is the absolute backstop.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum characters of body text sent along with a request.
const MAX_BODY_CHARS: usize = 4_000;

const INSIGHT_SYSTEM_PROMPT: &str = "You write one-sentence dashboard insights for a pastor's \
     sermon library. Given a sermon title and optional draft text, reply with a single specific, \
     encouraging observation about the sermon. Reply with the sentence only.";

const CATEGORY_SYSTEM_PROMPT: &str = "You label sermons for a dashboard. Given a sermon title \
     and optional draft text, reply with a single category word such as Theology, Encouragement, \
     Teaching, Outreach, or Worship. Reply with the word only.";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// OpenRouterClient
// ---------------------------------------------------------------------------

/// Production [`ModelService`] backed by the OpenRouter chat-completions API.
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenRouterClient {
    /// Build a client against an explicit endpoint, model, and key.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("SermonDeck/", env!("CARGO_PKG_VERSION")))
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| SermonDeckError::service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from config, resolving the API key from the configured
    /// env var. `model_override` takes precedence over the config default.
    pub fn from_config(config: &OpenRouterConfig, model_override: Option<&str>) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                SermonDeckError::config(format!(
                    "OpenRouter API key not found. Set the {} environment variable.",
                    config.api_key_env
                ))
            })?;

        Self::new(
            &config.base_url,
            model_override.unwrap_or(&config.default_model),
            api_key,
        )
    }

    /// Issue one chat completion and return the assistant's text.
    async fn chat(
        &self,
        system: &str,
        title: &str,
        body: Option<&str>,
        max_tokens: u32,
    ) -> Result<String> {
        let user_content = match body {
            Some(text) => format!("Title: {title}\n\n{}", truncate(text, MAX_BODY_CHARS)),
            None => format!("Title: {title}"),
        };

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: 0.2,
            max_tokens,
        };

        debug!(model = %self.model, title, "sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SermonDeckError::service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SermonDeckError::service(format!(
                "HTTP {status}: {}",
                &body_text[..body_text.len().min(200)]
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SermonDeckError::service(format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SermonDeckError::service("response contained no choices"))?;

        Ok(content)
    }
}

#[async_trait]
impl ModelService for OpenRouterClient {
    async fn generate_insight(&self, title: &str, body: Option<&str>) -> Result<String> {
        self.chat(INSIGHT_SYSTEM_PROMPT, title, body, 120).await
    }

    async fn categorize(&self, title: &str, body: Option<&str>) -> Result<String> {
        self.chat(CATEGORY_SYSTEM_PROMPT, title, body, 16).await
    }
}

/// Truncate text to approximately `max_chars` characters.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        text.to_string()
    } else {
        let end = text
            .char_indices()
            .take_while(|(i, _)| *i <= max_chars)
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0);
        format!("{}\n\n[... draft truncated ...]", &text[..end])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
