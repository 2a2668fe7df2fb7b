//! OpenAI-compatible completion client
//!
//! Single-attempt, non-streaming chat completion with a bounded timeout.
//! `synthesize` never returns an error: every failure kind, from a missing
//! credential to a malformed response envelope, is collapsed into an
//! `"Error: …"` answer string so the transport layer has exactly one
//! response path.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult};

/// System directive sent ahead of every composed prompt.
pub const SYSTEM_DIRECTIVE: &str =
    "You answer questions about provided data. Respond with a single value only.";

/// Upper bound on the upstream body excerpt embedded in error answers.
const ERROR_BODY_EXCERPT_CHARS: usize = 200;

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    config: LLMConfig,
}

// Request types for the chat completions API
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// Response types for the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl CompletionClient {
    pub fn new(config: LLMConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Sends the prompt to the completion service and returns the answer
    /// string. Infallible by contract: all failure paths produce a
    /// descriptive `"Error: …"` value instead of propagating.
    pub async fn synthesize(&self, prompt: &str) -> String {
        let Some(token) = self.config.api_key.as_deref() else {
            return "Error: LLM credentials not configured".to_string();
        };

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_DIRECTIVE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        };

        let response = match self
            .client
            .post(self.chat_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.config.timeout_secs, "completion request timed out");
                return "Error: request to completion service timed out".to_string();
            }
            Err(e) if e.is_connect() => {
                warn!(error = %e, "could not connect to completion service");
                return format!("Error: could not connect to completion service: {e}");
            }
            Err(e) => return format!("Error: completion request failed: {e}"),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return format!(
                "Error: completion service returned {status}: {}",
                excerpt(&body)
            );
        }

        let body: ChatResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return format!("Error: unexpected response format from completion service: {e}")
            }
        };

        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "completion usage"
            );
        }

        match body.choices.first() {
            Some(choice) => clean_answer(&choice.message.content),
            None => "Error: completion response contained no choices".to_string(),
        }
    }

    /// Lightweight connectivity check against the capability-listing
    /// endpoint. Diagnostic only; the answer pipeline never calls this.
    pub async fn list_models(&self) -> AppResult<()> {
        let token = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::LLMApi("credentials not configured".to_string()))?;

        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("connectivity check failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::LLMApi(format!(
                "completion service returned {status}"
            )));
        }
        Ok(())
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect()
}

/// Strips surrounding whitespace and any wrapping quote characters so the
/// caller receives a bare scalar value.
fn clean_answer(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
