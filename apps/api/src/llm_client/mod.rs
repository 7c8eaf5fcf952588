/// LLM Client: the single point of entry for all chat-completion calls in HirePrep.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Generation code depends on the `CompletionBackend` trait, which `LlmClient` implements.
///
/// Model: gpt-4o (hardcoded, not configurable)
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub mod prompts;
pub mod sse;

use sse::SseAccumulator;

/// The model used for all LLM calls in HirePrep.
pub const MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Error event sent inside an otherwise successful stream.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One system + user exchange that must be answered with a JSON object.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
}

/// Anything that can answer a `CompletionRequest` with the raw model text.
///
/// Carried in `AppState` as `Arc<dyn CompletionBackend>`; tests substitute scripted backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client. No retries: every failure is reported once to the caller.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    stream: bool,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        stream: bool,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            stream,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<reqwest::Response, LlmError> {
        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            stream: self.stream,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn read_single(response: reqwest::Response) -> Result<String, LlmError> {
        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn read_stream(response: reqwest::Response) -> Result<String, LlmError> {
        let mut body = response.bytes_stream();
        let mut accumulator = SseAccumulator::new();
        while let Some(chunk) = body.next().await {
            if accumulator.push(&chunk?)? {
                break;
            }
        }
        accumulator.finish()
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let started = Instant::now();
        let response = self.send(&request).await?;

        let content = if self.stream {
            Self::read_stream(response).await?
        } else {
            Self::read_single(response).await?
        };

        info!(
            "LLM call completed: model={}, stream={}, {} bytes in {}ms",
            MODEL,
            self.stream,
            content.len(),
            started.elapsed().as_millis()
        );

        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(content)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
