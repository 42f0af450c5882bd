//! Minimal OpenAI-compatible client used as the generation backend.
//!
//! We only call chat.completions with the composed prompt as a single user
//! message and return the plain text reply. Calls are instrumented and log the
//! model name, latency and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Settings;
use crate::error::GenerationError;
use crate::generation::Generator;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
}

impl OpenAI {
  /// Construct the client if an API key is configured; otherwise return None.
  pub fn from_settings(settings: &Settings) -> Option<Self> {
    let api_key = settings.api_key.clone()?;

    let client = match reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
    {
      Ok(c) => c,
      Err(e) => {
        error!(target: "tutor_backend", error = %e, "Failed to build HTTP client for the generation backend");
        return None;
      }
    };

    Some(Self {
      client,
      api_key,
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      model: settings.model.clone(),
      temperature: 0.7,
    })
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn chat_plain(&self, prompt: &str) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![ChatMessageReq { role: "user".into(), content: prompt.into() }],
      temperature: self.temperature,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "physics-tutor-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(GenerationError::Http { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse =
      res.json().await.map_err(|e| GenerationError::Decode(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = first_choice_text(body)?;
    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Model response received");
    Ok(text)
  }
}

#[async_trait]
impl Generator for OpenAI {
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
    self.chat_plain(prompt).await
  }

  fn name(&self) -> &str {
    &self.model
  }
}

fn first_choice_text(body: ChatCompletionResponse) -> Result<String, GenerationError> {
  let text = body.choices.into_iter().next()
    .and_then(|c| c.message.content)
    .unwrap_or_default()
    .trim()
    .to_string();
  if text.is_empty() { Err(GenerationError::Empty) } else { Ok(text) }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
