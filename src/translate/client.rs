use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TranslateError;
use crate::settings::Settings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const SYSTEM_PROMPT: &str =
    "You produce strict JSON. Reply with one JSON object only: no markdown fences, no commentary.";

/// A text-completion backend. One prompt in, raw model text out.
pub trait Completion: Send + Sync {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, TranslateError>> + Send;
}

/// OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, TranslateError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TranslateError::MissingApiKey)?;

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(ChatClient {
            http,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_completion_tokens: settings.max_completion_tokens,
        })
    }
}

impl Completion for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, TranslateError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
            max_completion_tokens: self.max_completion_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(TranslateError::EmptyResponse)?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}
