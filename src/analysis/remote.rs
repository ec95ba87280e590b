//! Remote text classification over an OpenAI-compatible chat API.
//!
//! Sends one user message with the classification prompt and reads
//! `choices[0].message.content`. Transport and status failures come back as
//! `RemoteError`; content that is not a verdict comes back as
//! `RemoteParse::Malformed`. The analyzer turns both into a local fallback.

use super::heuristics::detect_language;
use super::lexicon::Language;
use super::parse::{self, RemoteParse};
use super::prompts::{self, DEFAULT_API_URL, DEFAULT_MODEL, MAX_TOKENS, TEMPERATURE};
use crate::error::RemoteError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the remote classifier.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the remote classification API.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl RemoteClassifier {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if config.api_key.trim().is_empty() {
            return Err(RemoteError::MissingApiKey);
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Classify `text` remotely.
    ///
    /// `default_language` only matters when the model omits
    /// recommendations and the text's language cannot be detected.
    pub async fn classify(
        &self,
        text: &str,
        default_language: Language,
    ) -> Result<RemoteParse, RemoteError> {
        let prompt = prompts::build_classify_prompt(text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::info!("[REMOTE] Model: {}", self.config.model);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[REMOTE] API returned {}: {}", status, body);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        log::info!("[REMOTE] API latency: {}ms", start.elapsed().as_millis());

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(RemoteError::MissingContent)?;

        let language = detect_language(text, default_language);
        Ok(parse::parse_verdict(&content, language))
    }

    /// Send a minimal request to check the key and endpoint.
    pub async fn ping(&self) -> Result<(), RemoteError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: "Reply with just: ok",
            }],
            temperature: 0.0,
            max_tokens: 5,
        };
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::info!("[REMOTE] Connection test status: {}", status);
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
