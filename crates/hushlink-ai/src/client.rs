use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Error bodies beyond this are cut before they reach logs.
const MAX_ERROR_BODY_CHARS: usize = 2048;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// A harm category the provider's own filter should leave alone.
#[derive(Debug, Clone, Copy)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

/// Thin client for Gemini `generateContent` with a JSON response schema.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ModelConfig,
}

// -- Response shape (only the fields we read) --

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send `prompt` and decode the first candidate as `T`.
    ///
    /// `Ok(None)` means the provider answered but produced nothing usable:
    /// no candidate, no text, or text that does not match `T`.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        prompt: &str,
        response_schema: Value,
        safety_settings: &[SafetySetting],
    ) -> Result<Option<T>, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema
            }
        });
        if !safety_settings.is_empty() {
            body["safetySettings"] = safety_settings
                .iter()
                .map(|s| json!({ "category": s.category, "threshold": s.threshold }))
                .collect();
        }

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY_CHARS {
                let mut cut = MAX_ERROR_BODY_CHARS;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
                text.push_str("...(truncated)");
            }
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let Some(text) = first_candidate_text(parsed) else {
            debug!("Model {} returned no candidate text", self.config.model);
            return Ok(None);
        };

        match serde_json::from_str::<T>(strip_code_fence(&text)) {
            Ok(out) => Ok(Some(out)),
            Err(e) => {
                warn!("Model {} output did not match schema: {}", self.config.model, e);
                Ok(None)
            }
        }
    }
}

fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
