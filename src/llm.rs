//! # Generative-Language Backend Module
//!
//! ## Purpose
//! Client for the generative-language backend used by information extraction
//! and field summarization. The backend sits behind the `LlmBackend` trait so
//! tests can substitute deterministic stubs and never call a live service.
//!
//! ## Input/Output Specification
//! - **Input**: A complete prompt string
//! - **Output**: The model's response text
//! - **Failure**: Non-success HTTP status, empty candidates, or timeout
//!
//! ## Key Features
//! - Gemini `generateContent` REST endpoint over reqwest
//! - Explicit per-request timeout; no call may hang indefinitely
//! - API key supplied via request header, never logged

use crate::config::LlmConfig;
use crate::errors::{ProcessError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// A generative-language backend that turns a prompt into response text.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Client for the Google Generative Language API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Build a client from validated configuration. Fails if the API key is
    /// absent, so no request can be attempted without a credential.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProcessError::Config {
                message: "GOOGLE_API_KEY not found in environment variables".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_seconds: config.request_timeout_seconds,
        })
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProcessError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else {
                    ProcessError::Backend {
                        details: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProcessError::Backend {
                details: format!("HTTP {}: {}", status, truncate_detail(&detail)),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProcessError::Backend {
                details: "response contained no candidates".to_string(),
            });
        }

        Ok(text)
    }
}

fn truncate_detail(detail: &str) -> &str {
    let mut end = detail.len().min(200);
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    &detail[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn base_config() -> LlmConfig {
        LlmConfig {
            api_key: Some("key".to_string()),
            model: "gemini-pro".to_string(),
            endpoint: "https://example.invalid/v1beta/".to_string(),
            request_timeout_seconds: 5,
            max_input_chars: 1000,
        }
    }

    #[test]
    fn missing_key_is_rejected_at_construction() {
        let mut config = base_config();
        config.api_key = None;
        assert!(GeminiClient::new(&config).is_err());

        config.api_key = Some("  ".to_string());
        assert!(GeminiClient::new(&config).is_err());
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = GeminiClient::new(&base_config()).unwrap();
        assert_eq!(client.endpoint, "https://example.invalid/v1beta");
    }
}
