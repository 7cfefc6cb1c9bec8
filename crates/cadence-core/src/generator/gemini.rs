//! Gemini-backed text generator using the Generative Language REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::prompt;
use super::retry::with_retry;
use super::trait_def::TextGenerator;
use super::types::{GeneratedComment, GeneratedPost};
use crate::config::RetryPolicy;
use crate::error::GenerationError;
use crate::models::{CommentPlan, Company, Post, PostPlan};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Generator that prompts a Gemini model over HTTP.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    sampling: SamplingConfig,
    retry: RetryPolicy,
}

impl GeminiGenerator {
    /// Build a generator for `model`. Fails when the key is blank.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(GenerationError::NotConfigured("Gemini API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::NotConfigured(format!("http client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sampling: SamplingConfig::default(),
            retry,
        })
    }

    /// Point the generator at a different API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.sampling.temperature,
                "topK": self.sampling.top_k,
                "topP": self.sampling.top_p,
                "maxOutputTokens": self.sampling.max_output_tokens,
            }
        })
    }

    /// One request, no retries.
    async fn complete_once(&self, prompt: &str) -> Result<String, GenerationError> {
        let resp = self
            .client
            .post(self.url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        extract_text(parsed)
    }

    async fn complete(&self, label: &str, prompt: &str) -> Result<String, GenerationError> {
        with_retry(&self.retry, label, || self.complete_once(prompt)).await
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_post(
        &self,
        plan: &PostPlan,
        company: &Company,
    ) -> Result<GeneratedPost, GenerationError> {
        let text = self
            .complete(&plan.post_id, &prompt::post_prompt(plan, company))
            .await?;
        Ok(prompt::parse_post(&text))
    }

    async fn generate_comment(
        &self,
        plan: &CommentPlan,
        post: &Post,
        company: &Company,
    ) -> Result<GeneratedComment, GenerationError> {
        let text = self
            .complete(&plan.comment_id, &prompt::comment_prompt(plan, post, company))
            .await?;
        Ok(prompt::parse_comment(&text))
    }
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(resp: GenerateResponse) -> Result<String, GenerationError> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::InvalidResponse(
            "response contained no text".into(),
        ));
    }
    Ok(text)
}
