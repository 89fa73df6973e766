/// Inference Gateway Client — the single point of entry for generative AI
/// calls.
///
/// ARCHITECTURAL RULE: no other module may call the inference service
/// directly. All AI interactions go through the [`InferenceGateway`] trait,
/// which the pipeline consumes as a trait object so tests can script replies.
///
/// Exactly one attempt per call. Rate-limit and quota signals are surfaced to
/// the caller verbatim; retrying is the caller's decision, never ours.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service rate limit exceeded")]
    RateLimited,

    #[error("inference service quota exhausted")]
    QuotaExceeded,

    #[error("inference service failure: {0}")]
    Upstream(String),
}

impl From<InferenceError> for AppError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::RateLimited => AppError::RateLimited,
            InferenceError::QuotaExceeded => AppError::QuotaExceeded,
            InferenceError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Sends `prompt` and returns the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Gemini `generateContent` client with a bounded request timeout.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl InferenceGateway for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{GEMINI_API_URL}/{}:generateContent", self.model);
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(format!("inference request failed: {e}")))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Upstream(format!("malformed inference response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| {
                InferenceError::Upstream("inference service returned no content".to_string())
            })?;

        debug!(response_chars = text.len(), "inference call succeeded");
        Ok(text)
    }
}

/// Maps a non-success status and error body onto the three failure classes
/// the pipeline distinguishes. Quota/billing exhaustion wins over the plain
/// rate-limit signal because the service reports both under 429.
fn classify_failure(status: u16, body: &str) -> InferenceError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    let lowered = message.to_lowercase();
    if lowered.contains("quota") || lowered.contains("billing") {
        return InferenceError::QuotaExceeded;
    }
    if status == 429 {
        return InferenceError::RateLimited;
    }
    InferenceError::Upstream(format!("inference service returned {status}: {message}"))
}
