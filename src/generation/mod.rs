//! Answer generation via the Gemini `generateContent` API.
//!
//! The client mirrors the embedding adapter by issuing HTTP requests directly
//! to the hosted endpoint; prompt templates for both answer modes live in
//! [`prompt`].

pub mod prompt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::get_config;

/// Errors surfaced while generating an answer.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Model endpoint could not be reached.
    #[error("Generation endpoint unreachable: {0}")]
    EndpointUnreachable(String),
    /// Model endpoint returned an error response.
    #[error("Failed to generate answer: {0}")]
    GenerationFailed(String),
    /// Model response could not be parsed or carried no usable candidate.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by answer-generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run the prompt through the configured model and return its text reply.
    async fn generate_answer(&self, prompt: String) -> Result<String, GenerationClientError>;
}

/// Build the generation client used by the answer pipeline.
pub fn get_generation_client() -> Box<dyn GenerationClient + Send + Sync> {
    let config = get_config();
    Box::new(GeminiGenerationClient::new(
        config.gemini_api_base_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_generation_model.clone(),
    ))
}

struct GeminiGenerationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGenerationClient {
    fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("contract-qa/answer")
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
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
    #[serde(default)]
    text: String,
}

#[async_trait]
impl GenerationClient for GeminiGenerationClient {
    async fn generate_answer(&self, prompt: String) -> Result<String, GenerationClientError> {
        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                // Low temperature keeps answers close to the supplied context.
                "temperature": 0.2,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::EndpointUnreachable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationClientError::InvalidResponse("no candidates".into()))?;
        let answer: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(GenerationClientError::InvalidResponse(
                "candidate carried no text".into(),
            ));
        }
        Ok(answer)
    }
}
