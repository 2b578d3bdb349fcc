//! Embedding generation against the Gemini embeddings API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::get_config;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// The HTTP request to the embedding endpoint failed.
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The embedding endpoint answered with a non-success status.
    #[error("embedding endpoint returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the endpoint.
        status: reqwest::StatusCode,
        /// Response body, kept for server-side logs.
        body: String,
    },
    /// The endpoint returned a different number of vectors than texts sent.
    #[error("requested {requested} embeddings, endpoint returned {returned}")]
    CountMismatch {
        /// Number of texts in the batch request.
        requested: usize,
        /// Number of vectors in the response.
        returned: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Client for the Gemini `batchEmbedContents` endpoint.
pub struct GeminiEmbeddingClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl GeminiEmbeddingClient {
    /// Build a client from the process configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self {
            http: reqwest::Client::new(),
            base_url: config.gemini_api_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_embedding_model.clone(),
        }
    }
}

#[async_trait]
impl EmbeddingClient for GeminiEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.model, count = texts.len(), "Generating embeddings");

        let requested = texts.len();
        let body = BatchEmbedRequest {
            requests: texts
                .into_iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model),
                    content: EmbedContent {
                        parts: vec![EmbedPart { text }],
                    },
                })
                .collect(),
        };
        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::UnexpectedStatus { status, body });
        }

        let parsed: BatchEmbedResponse = response.json().await?;
        if parsed.embeddings.len() != requested {
            return Err(EmbeddingClientError::CountMismatch {
                requested,
                returned: parsed.embeddings.len(),
            });
        }
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}

/// Build the embedding client used by the answer pipeline.
pub fn get_embedding_client() -> Box<dyn EmbeddingClient + Send + Sync> {
    Box::new(GeminiEmbeddingClient::from_config())
}
