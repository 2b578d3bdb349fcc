//! HTTP surface for the contract answering service.
//!
//! A compact Axum router with a single endpoint:
//!
//! - `POST /ask` – Answer a question, optionally grounded in a referenced
//!   contract PDF (`file_url`). Returns `{ "answer": string }` on success,
//!   `400 {"error": "Question is required"}` when the question is absent or
//!   blank, and an opaque `500 {"error": "Internal Server Error"}` for every
//!   pipeline failure; causes stay in the server logs.
//!
//! Nothing survives a request: the handler owns no state beyond the shared
//! [`AnswerApi`] service handle.

use crate::processing::{AnswerApi, AskParams};
use crate::session::token_from_cookie_header;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Build the HTTP router exposing the answering surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AnswerApi + 'static,
{
    Router::new()
        .route("/ask", post(ask::<S>))
        .with_state(service)
}

/// Request body for the `POST /ask` endpoint.
#[derive(Deserialize)]
struct AskRequest {
    /// The user's question; absence is validated by the handler, not serde.
    #[serde(default)]
    question: Option<String>,
    /// Optional URL of the contract PDF to ground the answer in.
    #[serde(default)]
    file_url: Option<String>,
    /// Optional server-side path mention (no content is ever read from it).
    #[serde(default)]
    file_path: Option<String>,
    /// Optional contract identifier carried into logs and temp-file names.
    #[serde(default)]
    contract_id: Option<String>,
}

/// Success response for the `POST /ask` endpoint.
#[derive(Serialize)]
struct AskResponse {
    /// The model's answer text.
    answer: String,
}

/// Answer a question, optionally grounded in a referenced contract.
async fn ask<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError>
where
    S: AnswerApi,
{
    let question = request
        .question
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(AppError::QuestionRequired)?;

    // Only the presence of a session is recorded; the token itself never
    // reaches the logs.
    let session_token = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header);

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "ask",
        request_id = %request_id,
        contract_id = request.contract_id.as_deref().unwrap_or("-"),
        session = session_token.is_some(),
    );

    let params = AskParams {
        question,
        file_url: request.file_url,
        file_path: request.file_path,
        contract_id: request.contract_id,
    };

    async move {
        let outcome = service.answer_question(params).await.map_err(|error| {
            tracing::error!(error = %error, "Ask request failed");
            AppError::Internal
        })?;
        tracing::debug!(
            mode = ?outcome.mode,
            context_chunks = outcome.context_chunks,
            metrics = ?service.metrics_snapshot(),
            "Ask request completed"
        );
        Ok(Json(AskResponse {
            answer: outcome.answer,
        }))
    }
    .instrument(span)
    .await
}

enum AppError {
    /// Request carried no usable question.
    QuestionRequired,
    /// Any pipeline failure; collapsed to an opaque 500. The cause is logged
    /// inside the request span, never returned.
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::QuestionRequired => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Question is required" })),
            )
                .into_response(),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response(),
        }
    }
}
