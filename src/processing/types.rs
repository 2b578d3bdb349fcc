//! Core data types and error definitions for the answer pipeline.

use crate::config::AnswerMode;
use crate::document::DocumentError;
use crate::embedding::EmbeddingClientError;
use crate::generation::GenerationClientError;
use crate::index::IndexError;
use thiserror::Error;

/// Errors produced while splitting extracted text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Splitter configured with a zero-character window.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave the window a positive stride.
    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidOverlap {
        /// Configured overlap in characters.
        overlap: usize,
        /// Configured window size in characters.
        chunk_size: usize,
    },
}

/// Errors emitted by the question-answering pipeline.
///
/// The HTTP layer collapses every variant into an opaque 500; the variants
/// exist for server-side logs and for tests.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Document could not be fetched or its text extracted.
    #[error("Failed to acquire document: {0}")]
    Document(#[from] DocumentError),
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned no vector for the question.
    #[error("Embedding provider returned no vector for the question")]
    EmptyQueryEmbedding,
    /// Similarity index rejected the chunk/vector pairing.
    #[error("Failed to build similarity index: {0}")]
    Index(#[from] IndexError),
    /// Generation backend failed to produce an answer.
    #[error("Failed to generate answer: {0}")]
    Generation(#[from] GenerationClientError),
}

/// Parameters supplied to the answer pipeline for one request.
#[derive(Debug, Clone)]
pub struct AskParams {
    /// The user's question, already validated as non-blank by the handler.
    pub question: String,
    /// Optional URL of the contract PDF to ground the answer in.
    pub file_url: Option<String>,
    /// Optional server-side path mention carried by legacy clients.
    pub file_path: Option<String>,
    /// Optional contract identifier used for temp-file naming and logs.
    pub contract_id: Option<String>,
}

/// Summary of a completed answer produced by [`crate::processing::AnswerService`].
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// The model's answer text.
    pub answer: String,
    /// Pipeline variant that produced the answer.
    pub mode: AnswerMode,
    /// Number of context chunks stuffed into the prompt.
    pub context_chunks: usize,
}
