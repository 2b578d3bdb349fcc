//! Answer pipeline: document acquisition, chunking, retrieval, and generation.

pub mod chunking;
mod service;
pub mod types;

pub use service::{AnswerApi, AnswerService};
pub use types::{AnswerError, AnswerOutcome, AskParams, ChunkingError};
