#![deny(missing_docs)]

//! Core library for the contract question-answering service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document download and PDF text extraction.
pub mod document;
/// Embedding client abstraction and the Gemini adapter.
pub mod embedding;
/// Generation client and prompt templates.
pub mod generation;
/// Ephemeral in-memory similarity index.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Answer metrics helpers.
pub mod metrics;
/// Answer pipeline orchestration.
pub mod processing;
/// Session token extraction from browser cookies.
pub mod session;
