use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing answering activity.
///
/// Counters are process-wide running totals; nothing about an individual
/// request is retained (each request's document, chunks, and index are
/// discarded when the request ends).
#[derive(Default)]
pub struct ServiceMetrics {
    questions_answered: AtomicU64,
    documents_fetched: AtomicU64,
    chunks_indexed: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully answered question and the number of context
    /// chunks that went into its ephemeral index.
    pub fn record_answer(&self, context_chunks: u64) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed
            .fetch_add(context_chunks, Ordering::Relaxed);
    }

    /// Record one completed document fetch.
    pub fn record_document_fetch(&self) {
        self.documents_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            documents_fetched: self.documents_fetched.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of answering counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Questions answered successfully since startup.
    pub questions_answered: u64,
    /// Documents fetched from their file references since startup.
    pub documents_fetched: u64,
    /// Total chunk count indexed across all answered questions.
    pub chunks_indexed: u64,
}
