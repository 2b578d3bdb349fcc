//! Answer service coordinating document retrieval, embedding, and generation.

use crate::{
    config::{AnswerMode, get_config},
    document::DocumentFetcher,
    embedding::{EmbeddingClient, get_embedding_client},
    generation::{GenerationClient, get_generation_client, prompt},
    index::MemoryIndex,
    metrics::{MetricsSnapshot, ServiceMetrics},
    processing::{
        chunking::chunk_text,
        types::{AnswerError, AnswerOutcome, AskParams},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Coordinates the full answer pipeline: document acquisition, chunking,
/// embedding, retrieval, and generation.
///
/// The service owns long-lived handles to the HTTP fetcher and the two Gemini
/// clients plus the metrics registry. Construct it once near process start and
/// share it through an `Arc`; everything built per request (temp file, chunk
/// list, similarity index) lives and dies inside one call.
pub struct AnswerService {
    fetcher: DocumentFetcher,
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    generation_client: Box<dyn GenerationClient + Send + Sync>,
    metrics: Arc<ServiceMetrics>,
}

/// Abstraction over the answer pipeline used by the HTTP surface.
#[async_trait]
pub trait AnswerApi: Send + Sync {
    /// Answer one question, optionally grounded in a referenced document.
    async fn answer_question(&self, params: AskParams) -> Result<AnswerOutcome, AnswerError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AnswerService {
    /// Build a new answer service from the process configuration.
    pub fn new() -> Self {
        tracing::info!("Initializing Gemini clients");
        Self {
            fetcher: DocumentFetcher::new(),
            embedding_client: get_embedding_client(),
            generation_client: get_generation_client(),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Answer one question using the mode the process was started in.
    pub async fn answer_question(
        &self,
        params: AskParams,
    ) -> Result<AnswerOutcome, AnswerError> {
        match get_config().answer_mode {
            AnswerMode::Retrieval => self.answer_with_retrieval(params).await,
            AnswerMode::Direct => self.answer_direct(params).await,
        }
    }

    /// Full pipeline: fetch, extract, chunk, embed, retrieve, generate.
    async fn answer_with_retrieval(
        &self,
        params: AskParams,
    ) -> Result<AnswerOutcome, AnswerError> {
        let AskParams {
            question,
            file_url,
            file_path,
            contract_id,
        } = params;

        if let Some(path) = file_path.as_deref() {
            // Server-side paths are not readable from this process; retrieval
            // grounds itself in URLs only.
            tracing::debug!(path, "Ignoring file_path in retrieval mode");
        }

        let context = match file_url.as_deref() {
            Some(url) => {
                self.retrieve_context(url, contract_id.as_deref(), &question)
                    .await?
            }
            None => Vec::new(),
        };

        let context_refs: Vec<&str> = context.iter().map(String::as_str).collect();
        let answer = self
            .generation_client
            .generate_answer(prompt::grounded_prompt(&question, &context_refs))
            .await?;

        self.metrics.record_answer(context.len() as u64);
        tracing::info!(
            mode = "retrieval",
            context_chunks = context.len(),
            "Question answered"
        );

        Ok(AnswerOutcome {
            answer,
            mode: AnswerMode::Retrieval,
            context_chunks: context.len(),
        })
    }

    /// Degenerate variant: the question goes straight to the model with at
    /// most a bare mention of the file reference.
    async fn answer_direct(&self, params: AskParams) -> Result<AnswerOutcome, AnswerError> {
        let AskParams {
            question,
            file_url,
            file_path,
            ..
        } = params;

        let reference = file_url.or(file_path);
        let answer = self
            .generation_client
            .generate_answer(prompt::direct_prompt(&question, reference.as_deref()))
            .await?;

        self.metrics.record_answer(0);
        tracing::info!(mode = "direct", "Question answered");

        Ok(AnswerOutcome {
            answer,
            mode: AnswerMode::Direct,
            context_chunks: 0,
        })
    }

    /// Fetch the document and return the top-ranked chunks for the question.
    ///
    /// The temp file holding the download is dropped before embedding begins,
    /// so it is gone whether or not the later steps succeed.
    async fn retrieve_context(
        &self,
        url: &str,
        contract_id: Option<&str>,
        question: &str,
    ) -> Result<Vec<String>, AnswerError> {
        let config = get_config();

        let document = self.fetcher.fetch_pdf(url, contract_id).await?;
        self.metrics.record_document_fetch();
        tracing::debug!(
            bytes = document.bytes(),
            fingerprint = %document.fingerprint(),
            "Document fetched"
        );
        let text = document.extract_text().await?;
        drop(document);

        let chunks = chunk_text(
            &text,
            config.text_splitter_chunk_size,
            config.text_splitter_chunk_overlap,
        )?;
        if chunks.is_empty() {
            tracing::warn!(url, "Document produced no chunks; answering without context");
            return Ok(Vec::new());
        }
        tracing::debug!(chunks = chunks.len(), "Document chunked");

        let embeddings = self
            .embedding_client
            .generate_embeddings(chunks.clone())
            .await?;
        let index = MemoryIndex::from_parts(chunks, embeddings)?;

        let mut query_vectors = self
            .embedding_client
            .generate_embeddings(vec![question.to_string()])
            .await?;
        let query = query_vectors.pop().ok_or(AnswerError::EmptyQueryEmbedding)?;

        let hits = index.top_k(&query, config.retriever_top_k)?;
        Ok(hits.into_iter().map(|hit| hit.text.to_string()).collect())
    }

    /// Return the current answer metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for AnswerService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerApi for AnswerService {
    async fn answer_question(&self, params: AskParams) -> Result<AnswerOutcome, AnswerError> {
        AnswerService::answer_question(self, params).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        AnswerService::metrics_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG, Config, DEFAULT_API_BASE_URL};
    use crate::embedding::EmbeddingClientError;
    use crate::generation::GenerationClientError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn init_test_config() {
        CONFIG.get_or_init(|| Config {
            gemini_api_key: "test-key".to_string(),
            gemini_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            gemini_generation_model: "gemini-pro".to_string(),
            gemini_embedding_model: "embedding-001".to_string(),
            answer_mode: AnswerMode::Retrieval,
            text_splitter_chunk_size: 40,
            text_splitter_chunk_overlap: 10,
            retriever_top_k: 2,
            server_port: 0,
        });
    }

    struct StubGeneration {
        prompts: Arc<Mutex<Vec<String>>>,
        answer: &'static str,
    }

    #[async_trait]
    impl GenerationClient for StubGeneration {
        async fn generate_answer(&self, prompt: String) -> Result<String, GenerationClientError> {
            self.prompts.lock().unwrap().push(prompt);
            Ok(self.answer.to_string())
        }
    }

    struct CountingEmbedding {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EmbeddingClient for CountingEmbedding {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn service_with_stubs(
        prompts: Arc<Mutex<Vec<String>>>,
        embed_calls: Arc<AtomicUsize>,
    ) -> AnswerService {
        AnswerService {
            fetcher: DocumentFetcher::new(),
            embedding_client: Box::new(CountingEmbedding { calls: embed_calls }),
            generation_client: Box::new(StubGeneration {
                prompts,
                answer: "The deposit is two months' rent.",
            }),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    fn params(question: &str) -> AskParams {
        AskParams {
            question: question.to_string(),
            file_url: None,
            file_path: None,
            contract_id: None,
        }
    }

    #[tokio::test]
    async fn retrieval_without_file_uses_context_free_prompt() {
        init_test_config();
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let embed_calls = Arc::new(AtomicUsize::new(0));
        let service = service_with_stubs(prompts.clone(), embed_calls.clone());

        let outcome = service
            .answer_question(params("What is the notice period?"))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "The deposit is two months' rent.");
        assert_eq!(outcome.mode, AnswerMode::Retrieval);
        assert_eq!(outcome.context_chunks, 0);
        assert_eq!(embed_calls.load(Ordering::SeqCst), 0);

        let recorded = prompts.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].starts_with("Use the following pieces of context"));
        assert!(recorded[0].contains("What is the notice period?"));
    }

    #[tokio::test]
    async fn direct_mode_mentions_file_without_fetching() {
        init_test_config();
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let embed_calls = Arc::new(AtomicUsize::new(0));
        let service = service_with_stubs(prompts.clone(), embed_calls.clone());

        let outcome = service
            .answer_direct(AskParams {
                question: "Summarize the lease.".to_string(),
                file_url: None,
                file_path: Some("contracts/lease-42.pdf".to_string()),
                contract_id: Some("lease-42".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(outcome.mode, AnswerMode::Direct);
        assert_eq!(outcome.context_chunks, 0);
        assert_eq!(embed_calls.load(Ordering::SeqCst), 0);

        let recorded = prompts.lock().unwrap();
        assert!(recorded[0].contains("contracts/lease-42.pdf"));
        assert!(!recorded[0].contains("Use the following pieces of context"));
    }

    #[tokio::test]
    async fn successful_answers_are_counted() {
        init_test_config();
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let embed_calls = Arc::new(AtomicUsize::new(0));
        let service = service_with_stubs(prompts, embed_calls);

        service.answer_question(params("First?")).await.unwrap();
        service.answer_question(params("Second?")).await.unwrap();

        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.questions_answered, 2);
        assert_eq!(snapshot.documents_fetched, 0);
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        init_test_config();

        struct FailingGeneration;

        #[async_trait]
        impl GenerationClient for FailingGeneration {
            async fn generate_answer(
                &self,
                _prompt: String,
            ) -> Result<String, GenerationClientError> {
                Err(GenerationClientError::GenerationFailed("boom".to_string()))
            }
        }

        let service = AnswerService {
            fetcher: DocumentFetcher::new(),
            embedding_client: Box::new(CountingEmbedding {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            generation_client: Box::new(FailingGeneration),
            metrics: Arc::new(ServiceMetrics::new()),
        };

        let error = service.answer_question(params("Oops?")).await.unwrap_err();
        assert!(matches!(error, AnswerError::Generation(_)));
        assert_eq!(service.metrics_snapshot().questions_answered, 0);
    }
}
