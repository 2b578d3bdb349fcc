//! Document acquisition: download, temporary storage, and text extraction.
//!
//! A fetched contract lives in a [`tempfile::NamedTempFile`] for the duration
//! of one request. Dropping the handle removes the file, so every exit path
//! out of the answer pipeline, including errors, leaves no file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised while downloading or extracting a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The HTTP request to the document URL failed outright.
    #[error("document download failed: {0}")]
    Download(#[from] reqwest::Error),
    /// The document host answered with a non-success status.
    #[error("document host returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the document host.
        status: reqwest::StatusCode,
        /// Response body, kept for server-side logs.
        body: String,
    },
    /// Writing the download to the temporary file failed.
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF parser could not pull text out of the file.
    #[error("text extraction failed: {0}")]
    Extraction(String),
    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    ExtractionTask(#[from] tokio::task::JoinError),
}

/// A downloaded document held in a temporary file.
///
/// The file is deleted when this value drops.
#[derive(Debug)]
pub struct FetchedDocument {
    file: NamedTempFile,
    bytes: usize,
    fingerprint: String,
}

impl FetchedDocument {
    /// Path of the temporary file on disk.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the downloaded document in bytes.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// SHA-256 of the document contents, hex encoded. Logged instead of the
    /// document itself.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Extract the document's text on a blocking thread.
    ///
    /// PDF parsing is CPU-bound, so it runs under
    /// [`tokio::task::spawn_blocking`] rather than on the request task.
    pub async fn extract_text(&self) -> Result<String, DocumentError> {
        let path: PathBuf = self.file.path().to_path_buf();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text(&path).map_err(|e| DocumentError::Extraction(e.to_string()))
        })
        .await??;
        Ok(text)
    }
}

/// Downloads contract documents over HTTP into temporary files.
pub struct DocumentFetcher {
    pub(crate) http: reqwest::Client,
}

impl DocumentFetcher {
    /// Create a fetcher with a fresh HTTP client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Download `url` into a temporary file named after the contract.
    ///
    /// The file lands in the system temp directory as
    /// `{contract_id}-<random>.pdf`, falling back to the `contract-` prefix
    /// when no id was supplied.
    pub async fn fetch_pdf(
        &self,
        url: &str,
        contract_id: Option<&str>,
    ) -> Result<FetchedDocument, DocumentError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::UnexpectedStatus { status, body });
        }
        let payload = response.bytes().await?;

        let prefix = match contract_id {
            Some(id) => format!("{}-", filename_safe(id)),
            None => "contract-".to_string(),
        };
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(&payload)?;
        file.flush()?;

        let fingerprint = hex::encode(Sha256::digest(&payload));
        Ok(FetchedDocument {
            file,
            bytes: payload.len(),
            fingerprint,
        })
    }
}

impl Default for DocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a contract id to characters safe inside a file name.
fn filename_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
