//! Ephemeral in-memory vector index.
//!
//! Each `/ask` request that retrieves context builds one of these from the
//! chunk texts and their embeddings, queries it once, and drops it. Nothing
//! is persisted and nothing is shared between requests.

use thiserror::Error;

/// Errors raised while building or querying a [`MemoryIndex`].
#[derive(Debug, Error)]
pub enum IndexError {
    /// The number of texts and the number of vectors differ.
    #[error("index requires one vector per text, got {texts} texts and {vectors} vectors")]
    LengthMismatch {
        /// Number of chunk texts supplied.
        texts: usize,
        /// Number of embedding vectors supplied.
        vectors: usize,
    },
    /// A vector's dimension does not match the rest of the index.
    #[error("expected embedding dimension {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension established by the first vector.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
}

/// A single retrieval hit: a chunk text and its similarity to the query.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// The chunk text, borrowed from the index.
    pub text: &'a str,
    /// Cosine similarity in `[-1, 1]`; zero-norm vectors score `0.0`.
    pub score: f32,
}

#[derive(Debug)]
struct Entry {
    text: String,
    vector: Vec<f32>,
}

/// An in-memory store of chunk texts and their embedding vectors, queried
/// by cosine similarity.
#[derive(Debug)]
pub struct MemoryIndex {
    entries: Vec<Entry>,
    dimension: usize,
}

impl MemoryIndex {
    /// Build an index from parallel lists of chunk texts and embeddings.
    ///
    /// The lists must be the same length and every vector must share the
    /// dimension of the first.
    pub fn from_parts(texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if texts.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                texts: texts.len(),
                vectors: vectors.len(),
            });
        }
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }
        let entries = texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| Entry { text, vector })
            .collect();
        Ok(Self { entries, dimension })
    }

    /// Number of chunks held by the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return up to `k` chunks ranked by cosine similarity to `query`,
    /// highest first. Ties keep the chunks' insertion order, so equal-scoring
    /// chunks come back in document order.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<Hit<'_>>, IndexError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let mut scored: Vec<(usize, Hit<'_>)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(ordinal, entry)| {
                let hit = Hit {
                    text: entry.text.as_str(),
                    score: cosine_similarity(query, &entry.vector),
                };
                (ordinal, hit)
            })
            .collect();
        scored.sort_by(|(a_ord, a), (b_ord, b)| {
            b.score.total_cmp(&a.score).then(a_ord.cmp(b_ord))
        });
        Ok(scored.into_iter().take(k).map(|(_, hit)| hit).collect())
    }
}

/// Cosine similarity between two equal-length vectors. Returns `0.0` when
/// either vector has zero norm rather than dividing by zero.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
