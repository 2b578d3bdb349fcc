//! Deterministic character-window chunking.
//!
//! This module encapsulates how extracted contract text is split before
//! embedding. Highlights:
//!
//! - Fixed windows: chunk `i` starts `chunk_size - overlap` characters after
//!   chunk `i - 1` and spans up to `chunk_size` characters, so the sequence is
//!   fully determined by the input and the two settings.
//! - UTF-8 safety: windows are measured in characters and sliced on char
//!   boundaries, so multi-byte text never splits a code point.
//! - Lossless: the first chunk plus each later chunk minus its leading
//!   `overlap` characters concatenates back to the original text exactly.

use super::types::ChunkingError;

/// Split `text` into overlapping character windows.
///
/// The final chunk runs to the end of the text and no chunk starts at or
/// beyond the text end. Empty input yields an empty sequence.
pub(crate) fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::InvalidOverlap {
            overlap,
            chunk_size,
        });
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every char boundary plus the text end, so windows
    // counted in characters can slice without landing inside a code point.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;
    let step = chunk_size - overlap;

    let mut chunks = Vec::with_capacity(char_count.div_ceil(step));
    let mut start = 0;
    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }
    Ok(chunks)
}
