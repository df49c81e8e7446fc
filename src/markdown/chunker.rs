//! Byte-budgeted text chunking
//!
//! Text is split on whitespace and packed into chunks whose UTF-8 size stays
//! within a byte budget, so each chunk fits a generation request payload.

use thiserror::Error;

/// Errors raised by the chunker
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("No chunks were produced from non-empty input")]
    NoChunksProduced,
}

/// A byte-bounded slice of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the source text
    pub index: usize,

    /// Size of `text` in UTF-8 bytes
    pub byte_size: usize,

    /// Words of the chunk joined by single spaces
    pub text: String,
}

/// Splits `text` into chunks of at most `max_bytes` UTF-8 bytes
///
/// Words are accumulated while `current + word + separator <= max_bytes`. On
/// overflow the current chunk is closed and a new one starts with the
/// overflowing word. A word that alone exceeds `max_bytes` is emitted as its
/// own oversized chunk instead of being truncated.
///
/// # Errors
///
/// * `ChunkError::EmptyInput` - `text` is empty
/// * `ChunkError::NoChunksProduced` - `text` holds only whitespace
///
/// # Examples
///
/// ```
/// use scrapemark::markdown::chunk;
///
/// let chunks = chunk("alpha beta gamma", 10).unwrap();
/// let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, vec!["alpha beta", "gamma"]);
/// ```
pub fn chunk(text: &str, max_bytes: usize) -> Result<Vec<Chunk>, ChunkError> {
    if text.is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let separator = usize::from(!current.is_empty());

        if !current.is_empty() && current.len() + separator + word.len() > max_bytes {
            push_chunk(&mut chunks, std::mem::take(&mut current));
            current.push_str(word);
            continue;
        }

        if separator == 1 {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        push_chunk(&mut chunks, current);
    }

    if chunks.is_empty() {
        return Err(ChunkError::NoChunksProduced);
    }

    tracing::debug!(
        "Chunked {} bytes into {} chunk(s) of at most {} bytes",
        text.len(),
        chunks.len(),
        max_bytes
    );

    Ok(chunks)
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: String) {
    chunks.push(Chunk {
        index: chunks.len(),
        byte_size: text.len(),
        text,
    });
}
