//! Markdown generation stage
//!
//! Extracted page content is split into byte-bounded chunks by [`chunk`] and
//! each chunk is rewritten as Markdown by a [`TextGenerator`] through the
//! [`MarkdownPipeline`].

mod backend;
mod chunker;
mod keyring;
mod pipeline;
mod prompt;

pub use backend::{BackendError, GeminiClient, TextGenerator};
pub use chunker::{chunk, Chunk, ChunkError};
pub use pipeline::{Conversion, MarkdownPipeline, GENERATION_FAILED_PLACEHOLDER};
pub use prompt::SYSTEM_INSTRUCTION;

use crate::url::NormalizedUrl;

/// Terminal output unit, one per processed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    /// Normalized URL of the page
    pub url: NormalizedUrl,

    /// Page title (may be empty)
    pub title: String,

    /// Per-chunk generated text concatenated in chunk order
    pub markdown: String,
}
