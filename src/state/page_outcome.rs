//! Outcome of processing one crawled page

use std::fmt;

/// How a page ended up in (or out of) the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Rendered in the headless browser and converted
    Rendered,

    /// Rendering failed; content came from the static fetch fallback
    Fallback,

    /// Every content source failed; the page was skipped
    Failed,

    /// Content was fetched but could not be chunked (empty page)
    Empty,
}

impl PageOutcome {
    /// Returns true if the page produced a Markdown document
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered | Self::Fallback)
    }

    /// Returns true if the page was skipped because of an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::Empty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
