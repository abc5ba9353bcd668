mod chunker;
mod pdf;

use serde::{Deserialize, Serialize};

pub use chunker::create_chunks;
pub use pdf::extract_pages;

/// Normalized text of one non-empty PDF page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number in the source document
    pub page_number: usize,
    pub text: String,
}

impl PageText {
    pub fn new(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A word-aligned slice of a single page, tagged with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub page_number: usize,
    /// 1-based position among the chunks of the same page
    pub chunk_index: usize,
    /// Advisory estimate of how many chunks the page splits into.
    /// Computed from an assumed average word length, so it can differ
    /// from the number of chunks actually emitted.
    pub chunk_count_estimate: usize,
}
