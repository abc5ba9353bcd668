use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Smallest accepted chunk size, in bytes.
pub const MIN_CHUNK_SIZE: usize = 500;
/// Largest accepted chunk size, in bytes.
pub const MAX_CHUNK_SIZE: usize = 2000;
/// Smallest accepted context window, in tokens.
pub const MIN_CONTEXT_WINDOW: u32 = 1024;
/// Largest accepted context window, in tokens.
pub const MAX_CONTEXT_WINDOW: u32 = 4096;

/// Errors that abort a pdf2qa run.
///
/// Failures scoped to a single chunk never surface here; the generator
/// absorbs them and moves on.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("chunk size must be between 500 and 2000 bytes, got {0}")]
    InvalidChunkSize(usize),

    #[error("context window must be between 1024 and 4096 tokens, got {0}")]
    InvalidContextWindow(u32),

    #[error("could not extract any text from {}", .0.display())]
    NoTextExtracted(PathBuf),

    #[error(
        "no QA pairs could be generated. Try a different chunk size or check the PDF content"
    )]
    NoQaPairs,

    #[error("LLM request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Check a chunk size against the accepted range.
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize, QaError> {
    if (MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
        Ok(chunk_size)
    } else {
        Err(QaError::InvalidChunkSize(chunk_size))
    }
}

/// Check a context window against the accepted range.
pub fn validate_context_window(context_window: u32) -> Result<u32, QaError> {
    if (MIN_CONTEXT_WINDOW..=MAX_CONTEXT_WINDOW).contains(&context_window) {
        Ok(context_window)
    } else {
        Err(QaError::InvalidContextWindow(context_window))
    }
}
