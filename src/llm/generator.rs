use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::parsing::parse_qa_response;
use super::prompts::{QA_SYSTEM_PROMPT, extract_entity_hints, qa_generation_user_prompt};
use super::{ChatRequest, LlmClient, QaPair};
use crate::error::QaError;
use crate::parser::Chunk;

/// Sampling temperature for every generation call
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Upper bound on tokens the model may generate per chunk
    pub max_tokens: u32,
    /// Chunks in flight at once; 1 processes strictly one after another
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub entity_hints: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            concurrency: 1,
            request_timeout: Duration::from_secs(120),
            entity_hints: false,
        }
    }
}

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// All pairs, in chunk order
    pub qa_pairs: Vec<QaPair>,
    pub chunks_processed: usize,
    pub chunks_failed: usize,
    /// Placeholder records produced for unparseable responses
    pub fallback_records: usize,
}

/// Drives chunk → prompt → LLM → parser for a whole document
pub struct QaGenerator {
    llm: LlmClient,
    options: GenerationOptions,
    progress: Option<ProgressBar>,
}

impl QaGenerator {
    pub fn new(llm: LlmClient, options: GenerationOptions) -> Self {
        Self {
            llm,
            options,
            progress: None,
        }
    }

    /// Advance `progress` once per finished chunk
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Generate QA pairs for every chunk.
    ///
    /// A chunk whose LLM call fails is logged and skipped; the run always
    /// covers every chunk. Results keep the input order even when several
    /// requests are in flight.
    pub async fn generate(&self, chunks: &[Chunk]) -> GenerationReport {
        let total = chunks.len();
        let concurrency = self.options.concurrency.max(1);
        info!(
            "Generating QA pairs for {} chunks (concurrency {})",
            total, concurrency
        );

        let results: Vec<Result<Vec<QaPair>>> = stream::iter(chunks.iter().enumerate())
            .map(|(i, chunk)| async move {
                let result = self.process_chunk(i + 1, total, chunk).await;
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                result
            })
            .buffered(concurrency)
            .collect()
            .await;

        let report = results.into_iter().zip(chunks).enumerate().fold(
            GenerationReport::default(),
            |mut report, (i, (result, chunk))| {
                match result {
                    Ok(pairs) => {
                        info!("Generated {} pairs from chunk {}", pairs.len(), i + 1);
                        report.chunks_processed += 1;
                        report.fallback_records +=
                            pairs.iter().filter(|p| p.error().is_some()).count();
                        report.qa_pairs.extend(pairs);
                    }
                    Err(e) => {
                        warn!(
                            "Error processing chunk {} (page {}): {:#}",
                            i + 1,
                            chunk.page_number,
                            e
                        );
                        report.chunks_failed += 1;
                    }
                }
                report
            },
        );

        info!(
            "Total QA pairs generated: {} ({} chunks ok, {} failed)",
            report.qa_pairs.len(),
            report.chunks_processed,
            report.chunks_failed
        );
        report
    }

    async fn process_chunk(&self, position: usize, total: usize, chunk: &Chunk) -> Result<Vec<QaPair>> {
        info!(
            "Processing chunk {}/{} from page {}",
            position, total, chunk.page_number
        );

        let hints = if self.options.entity_hints {
            extract_entity_hints(&chunk.text)
        } else {
            Vec::new()
        };
        let request = ChatRequest {
            system: QA_SYSTEM_PROMPT.to_string(),
            user: qa_generation_user_prompt(chunk, &hints),
            temperature: TEMPERATURE,
            max_tokens: self.options.max_tokens,
        };

        let timeout = self.options.request_timeout;
        let content = tokio::time::timeout(timeout, self.llm.complete(&request))
            .await
            .map_err(|_| QaError::Timeout(timeout))??;
        debug!("Chunk {} response: {} bytes", position, content.len());

        let pairs = parse_qa_response(&content);
        let incomplete = pairs
            .iter()
            .filter(|p| p.question().is_none() || p.answer().is_none())
            .count();
        if incomplete > 0 {
            warn!(
                "Chunk {}: {} records lack a question or answer, kept as written",
                position, incomplete
            );
        }
        Ok(pairs)
    }
}
