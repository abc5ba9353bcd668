use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::llm::QaPair;

/// Run-level metadata stored alongside the pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub total_pairs: usize,
    pub total_pages: usize,
    pub chunk_size: usize,
    pub context_window: u32,
}

/// The persisted QA dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub qa_pairs: Vec<QaPair>,
}

/// Short summary shown after a run
#[derive(Debug, Serialize)]
pub struct DatasetPreview<'a> {
    pub total_pairs_generated: usize,
    pub sample_pairs: &'a [QaPair],
}

impl Dataset {
    pub fn new(
        qa_pairs: Vec<QaPair>,
        total_pages: usize,
        chunk_size: usize,
        context_window: u32,
    ) -> Self {
        Self {
            metadata: DatasetMetadata {
                total_pairs: qa_pairs.len(),
                total_pages,
                chunk_size,
                context_window,
            },
            qa_pairs,
        }
    }

    /// The first `limit` pairs together with the total count
    pub fn preview(&self, limit: usize) -> DatasetPreview<'_> {
        DatasetPreview {
            total_pairs_generated: self.qa_pairs.len(),
            sample_pairs: &self.qa_pairs[..limit.min(self.qa_pairs.len())],
        }
    }

    /// Write the dataset as indented JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self).context("Failed to write JSON")?;
        writer.write_all(b"\n")?;
        writer
            .flush()
            .with_context(|| format!("Failed to write dataset to {}", path.display()))?;

        Ok(())
    }
}
