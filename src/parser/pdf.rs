use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::PageText;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Extract normalized text from every page of a PDF file.
///
/// Pages whose text is empty after normalization are skipped, so page
/// numbers in the result may have gaps. Numbering is 1-based.
pub fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF file: {}", path.display()))?;

    let raw_pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    let pages = collect_pages(raw_pages);
    tracing::info!(
        "Extracted {} non-empty pages from {}",
        pages.len(),
        path.display()
    );

    Ok(pages)
}

fn collect_pages<I>(raw_pages: I) -> Vec<PageText>
where
    I: IntoIterator<Item = String>,
{
    raw_pages
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = clean_pdf_text(&raw);
            if text.is_empty() {
                tracing::debug!("Skipping empty page {}", i + 1);
                None
            } else {
                Some(PageText::new(i + 1, text))
            }
        })
        .collect()
}

/// Collapse whitespace runs to single spaces and drop common PDF artifacts
fn clean_pdf_text(text: &str) -> String {
    let text = text.replace('\u{0}', "").replace('\u{FEFF}', "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
