//! Recovery of QA pairs from raw LLM output.
//!
//! Model output is unreliable: it may be fenced in Markdown, be a bare
//! object instead of an array, or be cut off mid-generation. A fixed
//! sequence of textual repairs runs first, then a single strict parse.
//! The elements of a parsed array are kept exactly as the model wrote
//! them. Parsing never fails: unrecoverable output becomes one placeholder
//! record so every chunk contributes something to the dataset.

use regex::Regex;
use serde::de::Error as _;
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::LazyLock;

use super::QaPair;

pub const FALLBACK_QUESTION: &str = "What is the main topic discussed in this text?";
pub const FALLBACK_ERROR: &str = "JSON parsing failed";
pub const FALLBACK_TAG: &str = "auto-generated";

/// Characters of the cleaned response kept in a fallback answer
const FALLBACK_ANSWER_CHARS: usize = 150;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```(?i:json)?\s*").expect("valid fence regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]$").expect("valid trailing comma regex"));

/// Parse a raw LLM response into QA pairs.
///
/// Always returns at least one record. When the repaired text is not a
/// JSON array, or the array is empty, the result is a single fallback
/// record tagged `auto-generated`.
pub fn parse_qa_response(raw: &str) -> Vec<QaPair> {
    let cleaned = strip_code_fences(raw);
    let cleaned = cleaned.trim();
    let repaired = strip_trailing_comma(&ensure_array_brackets(cleaned)).into_owned();

    match parse_qa_array(&repaired) {
        Ok(pairs) if !pairs.is_empty() => pairs,
        Ok(_) => {
            tracing::warn!("LLM returned an empty QA array, using fallback record");
            vec![fallback_pair(cleaned)]
        }
        Err(e) => {
            tracing::warn!("Error parsing QA JSON: {}. Response: {}", e, raw);
            vec![fallback_pair(cleaned)]
        }
    }
}

/// Remove every ```` ```json ```` and ```` ``` ```` marker, along with the
/// whitespace around it
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    CODE_FENCE.replace_all(text, "")
}

/// Wrap text that does not already start with `[` in brackets, so a bare
/// object (or a comma-separated run of objects) becomes an array
pub fn ensure_array_brackets(text: &str) -> Cow<'_, str> {
    if text.starts_with('[') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("[{}]", text))
    }
}

/// Drop a comma left directly before the closing bracket
pub fn strip_trailing_comma(text: &str) -> Cow<'_, str> {
    TRAILING_COMMA.replace(text, "]")
}

fn parse_qa_array(text: &str) -> Result<Vec<QaPair>, serde_json::Error> {
    match serde_json::from_str(text)? {
        Value::Array(items) => Ok(items.into_iter().map(QaPair::new).collect()),
        _ => Err(serde_json::Error::custom("expected a JSON array")),
    }
}

/// Placeholder record used when a response cannot be parsed
pub fn fallback_pair(cleaned: &str) -> QaPair {
    let excerpt: String = cleaned.chars().take(FALLBACK_ANSWER_CHARS).collect();
    QaPair::new(json!({
        "question": FALLBACK_QUESTION,
        "answer": format!("{}...", excerpt),
        "difficulty": 3,
        "type": "factual",
        "tags": [FALLBACK_TAG],
        "metadata": {"error": FALLBACK_ERROR}
    }))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
