use crate::parser::Chunk;

/// System prompt fixing the assistant's role and output format
pub const QA_SYSTEM_PROMPT: &str = "You are an expert at creating question-answer pairs for fine-tuning. \
Always respond with valid JSON arrays containing QA pairs. \
Always use specific names of people and organizations instead of generic terms.";

/// Upper bound on the names listed as entity hints
const MAX_ENTITY_HINTS: usize = 20;

/// User prompt asking for QA pairs from one chunk.
///
/// `entity_hints` are names found in the chunk that the model should use
/// verbatim; an empty slice omits the section.
pub fn qa_generation_user_prompt(chunk: &Chunk, entity_hints: &[String]) -> String {
    let mut prompt = format!(
        r#"Generate question-answer pairs from this text chunk.
This is chunk {index} of {estimate} from page {page}.

Important: When creating questions and answers, if you refer to any person, organization, or place,
always use their specific name from the text. Never use generic terms like "someone", "the person",
or "the organization" when a specific name is available in the text.
"#,
        index = chunk.chunk_index,
        estimate = chunk.chunk_count_estimate,
        page = chunk.page_number,
    );

    if !entity_hints.is_empty() {
        prompt.push_str(&format!(
            "\nNames appearing in this chunk: {}.\n",
            entity_hints.join(", ")
        ));
    }

    prompt.push_str(&format!(
        r#"
Create diverse questions a user might ask about the content (9-10 QA pairs). Include:
1. Basic factual questions
2. Conceptual understanding questions
3. Analysis or application questions
4. Each question must be answerable from the provided text; do not add information that is not in it.
5. Questions must clearly name the specific people, organizations, or places they refer to.
6. If multiple people or organizations are mentioned, make it clear which one you are asking about.

Required format for each QA pair (MUST be valid JSON):
{{
    "question": "Clear, specific question using actual names of people/organizations",
    "answer": "Concise answer (50-100 words) using actual names of people/organizations",
    "difficulty": 3,
    "type": "factual/conceptual/analytical",
    "tags": ["relevant", "topic", "tags"],
    "metadata": {{
        "page": {page},
        "chunk": {index}
    }}
}}
"difficulty" is an integer from 1 (easy) to 5 (hard).

Text to process: {text}

Return only the JSON array with QA pairs, no additional text."#,
        page = chunk.page_number,
        index = chunk.chunk_index,
        text = chunk.text,
    ));

    prompt
}

/// Capitalized words from the chunk, in first-seen order.
///
/// A cheap stand-in for entity recognition: surrounding punctuation is
/// trimmed, single letters are dropped, duplicates are removed.
pub fn extract_entity_hints(text: &str) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
        if !starts_upper || word.chars().count() < 2 {
            continue;
        }
        if !hints.iter().any(|h| h == word) {
            hints.push(word.to_string());
            if hints.len() == MAX_ENTITY_HINTS {
                break;
            }
        }
    }
    hints
}
