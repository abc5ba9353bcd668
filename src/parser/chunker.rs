use super::{Chunk, PageText};

/// Average word length assumed when estimating how many chunks a page needs
const ESTIMATED_WORD_LEN: usize = 5;

/// Splits page text into word-bounded chunks that fit a byte budget
pub struct PageChunker {
    pub chunk_size: usize,
}

impl PageChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Split every page into chunks, in page order.
    ///
    /// Each word costs its byte length plus one for the joining space. A
    /// chunk is closed as soon as the next word would push it over the
    /// budget, unless the chunk is still empty: a single word larger than
    /// the budget is emitted on its own rather than truncated.
    pub fn create_chunks(&self, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            self.split_page(page, &mut chunks);
        }
        chunks
    }

    fn split_page(&self, page: &PageText, out: &mut Vec<Chunk>) {
        let words: Vec<&str> = page.text.split_whitespace().collect();
        if words.is_empty() {
            return;
        }

        let estimate = self.estimate_chunk_count(words.len());
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0;
        let mut chunk_index = 1;

        let mut emit = |words: &[&str], index: usize| {
            out.push(Chunk {
                text: words.join(" "),
                page_number: page.page_number,
                chunk_index: index,
                chunk_count_estimate: estimate,
            });
        };

        for word in words {
            let word_size = word.len() + 1;
            if current_size + word_size > self.chunk_size && !current.is_empty() {
                emit(&current, chunk_index);
                current.clear();
                current.push(word);
                current_size = word_size;
                chunk_index += 1;
            } else {
                current.push(word);
                current_size += word_size;
            }
        }

        if !current.is_empty() {
            emit(&current, chunk_index);
        }

        tracing::debug!(
            "Page {}: {} chunks (estimated {})",
            page.page_number,
            chunk_index,
            estimate
        );
    }

    /// `ceil(word_count / floor(chunk_size / 5))`, never reconciled with
    /// the number of chunks actually produced.
    pub fn estimate_chunk_count(&self, word_count: usize) -> usize {
        let words_per_chunk = (self.chunk_size / ESTIMATED_WORD_LEN).max(1);
        word_count.div_ceil(words_per_chunk)
    }
}

/// Split pages into chunks of at most `chunk_size` bytes
pub fn create_chunks(pages: &[PageText], chunk_size: usize) -> Vec<Chunk> {
    PageChunker::new(chunk_size).create_chunks(pages)
}
