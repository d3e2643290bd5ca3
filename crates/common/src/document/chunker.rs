//! Text chunking module
//!
//! Splits document text into fixed-length, non-overlapping chunks and
//! gathers the chunks that mention a search term.

use tracing::debug;

/// A borrowed chunk of the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunk<'a> {
    /// The chunk content
    pub content: &'a str,
    /// Index of this chunk in the document
    pub index: usize,
    /// Start byte position in original text
    pub start_pos: usize,
    /// End byte position in original text (exclusive)
    pub end_pos: usize,
}

/// Partition `text` into consecutive chunks of at most `max_chars` characters.
///
/// Chunks never split a code point, never overlap, and concatenate back to
/// `text` exactly. A `max_chars` of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<TextChunk<'_>> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (pos, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(TextChunk {
                content: &text[start..pos],
                index: chunks.len(),
                start_pos: start,
                end_pos: pos,
            });
            start = pos;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(TextChunk {
            content: &text[start..],
            index: chunks.len(),
            start_pos: start,
            end_pos: text.len(),
        });
    }

    chunks
}

/// Concatenate, in order, every chunk whose lowercase form contains `term`.
///
/// With `lookahead`, a chunk also matches when the term starts inside it and
/// runs into the following text. Only the chunk itself is appended. A blank
/// term matches nothing.
pub fn gather_relevant(text: &str, term: &str, max_chars: usize, lookahead: bool) -> String {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return String::new();
    }
    let extra = needle.chars().count().saturating_sub(1);
    let chunks = chunk_text(text, max_chars);

    let mut relevant = String::new();
    let mut matched = 0;

    for chunk in &chunks {
        let window = if lookahead && extra > 0 {
            &text[chunk.start_pos..advance_chars(text, chunk.end_pos, extra)]
        } else {
            chunk.content
        };

        if window.to_lowercase().contains(&needle) {
            relevant.push_str(chunk.content);
            matched += 1;
        }
    }

    debug!(
        chunk_count = chunks.len(),
        matched,
        relevant_len = relevant.len(),
        "Gathered relevant chunks"
    );

    relevant
}

/// Byte position `n` characters after `pos`, clamped to the end of `text`
fn advance_chars(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(offset, _)| pos + offset)
        .unwrap_or(text.len())
}
