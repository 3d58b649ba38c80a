/// A bounded slice of a corpus document, the unit of retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    pub chunk_index: usize,
    /// Offset of the chunk window in characters from document start.
    pub char_offset: usize,
}

/// Fixed-size chunker with fixed overlap between neighbors, so local
/// context survives chunk boundaries.
///
/// Prefers to break at a sentence boundary within the last fifth of the
/// window; falls back to a hard cut at the target size.
pub struct OverlapChunker {
    chunk_size: usize,
    overlap: usize,
}

impl OverlapChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Char-boundary byte offsets, so slicing never splits a code point.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut chunk_index = 0;
        let mut start = 0usize;

        while start < total_chars {
            let hard_end = (start + self.chunk_size).min(total_chars);
            let end = if hard_end < total_chars {
                sentence_break(text, &bounds, start, hard_end, self.chunk_size)
            } else {
                hard_end
            };

            let slice = &text[bounds[start]..bounds[end]];
            let trimmed = slice.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    content: trimmed.to_string(),
                    chunk_index,
                    char_offset: start,
                });
                chunk_index += 1;
            }

            if end >= total_chars {
                break;
            }

            // Overlap with the previous window; guard against zero progress.
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        chunks
    }
}

/// Look for ". " in the last fifth of the window and break just after it.
fn sentence_break(
    text: &str,
    bounds: &[usize],
    start: usize,
    hard_end: usize,
    chunk_size: usize,
) -> usize {
    let search_from = start + chunk_size * 4 / 5;
    if search_from >= hard_end {
        return hard_end;
    }

    let window = &text[bounds[search_from]..bounds[hard_end]];
    match window.rfind(". ") {
        Some(rel) => {
            let abs_byte = bounds[search_from] + rel + 2;
            // ". " is ASCII, so abs_byte is a char boundary; its char
            // position is the number of boundaries strictly before it.
            bounds.partition_point(|&b| b < abs_byte)
        }
        None => hard_end,
    }
}
