//! Boundary-aware chunking of flattened repository text.

use super::FILE_BOUNDARY_MARKER;

/// How far past the size limit (as a fraction of it) a file boundary may
/// still be used as the cut point.
const MARKER_LOOKAHEAD_FRACTION: f64 = 0.2;

/// Splits text into chunks of at most `max_chars` characters, preferring to
/// cut at file boundary markers, then after newlines, then anywhere.
pub struct BoundaryChunker {
    max_chars: usize,
}

impl BoundaryChunker {
    /// A limit of zero is treated as one.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars: max_chars.max(1) }
    }

    /// Chunk `text`. Concatenating the result yields `text` again.
    pub fn chunk<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let index = CharIndex::new(text);
        let total = index.char_len();
        if total <= self.max_chars {
            return vec![text];
        }

        let mut chunks = Vec::with_capacity(total / self.max_chars + 1);
        let mut current = 0usize;

        while current < total {
            let end = (current + self.max_chars).min(total);
            let cut = if end == total { end } else { self.find_cut(text, &index, current, end) };

            chunks.push(&text[index.byte(current)..index.byte(cut)]);
            current = cut;
        }

        chunks
    }

    /// Pick the cut point for a chunk starting at `current` whose naive end
    /// is `end` (both char indices, `current < end < total`).
    fn find_cut(&self, text: &str, index: &CharIndex, current: usize, end: usize) -> usize {
        if let Some(marker) = self.next_marker(text, index, end) {
            return marker;
        }

        // Newline at a position in (current, end); cutting right after it
        // keeps the chunk within the limit and ends it on a whole line.
        let search_from = index.byte(current + 1);
        let search_to = index.byte(end);
        if search_from < search_to {
            if let Some(rel) = text[search_from..search_to].rfind('\n') {
                return index.char_at(search_from + rel + 1);
            }
        }

        end
    }

    /// Start of the first marker at or after `end`, if it lies within the
    /// lookahead window.
    fn next_marker(&self, text: &str, index: &CharIndex, end: usize) -> Option<usize> {
        let lookahead = self.max_chars as f64 * MARKER_LOOKAHEAD_FRACTION;
        let window_chars = lookahead.ceil() as usize + FILE_BOUNDARY_MARKER.len();
        let window_end = (end + window_chars).min(index.char_len());

        let from = index.byte(end);
        let rel = text[from..index.byte(window_end)].find(FILE_BOUNDARY_MARKER)?;
        let marker = index.char_at(from + rel);

        (((marker - end) as f64) < lookahead).then_some(marker)
    }
}

/// Maps between char indices and byte offsets. ASCII text maps 1:1.
struct CharIndex {
    len: usize,
    offsets: Option<Vec<usize>>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self { len: text.len(), offsets: None };
        }
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let len = offsets.len();
        offsets.push(text.len());
        Self { len, offsets: Some(offsets) }
    }

    fn char_len(&self) -> usize {
        self.len
    }

    fn byte(&self, char_idx: usize) -> usize {
        match &self.offsets {
            None => char_idx,
            Some(offsets) => offsets[char_idx],
        }
    }

    fn char_at(&self, byte_idx: usize) -> usize {
        match &self.offsets {
            None => byte_idx,
            Some(offsets) => offsets.binary_search(&byte_idx).unwrap_or_else(|pos| pos),
        }
    }
}
