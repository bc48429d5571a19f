//! Overlapping fixed-size text windows.
//!
//! Sizes and offsets are counted in `char`s, never bytes.
use thiserror::Error;
use tracing::debug;

use super::{Chunk, Document};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkConfigError {
    #[error("chunk_size must be positive")]
    ZeroSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// A window of page text before it is attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Character offset of the first character within the page.
    pub start: usize,
    pub content: String,
}

/// Splits page text into windows of at most `chunk_size` characters that
/// overlap by about `chunk_overlap` characters.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkConfigError> {
        if chunk_size == 0 {
            return Err(ChunkConfigError::ZeroSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkConfigError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Cut every page of `document` into chunks, numbered in document order.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            for window in self.split_text(&page.text) {
                let index = chunks.len();
                chunks.push(Chunk::new(
                    window.content,
                    document.path.clone(),
                    page.number,
                    window.start,
                    index,
                ));
            }
        }
        debug!(
            "Split {} pages of {} into {} chunks",
            document.pages.len(),
            document.path.display(),
            chunks.len()
        );
        chunks
    }

    /// Split one page of text.
    ///
    /// Text no longer than `chunk_size` comes back as a single window; empty
    /// text yields none.
    pub fn split_text(&self, text: &str) -> Vec<Window> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        if n == 0 {
            return Vec::new();
        }
        if n <= self.chunk_size {
            return vec![Window {
                start: 0,
                content: text.to_string(),
            }];
        }

        let min_len = (self.chunk_size / 2).max(self.chunk_overlap + 1);
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let limit = (start + self.chunk_size).min(n);
            if limit == n {
                windows.push(window(&chars, start, n));
                break;
            }

            let end = find_break(&chars, start + min_len, limit).unwrap_or(limit);
            windows.push(window(&chars, start, end));
            start = self.next_start(&chars, start, end);
        }

        windows
    }

    /// Start of the window after `[start, end)`.
    ///
    /// Always in `(start, end]` and at most `chunk_size - chunk_overlap` past
    /// `start`.
    fn next_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        let lo = end - self.chunk_overlap;
        let hi = (start + self.chunk_size - self.chunk_overlap).min(end);
        (lo..=hi)
            .find(|&q| {
                q < chars.len() && chars[q - 1].is_whitespace() && !chars[q].is_whitespace()
            })
            .unwrap_or(lo)
    }
}

fn window(chars: &[char], start: usize, end: usize) -> Window {
    Window {
        start,
        content: chars[start..end].iter().collect(),
    }
}

fn is_paragraph_end(chars: &[char], p: usize) -> bool {
    p >= 2 && chars[p - 2] == '\n' && chars[p - 1] == '\n'
}

fn is_line_end(chars: &[char], p: usize) -> bool {
    chars[p - 1] == '\n'
}

fn is_sentence_end(chars: &[char], p: usize) -> bool {
    let last = chars[p - 1];
    matches!(last, '。' | '！' | '？')
        || (p >= 2 && last.is_whitespace() && matches!(chars[p - 2], '.' | '!' | '?'))
}

fn is_word_end(chars: &[char], p: usize) -> bool {
    chars[p - 1].is_whitespace()
}

/// Latest exclusive end in `[lo, hi]` that lands on a natural break.
///
/// Paragraph breaks beat line breaks, which beat sentence ends, which beat
/// plain whitespace.
fn find_break(chars: &[char], lo: usize, hi: usize) -> Option<usize> {
    let levels: [fn(&[char], usize) -> bool; 4] =
        [is_paragraph_end, is_line_end, is_sentence_end, is_word_end];
    levels
        .iter()
        .find_map(|is_break| (lo..=hi).rev().find(|&p| is_break(chars, p)))
}
