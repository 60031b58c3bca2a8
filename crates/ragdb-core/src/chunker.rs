//! Sentence-boundary-aware text windowing.
//!
//! Text is whitespace-normalized, then walked with a fixed-size character
//! window. When a window that is not the last one contains a sentence
//! terminator in its final 30%, the window is cut just after it; otherwise
//! the full window is emitted (hard cut, mid-sentence allowed). Consecutive
//! windows overlap so retrieval does not lose context at cut points.

use crate::error::{Error, Result};

const BREAK_CHARS: [char; 4] = ['.', '!', '?', '\n'];

/// Fraction of the window after which a sentence break is honored.
const BREAK_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// `chunk_size` and `overlap` are in characters. `chunk_size` must be
    /// strictly greater than `overlap`, otherwise the walk cannot advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be positive".into()));
        }
        if chunk_size <= overlap {
            return Err(Error::Configuration(format!(
                "chunk_size ({chunk_size}) must exceed overlap ({overlap})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping chunks. Never fails on content; empty
    /// or whitespace-only input yields an empty vec.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = normalized.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < len {
            let hard_end = start + self.chunk_size;
            if hard_end >= len {
                // Final window: reaches end-of-text, no boundary search.
                chunks.push(collect_trimmed(&chars[start..len]));
                break;
            }

            let mut end = hard_end;
            let window = &chars[start..end];
            if let Some(break_at) = window.iter().rposition(|c| BREAK_CHARS.contains(c)) {
                if break_at as f64 > self.chunk_size as f64 * BREAK_THRESHOLD {
                    end = start + break_at + 1;
                }
            }

            chunks.push(collect_trimmed(&chars[start..end]));

            // Strictly advance even if a boundary cut landed inside the
            // overlap window; otherwise the walk could stall.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }
}

/// Collapse all whitespace runs to single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_trimmed(window: &[char]) -> String {
    window.iter().collect::<String>().trim().to_string()
}
