use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound (in characters) for a chunk built from more than one segment.
    pub max_chunk_size: usize,
    /// Characters carried from the end of one chunk to the start of the next.
    pub overlap: usize,
    /// Segments shorter than this are treated as noise.
    pub min_segment_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 900,
            overlap: 150,
            min_segment_chars: 80,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_chunk_size == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "chunking.max_chunk_size must be greater than zero",
            ));
        }
        if self.overlap >= self.max_chunk_size {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "chunking.overlap must be smaller than chunking.max_chunk_size",
            )
            .with_details(format!(
                "overlap={}; max_chunk_size={}",
                self.overlap, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split at paragraph breaks (two or more newlines) or at `.` + whitespace + capital letter.
/// The period and the whitespace are consumed; the capital starts the next segment.
pub fn split_segments(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if c == '\n' {
            let mut j = i;
            while j < chars.len() && chars[j].1 == '\n' {
                j += 1;
            }
            if j - i >= 2 {
                out.push(&text[start..pos]);
                start = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
                i = j;
                continue;
            }
        } else if c == '.'
            && i + 2 < chars.len()
            && chars[i + 1].1.is_whitespace()
            && chars[i + 2].1.is_ascii_uppercase()
        {
            out.push(&text[start..pos]);
            start = chars[i + 2].0;
            i += 2;
            continue;
        }
        i += 1;
    }
    out.push(&text[start..]);
    out
}

/// Greedy semantic chunking with a fixed character overlap.
///
/// The input is normalized first. Segments below `min_segment_chars` are dropped, the rest are
/// packed into chunks of at most `max_chunk_size` characters. When a chunk closes, the next one
/// is seeded with the last `overlap` characters of the closed chunk. A single segment larger
/// than the limit is emitted whole rather than truncated.
pub fn chunk_text(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
    let normalized = normalize_text(text);

    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for seg in split_segments(&normalized) {
        let seg = seg.trim();
        let seg_len = seg.chars().count();
        if seg_len < cfg.min_segment_chars || seg.is_empty() {
            continue;
        }

        if buf.is_empty() {
            buf.push_str(seg);
            buf_len = seg_len;
            continue;
        }

        if buf_len + 1 + seg_len <= cfg.max_chunk_size {
            buf.push(' ');
            buf.push_str(seg);
            buf_len += 1 + seg_len;
            continue;
        }

        let closed = std::mem::take(&mut buf);
        let tail = char_suffix(&closed, cfg.overlap);
        if tail.is_empty() {
            buf.push_str(seg);
            buf_len = seg_len;
        } else {
            buf = format!("{tail} {seg}");
            buf_len = tail.chars().count() + 1 + seg_len;
        }
        chunks.push(closed);
    }

    if !buf.trim().is_empty() {
        chunks.push(buf);
    }

    log::debug!(
        "chunked {} chars into {} chunks (max={}, overlap={})",
        normalized.chars().count(),
        chunks.len(),
        cfg.max_chunk_size,
        cfg.overlap
    );
    chunks
}

/// Last `n` characters of `s` (all of `s` when it is shorter).
pub fn char_suffix(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}
