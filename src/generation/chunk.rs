use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Rough token estimate: three quarters of a token per whitespace separated word.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 3).div_ceil(4)
}

/// Same estimate, clamped into the `INTEGER` columns that store it.
pub fn token_count(text: &str) -> i32 {
    i32::try_from(estimate_tokens(text)).unwrap_or(i32::MAX)
}

/// Split `text` into sentence-aligned chunks whose estimate stays within
/// `max_tokens`. A sentence that alone exceeds the limit becomes its own chunk.
pub fn split_into_chunks(text: &str, max_tokens: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences(text) {
        let candidate = if current.is_empty() {
            sentence.to_string()
        } else {
            format!("{current} {sentence}")
        };

        if estimate_tokens(&candidate) > max_tokens && !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
            current = sentence.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END_RE.find_iter(text) {
        // terminators are single-byte ASCII
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    if start < text.len() {
        out.push(&text[start..]);
    }

    out
}
