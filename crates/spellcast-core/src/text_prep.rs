//! Text preparation: answer normalization and speech text checks.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused across calls.
static RE_WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a typed answer (or a target word) for comparison.
///
/// Trims, lowercases, and collapses internal whitespace runs to one space.
pub fn normalize_answer(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    RE_WHITESPACE_RUN.replace_all(&lowered, " ").into_owned()
}

/// `true` when `text` is empty after trimming.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Whether `text` is worth sending to a voice at all.
pub fn is_speakable(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

/// `true` when `guess` spells `target` once both are normalized.
pub fn answers_match(guess: &str, target: &str) -> bool {
    normalize_answer(guess) == normalize_answer(target)
}
