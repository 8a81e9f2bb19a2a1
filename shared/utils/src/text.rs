//! Text normalization for searching noisy document text.
//!
//! OCR output and PDF text layers disagree wildly about accents, case
//! and spacing, so every downstream matcher operates on a canonical
//! form instead of the raw extraction.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a string: strips diacritics, lowercases and collapses
/// whitespace runs to single spaces.
///
/// Total and idempotent; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
