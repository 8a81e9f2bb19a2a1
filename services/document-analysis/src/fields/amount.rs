//! Monetary-total extraction.
//!
//! Strategies in priority order: a total-due keyword with an adjacent
//! amount, the largest currency-tagged amount, and the largest
//! recognized monetary entity. Whatever the source formatting, the
//! result is serialized with two fractional digits and a dot
//! separator.

use regex::Regex;

use crate::ner::EntityRecognizer;

/// Parsed values at or above this are assumed to be barcodes or
/// reference numbers, not bill totals.
const MAX_PLAUSIBLE_AMOUNT: f64 = 1_000_000.0;

/// Returns the inferred total as a decimal string (`"1234.56"`), or
/// `None` when every strategy fails. The recognizer is optional; when
/// absent the last strategy is skipped.
pub fn extract_total(text: &str, recognizer: Option<&dyn EntityRecognizer>) -> Option<String> {
    keyword_anchored(text)
        .or_else(|| max_currency_tagged(text))
        .or_else(|| recognizer.and_then(|ner| max_recognized_entity(text, ner)))
        .map(|value| format!("{value:.2}"))
}

/// Shared cleaning rule: strip the currency marker, drop thousands
/// separators, convert the decimal comma. Unparseable input yields
/// `None` so it can never win a maximum.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.to_lowercase().replace("r$", "");
    let cleaned = cleaned.trim().replace('.', "").replace(',', ".");
    cleaned.parse().ok()
}

/// Strategy 1: amount adjacent to a total-due phrase.
fn keyword_anchored(text: &str) -> Option<f64> {
    let pattern = Regex::new(
        r"(?:total\s+a\s+pagar|valor\s+total|total\s+da\s+conta)\s*r?\$?\s*([\d.,]+)",
    )
    .unwrap();
    pattern
        .captures(text)
        .and_then(|capture| parse_amount(&capture[1]))
}

/// Strategy 2: maximum over every amount preceded by the currency
/// marker.
fn max_currency_tagged(text: &str) -> Option<f64> {
    let pattern = Regex::new(r"r\$\s*([\d.,]{2,})").unwrap();
    pattern
        .captures_iter(text)
        .filter_map(|capture| parse_amount(&capture[1]))
        .reduce(f64::max)
}

/// Strategy 3: maximum plausible value among recognized monetary
/// entities.
fn max_recognized_entity(text: &str, recognizer: &dyn EntityRecognizer) -> Option<f64> {
    recognizer
        .money_entities(text)
        .into_iter()
        .filter(|entity| entity.chars().any(|c| c.is_ascii_digit()))
        .filter_map(|entity| parse_amount(&entity))
        .filter(|value| *value > 0.0 && *value < MAX_PLAUSIBLE_AMOUNT)
        .reduce(f64::max)
}
