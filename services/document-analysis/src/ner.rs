//! Entity-recognition seam for the monetary-total extractor.

use regex::Regex;

/// Tags text spans carrying a monetary value. Optional process-wide
/// dependency: when absent, the last-resort amount strategy is skipped
/// rather than failing the request.
pub trait EntityRecognizer: Send + Sync {
    fn money_entities(&self, text: &str) -> Vec<String>;
}

/// Pattern-based recognizer that stands in for a statistical model:
/// tags numeric spans adjacent to currency markers or money words.
pub struct LexicalMoneyRecognizer {
    pattern: Regex,
}

impl LexicalMoneyRecognizer {
    pub fn new() -> Self {
        let pattern = Regex::new(r"(?:r\$|reais|valor|total|pagar|pagamento)\s*:?\s*([\d.,]+)")
            .unwrap();
        Self { pattern }
    }
}

impl Default for LexicalMoneyRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for LexicalMoneyRecognizer {
    fn money_entities(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .map(|capture| capture[1].to_string())
            .collect()
    }
}
