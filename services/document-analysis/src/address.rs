//! Address validation against extracted document text.

use regex::Regex;
use tracing::warn;
use verifatura_models::{AddressQuery, MatchOutcome};
use verifatura_utils::normalize;

/// Matches a caller-supplied address and/or postal code against the
/// normalized document text.
///
/// Postal-code matching runs first because it is unambiguous and
/// locale-independent. Street matching is a deliberately loose
/// ordered-word scan: recognition commonly inserts or drops whitespace
/// and punctuation between street-name tokens, so the words only need
/// to appear in order with non-word characters between them.
pub fn match_address(text: &str, query: &AddressQuery) -> MatchOutcome {
    if let Some(postal_code) = query.postal_code.as_deref() {
        let postal_digits: String = postal_code.chars().filter(|c| c.is_ascii_digit()).collect();
        if !postal_digits.is_empty() {
            let text_digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if text_digits.contains(&postal_digits) {
                return MatchOutcome::MatchedByPostalCode;
            }
        }
    }

    if let Some(address) = query.address.as_deref() {
        if street_matches(text, address) {
            return MatchOutcome::MatchedByStreet;
        }
    }

    MatchOutcome::NoMatch
}

/// Ordered-word match of the street component (the part before the
/// first comma) of the supplied address.
fn street_matches(text: &str, address: &str) -> bool {
    let normalized = normalize(address);
    let street = normalized.split(',').next().unwrap_or("").trim();
    let words: Vec<&str> = street.split_whitespace().collect();
    if words.is_empty() {
        // An empty word list would otherwise produce a pattern that
        // matches everything.
        return false;
    }

    let body = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join(r"\W*");
    let pattern = format!(r"\b{body}\b");
    match Regex::new(&pattern) {
        Ok(matcher) => matcher.is_match(text),
        Err(error) => {
            warn!(error = %error, "street pattern rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(address: Option<&str>, postal_code: Option<&str>) -> AddressQuery {
        AddressQuery {
            address: address.map(str::to_string),
            postal_code: postal_code.map(str::to_string),
        }
    }

    #[test]
    fn postal_code_matches_through_punctuation() {
        let text = "unidade consumidora cep 12345678 sao paulo";
        let outcome = match_address(text, &query(None, Some("12345-678")));
        assert_eq!(outcome, MatchOutcome::MatchedByPostalCode);
    }

    #[test]
    fn postal_code_digits_may_span_other_tokens() {
        // The digit projection of the document is contiguous even when
        // the source text interleaves labels.
        let text = "cep: 01.310-100";
        let outcome = match_address(text, &query(None, Some("01310100")));
        assert_eq!(outcome, MatchOutcome::MatchedByPostalCode);
    }

    #[test]
    fn postal_code_outranks_street() {
        let text = "rua das flores 123 cep 12345678";
        let outcome = match_address(text, &query(Some("Rua das Flores"), Some("12345-678")));
        assert_eq!(outcome, MatchOutcome::MatchedByPostalCode);
    }

    #[test]
    fn street_matches_despite_spacing_and_case() {
        let text = "endereco de entrega rua das flores 123 centro";
        let outcome = match_address(text, &query(Some("Rua   Das Flores, 123"), None));
        assert_eq!(outcome, MatchOutcome::MatchedByStreet);
    }

    #[test]
    fn street_words_must_keep_their_order() {
        let text = "flores das rua";
        let outcome = match_address(text, &query(Some("Rua das Flores"), None));
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn only_the_part_before_the_comma_is_matched() {
        let text = "avenida paulista 1000";
        let outcome = match_address(text, &query(Some("Avenida Paulista, 999, apto 4"), None));
        assert_eq!(outcome, MatchOutcome::MatchedByStreet);
    }

    #[test]
    fn empty_query_never_matches() {
        let text = "rua das flores 123";
        assert_eq!(match_address(text, &query(None, None)), MatchOutcome::NoMatch);
        assert_eq!(
            match_address(text, &query(Some("   "), Some("--"))),
            MatchOutcome::NoMatch
        );
    }

    #[test]
    fn wrong_address_and_code_yield_no_match() {
        let text = "rua das flores 123 cep 12345678";
        let outcome = match_address(text, &query(Some("Avenida Brasil"), Some("99999-999")));
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }
}
